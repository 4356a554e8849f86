use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use tour_core::config::{Config, ConfigWarning, WarnLevel};
use tour_core::registry::Registry;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective config
    Show,

    /// Validate the config and registry for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    if json {
        return print_json(&config);
    }
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut warnings = config.validate(root);

    let registry_path = config.registry_path(root);
    if registry_path.exists() {
        match Registry::load(&registry_path) {
            Ok(registry) => {
                warnings.extend(registry.validate().into_iter().map(|w| ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("tour '{}': {}", w.tour_id, w.message),
                }));
            }
            Err(e) => warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("registry {} does not parse: {e}", registry_path.display()),
            }),
        }
    }

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

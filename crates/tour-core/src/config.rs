use crate::error::{Result, TourError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Delay between a page mount and an automatic tour start.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_registry")]
    pub registry: PathBuf,
    #[serde(default = "default_locale")]
    pub locale: PathBuf,
    /// Role used to filter the registry when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

fn default_version() -> u32 {
    1
}

fn default_settle_delay_ms() -> u64 {
    500
}

fn default_registry() -> PathBuf {
    PathBuf::from(paths::DEFAULT_REGISTRY_FILE)
}

fn default_locale() -> PathBuf {
    PathBuf::from(paths::DEFAULT_LOCALE_FILE)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            settle_delay_ms: default_settle_delay_ms(),
            registry: default_registry(),
            locale: default_locale(),
            role: None,
        }
    }
}

impl Config {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn registry_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.registry)
    }

    pub fn locale_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.locale)
    }

    pub fn load(root: &Path) -> Result<Self> {
        let Some(data) = crate::io::read_if_exists(&paths::config_path(root))? else {
            return Err(TourError::NotInitialized);
        };
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self, root: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.settle_delay_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "settle_delay_ms is 0; anchors may not be mounted when a tour auto-starts"
                    .to_string(),
            });
        } else if self.settle_delay_ms > 10_000 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "settle_delay_ms={} (>10000 is a noticeable lag before auto-start)",
                    self.settle_delay_ms
                ),
            });
        }

        let registry = self.registry_path(root);
        if !registry.exists() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("registry file not found: {}", registry.display()),
            });
        }

        if let Some(role) = &self.role {
            if role.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "role is set but empty; restricted tours will be hidden".to_string(),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

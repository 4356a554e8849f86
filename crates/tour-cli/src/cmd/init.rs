use anyhow::Context;
use std::path::Path;
use tour_core::{config::Config, io, paths};

const SAMPLE_REGISTRY: &str = r##"tours:
  - id: welcome
    category: operations
    page: /dashboard
    steps:
      - target: body
        title: tours.welcome.intro.title
        content: tours.welcome.intro.content
        placement: center
      - target: "#main-nav"
        title: tours.welcome.nav.title
        content: tours.welcome.nav.content
        placement: right
      - target: "#help-button"
        title: tours.welcome.help.title
        content: tours.welcome.help.content
        placement: bottom
  - id: team-settings
    category: administration
    page: /settings/team
    roles: [admin]
    steps:
      - target: "#invite-member"
        title: tours.team-settings.invite.title
        content: tours.team-settings.invite.content
"##;

const SAMPLE_LOCALE: &str = r#"tours.welcome.intro.title: Welcome
tours.welcome.intro.content: "A quick look around. Step {{step}} of {{total}}."
tours.welcome.nav.title: Navigation
tours.welcome.nav.content: Every area of the product is one click away from here.
tours.welcome.help.title: Help
tours.welcome.help.content: Replay any tour from the help menu.
tours.team-settings.invite.title: Invite your team
tours.team-settings.invite.content: Add colleagues and choose their role.
"#;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing tours in: {}", root.display());

    let dir = paths::tours_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    if paths::config_path(root).exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        Config::default()
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    let config = Config::load(root).context("failed to load config")?;
    write_sample(&config.registry_path(root), SAMPLE_REGISTRY, "registry")?;
    write_sample(&config.locale_path(root), SAMPLE_LOCALE, "locale")?;

    println!("\nNext: tour list");
    Ok(())
}

fn write_sample(path: &Path, content: &str, what: &str) -> anyhow::Result<()> {
    let created = io::write_if_missing(path, content.as_bytes())
        .with_context(|| format!("failed to write {what} {}", path.display()))?;
    let label = if created { "created:" } else { "exists: " };
    println!("  {label} {}", path.display());
    Ok(())
}

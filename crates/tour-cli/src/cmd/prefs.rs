use crate::engine::Engine;
use crate::output::{print_json, yes_no};
use std::path::Path;
use tour_core::state::PreferencesPatch;

pub fn run(
    root: &Path,
    auto_start: Option<bool>,
    help_button: Option<bool>,
    json: bool,
) -> anyhow::Result<()> {
    let engine = Engine::open(root)?;
    let patch = PreferencesPatch {
        auto_start_enabled: auto_start,
        show_help_button: help_button,
    };
    let prefs = if patch.is_empty() {
        engine.controller.preferences()
    } else {
        engine.controller.set_preferences(patch)
    };

    if json {
        return print_json(&prefs);
    }

    println!("Auto-start:   {}", yes_no(prefs.auto_start_enabled));
    println!("Help button:  {}", yes_no(prefs.show_help_button));
    Ok(())
}

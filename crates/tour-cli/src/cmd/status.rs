use crate::engine::Engine;
use crate::output::{print_json, yes_no};
use std::path::Path;
use tour_core::progress::compute_progress;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let engine = Engine::open(root)?;
    let role = engine.role(None);
    let state = engine.controller.snapshot();
    let mut visited = engine.persistence.visited_tours();
    visited.sort();
    let progress = compute_progress(&engine.registry.for_role(role), state.completed_tour_ids());

    if json {
        let value = serde_json::json!({
            "preferences": state.preferences(),
            "role": role,
            "completed_tour_ids": state.completed_tour_ids(),
            "visited_tour_ids": visited,
            "progress": progress,
        });
        return print_json(&value);
    }

    let prefs = state.preferences();
    println!("Auto-start:   {}", yes_no(prefs.auto_start_enabled));
    println!("Help button:  {}", yes_no(prefs.show_help_button));
    if let Some(role) = role {
        println!("Role:         {role}");
    }
    println!(
        "Progress:     {}/{} tours ({}%)",
        progress.completed_tours, progress.total_tours, progress.percentage
    );
    if state.completed_tour_ids().is_empty() {
        println!("Completed:    (none)");
    } else {
        println!("Completed:    {}", state.completed_tour_ids().join(", "));
    }
    if visited.is_empty() {
        println!("Visited:      (none)");
    } else {
        println!("Visited:      {}", visited.join(", "));
    }
    Ok(())
}

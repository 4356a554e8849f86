use crate::engine::Engine;
use crate::output::{print_json, print_table};
use std::path::Path;
use tour_core::progress::compute_progress;

pub fn run(root: &Path, role: Option<&str>, json: bool) -> anyhow::Result<()> {
    let engine = Engine::open(root)?;
    let registry = engine.registry.for_role(engine.role(role));
    let progress = compute_progress(&registry, &engine.controller.completed_tour_ids());

    if json {
        return print_json(&progress);
    }

    println!(
        "Overall: {}/{} tours ({}%)\n",
        progress.completed_tours, progress.total_tours, progress.percentage
    );
    let rows: Vec<Vec<String>> = progress
        .by_category
        .iter()
        .map(|(category, p)| {
            vec![
                category.to_string(),
                p.completed.to_string(),
                p.total.to_string(),
            ]
        })
        .collect();
    print_table(&["CATEGORY", "COMPLETED", "TOTAL"], &rows);
    Ok(())
}

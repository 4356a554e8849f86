use crate::engine::Engine;
use crate::output::{print_json, print_table};
use serde::Serialize;
use std::path::Path;
use tour_core::types::Category;

#[derive(Serialize)]
struct TourRow<'a> {
    id: &'a str,
    category: Category,
    page: Option<&'a str>,
    steps: usize,
    completed: bool,
    visited: bool,
}

pub fn run(root: &Path, role: Option<&str>, json: bool) -> anyhow::Result<()> {
    let engine = Engine::open(root)?;
    let registry = engine.registry.for_role(engine.role(role));
    let state = engine.controller.snapshot();

    let rows: Vec<TourRow> = registry
        .iter()
        .map(|t| TourRow {
            id: &t.id,
            category: t.category,
            page: t.page.as_deref(),
            steps: t.steps.len(),
            completed: state.is_completed(&t.id),
            visited: engine.persistence.is_visited(&t.id),
        })
        .collect();

    if json {
        return print_json(&rows);
    }

    if rows.is_empty() {
        println!("No tours.");
        return Ok(());
    }

    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let status = if r.completed {
                "completed"
            } else if r.visited {
                "visited"
            } else {
                "new"
            };
            vec![
                r.id.to_string(),
                r.category.to_string(),
                r.steps.to_string(),
                status.to_string(),
                r.page.unwrap_or("-").to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "CATEGORY", "STEPS", "STATUS", "PAGE"], &table);
    Ok(())
}

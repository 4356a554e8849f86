use crate::engine::Engine;
use crate::output::{print_json, yes_no};
use std::path::Path;

pub fn run(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let engine = Engine::open(root)?;
    let tour = engine.tour(id)?;
    let steps = engine.runner()?.render_steps(tour);
    let completed = engine.controller.is_completed(id);
    let visited = engine.persistence.is_visited(id);

    if json {
        let value = serde_json::json!({
            "id": tour.id,
            "category": tour.category,
            "page": tour.page,
            "roles": tour.roles,
            "completed": completed,
            "visited": visited,
            "steps": steps,
        });
        return print_json(&value);
    }

    println!("Tour:      {}", tour.id);
    println!("Category:  {}", tour.category);
    if let Some(page) = &tour.page {
        println!("Page:      {page}");
    }
    if let Some(roles) = &tour.roles {
        let roles: Vec<&str> = roles.iter().map(String::as_str).collect();
        println!("Roles:     {}", roles.join(", "));
    }
    println!("Completed: {}", yes_no(completed));
    println!("Visited:   {}", yes_no(visited));

    println!("\nSteps ({}):", steps.len());
    for (i, step) in steps.iter().enumerate() {
        println!("  {}. {}  [{} @ {}]", i + 1, step.title, step.target, step.placement);
        println!("     {}", step.content);
    }
    Ok(())
}

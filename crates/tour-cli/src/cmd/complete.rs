use crate::engine::Engine;
use crate::output::print_json;
use std::path::Path;

pub fn run(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let engine = Engine::open(root)?;
    engine.tour(id)?;
    let already = engine.controller.is_completed(id);
    engine.controller.complete(id);

    if json {
        let value = serde_json::json!({
            "tour_id": id,
            "completed": true,
            "already_completed": already,
        });
        return print_json(&value);
    }

    if already {
        println!("Tour '{id}' was already complete.");
    } else {
        println!("Tour '{id}' marked complete.");
    }
    Ok(())
}

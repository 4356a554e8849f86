use crate::engine::Engine;
use crate::output::print_json;
use std::path::Path;

/// `id` may name a tour that is no longer registered so stale completions
/// can still be cleared.
pub fn run(root: &Path, id: Option<&str>, all: bool, json: bool) -> anyhow::Result<()> {
    let engine = Engine::open(root)?;

    if all {
        engine.controller.reset_all();
        if json {
            return print_json(&serde_json::json!({ "reset": "all" }));
        }
        println!("All tour progress reset. Tours will auto-start again on first visit.");
        return Ok(());
    }

    let Some(id) = id else {
        anyhow::bail!("a tour id or --all is required");
    };
    let was_completed = engine.controller.is_completed(id);
    engine.controller.reset(id);

    if json {
        let value = serde_json::json!({
            "reset": id,
            "was_completed": was_completed,
        });
        return print_json(&value);
    }

    if was_completed {
        println!("Tour '{id}' reset.");
    } else {
        println!("Tour '{id}' was not complete; nothing to reset.");
    }
    Ok(())
}

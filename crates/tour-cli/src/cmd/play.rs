use crate::engine::{runtime, Engine};
use crate::output::print_json;
use crate::session::{drive, print_summary, TerminalSpotlight};
use std::path::Path;

pub fn run(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let engine = Engine::open(root)?;
    let tour = engine.tour(id)?;
    if tour.steps.is_empty() {
        anyhow::bail!("tour '{id}' has no steps");
    }

    let mut runner = engine.runner()?;
    engine.controller.start(id);

    let mut widget = TerminalSpotlight::new(json);
    let stdin = std::io::stdin();
    let summary = runtime()?.block_on(drive(&mut runner, &mut widget, stdin.lock()))?;

    if json {
        return print_json(&summary);
    }
    print_summary(&summary);
    Ok(())
}

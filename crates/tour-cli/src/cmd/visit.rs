use crate::engine::{runtime, Engine};
use crate::output::print_json;
use crate::session::{drive, print_summary, TerminalSpotlight};
use std::path::Path;
use tour_core::autostart::AutoStartDecision;

pub fn run(root: &Path, id: &str, disabled: bool, json: bool) -> anyhow::Result<()> {
    let engine = Engine::open(root)?;
    engine.tour(id)?;
    let policy = engine.auto_start();
    let mut runner = engine.runner()?;
    let mut widget = TerminalSpotlight::new(json);

    let (decision, session) = runtime()?.block_on(async {
        let pending = policy.on_mount(id, !disabled);
        let decision = pending.decision();
        if decision == AutoStartDecision::Scheduled && !json {
            println!(
                "First visit to '{id}'; starting tour in {}ms.",
                policy.settle_delay().as_millis()
            );
        }
        if !pending.wait().await {
            return Ok::<_, anyhow::Error>((decision, None));
        }
        let stdin = std::io::stdin();
        let summary = drive(&mut runner, &mut widget, stdin.lock()).await?;
        Ok((decision, Some(summary)))
    })?;

    if json {
        let value = serde_json::json!({
            "tour_id": id,
            "decision": decision,
            "started": session.is_some(),
            "session": session,
        });
        return print_json(&value);
    }

    match session {
        Some(summary) => print_summary(&summary),
        None => println!("No auto-start for '{id}' ({}).", decision_reason(decision)),
    }
    Ok(())
}

fn decision_reason(decision: AutoStartDecision) -> &'static str {
    match decision {
        AutoStartDecision::Disabled => "disabled for this page",
        AutoStartDecision::PreferenceOff => "auto-start is turned off in preferences",
        AutoStartDecision::TourRunning => "another tour is running",
        AutoStartDecision::Completed => "already completed",
        AutoStartDecision::AlreadyVisited => "already offered on an earlier visit",
        AutoStartDecision::Scheduled => "interrupted before it started",
    }
}

use serde::Serialize;
use std::io::BufRead;
use tour_core::runner::{
    RunnerOutcome, SpotlightFrame, SpotlightWidget, StepRunner, WidgetAction, WidgetEvent,
};

// ---------------------------------------------------------------------------
// TerminalSpotlight
// ---------------------------------------------------------------------------

/// Draws frames as plain text on stdout. Silent in JSON mode.
pub struct TerminalSpotlight {
    quiet: bool,
    frames: usize,
}

impl TerminalSpotlight {
    pub fn new(quiet: bool) -> Self {
        Self { quiet, frames: 0 }
    }
}

impl SpotlightWidget for TerminalSpotlight {
    fn render(&mut self, frame: Option<&SpotlightFrame>) {
        let Some(frame) = frame else {
            return;
        };
        let Some(step) = frame.current() else {
            return;
        };
        self.frames += 1;
        if self.quiet {
            return;
        }
        println!();
        println!(
            "[{}/{}] {}",
            frame.step_index + 1,
            frame.steps.len(),
            step.title
        );
        println!("  {}", step.content);
        println!("  target: {}  placement: {}", step.target, step.placement);
        println!("  (next, back, skip, close)");
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Next,
    Back,
    Skip,
    Close,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "n" | "next" => Some(Command::Next),
        "b" | "back" | "prev" => Some(Command::Back),
        "s" | "skip" => Some(Command::Skip),
        "q" | "c" | "close" | "quit" => Some(Command::Close),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub tour_id: String,
    /// `completed`, `stopped`, or `cancelled`.
    pub result: &'static str,
    pub steps_shown: usize,
}

/// Play the active tour against `input` until it completes or is stopped.
/// End of input closes the tour.
pub async fn drive<R: BufRead>(
    runner: &mut StepRunner,
    widget: &mut TerminalSpotlight,
    mut input: R,
) -> anyhow::Result<SessionSummary> {
    let tour_id = runner.controller().active_tour_id().unwrap_or_default();
    let mut result = "stopped";

    loop {
        let Some(frame) = runner.frame() else {
            if let RunnerOutcome::Completed { .. } = runner.reconcile() {
                result = "completed";
            }
            break;
        };
        let index = frame.step_index;

        if runner.handle(WidgetEvent::step_before(index)).await == RunnerOutcome::Cancelled {
            result = "cancelled";
            break;
        }
        widget.render(Some(&frame));

        let command = loop {
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break Command::Close;
            }
            match parse_command(&line) {
                Some(c) => break c,
                None => eprintln!(
                    "unknown input '{}'; use next, back, skip or close",
                    line.trim()
                ),
            }
        };

        let event = match command {
            Command::Next => WidgetEvent::step_after(index, WidgetAction::Next),
            Command::Back => WidgetEvent::step_after(index, WidgetAction::Prev),
            Command::Skip => WidgetEvent::skipped(index),
            Command::Close => WidgetEvent::closed(index),
        };
        match runner.handle(event).await {
            RunnerOutcome::Completed { .. } => {
                result = "completed";
                break;
            }
            RunnerOutcome::Stopped => break,
            RunnerOutcome::Cancelled => {
                result = "cancelled";
                break;
            }
            _ => {}
        }
    }

    widget.render(None);
    Ok(SessionSummary {
        tour_id,
        result,
        steps_shown: widget.frames,
    })
}

pub fn print_summary(summary: &SessionSummary) {
    match summary.result {
        "completed" => println!("\nTour '{}' completed.", summary.tour_id),
        "cancelled" => println!("\nTour '{}' was interrupted.", summary.tour_id),
        _ => println!(
            "\nTour '{}' closed. Play it again any time with 'tour play {}'.",
            summary.tour_id, summary.tour_id
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;
    use tour_core::controller::TourController;
    use tour_core::kv::MemoryStore;
    use tour_core::localize::CatalogLocalizer;
    use tour_core::persist::TourPersistence;
    use tour_core::registry::{Registry, StepDefinition, TourDefinition};
    use tour_core::store::TourStore;
    use tour_core::types::Category;

    fn runner() -> StepRunner {
        let registry = Registry::new(vec![TourDefinition::new("welcome", Category::Operations)
            .with_steps(vec![
                StepDefinition::new("body", "t.intro", "c.intro"),
                StepDefinition::new("#nav", "t.nav", "c.nav"),
            ])]);
        let persistence = TourPersistence::new(Arc::new(MemoryStore::new()));
        let controller = TourController::new(Arc::new(TourStore::open(persistence)));
        controller.start("welcome");
        StepRunner::new(
            controller,
            Arc::new(registry),
            Arc::new(CatalogLocalizer::default()),
        )
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("\n"), Some(Command::Next));
        assert_eq!(parse_command(" BACK "), Some(Command::Back));
        assert_eq!(parse_command("skip"), Some(Command::Skip));
        assert_eq!(parse_command("q"), Some(Command::Close));
        assert_eq!(parse_command("dance"), None);
    }

    #[tokio::test]
    async fn next_through_every_step_completes() {
        let mut runner = runner();
        let mut widget = TerminalSpotlight::new(true);
        let summary = drive(&mut runner, &mut widget, Cursor::new("next\nnext\n"))
            .await
            .unwrap();
        assert_eq!(summary.result, "completed");
        assert_eq!(summary.steps_shown, 2);
        assert!(runner.controller().is_completed("welcome"));
        assert!(!runner.controller().is_running());
    }

    #[tokio::test]
    async fn back_then_close_stops_without_completing() {
        let mut runner = runner();
        let mut widget = TerminalSpotlight::new(true);
        let summary = drive(
            &mut runner,
            &mut widget,
            Cursor::new("next\nwhat\nback\nclose\n"),
        )
        .await
        .unwrap();
        assert_eq!(summary.result, "stopped");
        assert_eq!(summary.steps_shown, 3);
        assert!(!runner.controller().is_completed("welcome"));
        assert!(!runner.controller().is_running());
    }

    #[tokio::test]
    async fn end_of_input_closes() {
        let mut runner = runner();
        let mut widget = TerminalSpotlight::new(true);
        let summary = drive(&mut runner, &mut widget, Cursor::new(""))
            .await
            .unwrap();
        assert_eq!(summary.result, "stopped");
        assert!(!runner.controller().is_running());
    }

    #[tokio::test]
    async fn skip_stops_without_completing() {
        let mut runner = runner();
        let mut widget = TerminalSpotlight::new(true);
        let summary = drive(&mut runner, &mut widget, Cursor::new("skip\n"))
            .await
            .unwrap();
        assert_eq!(summary.result, "stopped");
        assert!(!runner.controller().is_completed("welcome"));
    }
}

use crate::cancel::CancellationToken;
use crate::controller::TourController;
use crate::localize::Localizer;
use crate::registry::{Registry, StepHook, TourDefinition};
use crate::types::Placement;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Widget event stream
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetStatus {
    Idle,
    Ready,
    Waiting,
    Running,
    Paused,
    Skipped,
    Finished,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetAction {
    Init,
    Start,
    Stop,
    Reset,
    Prev,
    Next,
    Go,
    Close,
    Skip,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TourStart,
    StepBefore,
    Beacon,
    Tooltip,
    StepAfter,
    TourEnd,
    TourStatus,
    TargetNotFound,
    Error,
}

/// One callback from the spotlight widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetEvent {
    pub status: WidgetStatus,
    pub action: WidgetAction,
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: EventKind,
}

impl WidgetEvent {
    pub fn step_before(index: usize) -> Self {
        Self {
            status: WidgetStatus::Running,
            action: WidgetAction::Update,
            index,
            kind: EventKind::StepBefore,
        }
    }

    pub fn step_after(index: usize, action: WidgetAction) -> Self {
        Self {
            status: WidgetStatus::Running,
            action,
            index,
            kind: EventKind::StepAfter,
        }
    }

    pub fn target_not_found(index: usize) -> Self {
        Self {
            status: WidgetStatus::Running,
            action: WidgetAction::Update,
            index,
            kind: EventKind::TargetNotFound,
        }
    }

    pub fn finished(index: usize) -> Self {
        Self {
            status: WidgetStatus::Finished,
            action: WidgetAction::Next,
            index,
            kind: EventKind::TourEnd,
        }
    }

    pub fn skipped(index: usize) -> Self {
        Self {
            status: WidgetStatus::Skipped,
            action: WidgetAction::Skip,
            index,
            kind: EventKind::TourEnd,
        }
    }

    pub fn closed(index: usize) -> Self {
        Self {
            status: WidgetStatus::Running,
            action: WidgetAction::Close,
            index,
            kind: EventKind::StepAfter,
        }
    }
}

// ---------------------------------------------------------------------------
// Render model
// ---------------------------------------------------------------------------

/// A step with its text resolved, ready for the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderStep {
    pub target: String,
    pub title: String,
    pub content: String,
    pub placement: Placement,
    pub spotlight_padding: u32,
    pub disable_interaction: bool,
    /// Always true: the spotlight opens immediately instead of waiting on a beacon.
    pub disable_beacon: bool,
}

/// Everything the widget needs for one render pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpotlightFrame {
    pub tour_id: String,
    pub steps: Vec<RenderStep>,
    pub step_index: usize,
    pub run: bool,
}

impl SpotlightFrame {
    pub fn current(&self) -> Option<&RenderStep> {
        self.steps.get(self.step_index)
    }
}

/// The external overlay. It owns no tour identity; it only draws frames.
pub trait SpotlightWidget {
    fn render(&mut self, frame: Option<&SpotlightFrame>);
}

// ---------------------------------------------------------------------------
// Runner state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Active { tour_id: String, step_index: usize },
}

/// What the runner did with an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunnerOutcome {
    /// Idle runner, or an event kind the runner does not act on.
    Ignored,
    /// `before_step` settled; the spotlight for `index` may be shown.
    StepReady { index: usize },
    /// The step index moved.
    Moved { index: usize },
    Completed { tour_id: String },
    Stopped,
    /// The run ended while a hook was in flight; the event was dropped.
    Cancelled,
}

// ---------------------------------------------------------------------------
// StepRunner
// ---------------------------------------------------------------------------

/// Drives the spotlight widget for whichever tour the controller says is
/// active. Events are handled one at a time; `handle` takes `&mut self` so
/// a second event cannot be processed while a hook is still pending.
pub struct StepRunner {
    controller: TourController,
    registry: Arc<Registry>,
    localizer: Arc<dyn Localizer>,
}

enum HookPhase {
    Before,
    After,
}

impl HookPhase {
    fn as_str(&self) -> &'static str {
        match self {
            HookPhase::Before => "before_step",
            HookPhase::After => "after_step",
        }
    }
}

impl StepRunner {
    pub fn new(
        controller: TourController,
        registry: Arc<Registry>,
        localizer: Arc<dyn Localizer>,
    ) -> Self {
        Self {
            controller,
            registry,
            localizer,
        }
    }

    pub fn controller(&self) -> &TourController {
        &self.controller
    }

    /// Active only when a tour is running, its id is registered, and it has
    /// at least one step.
    pub fn state(&self) -> RunnerState {
        match self.active_tour() {
            Some((tour, step_index)) => RunnerState::Active {
                tour_id: tour.id.clone(),
                step_index,
            },
            None => RunnerState::Idle,
        }
    }

    fn active_tour(&self) -> Option<(&TourDefinition, usize)> {
        let state = self.controller.snapshot();
        let id = state.active_tour_id()?;
        let tour = self.registry.get(id)?;
        if tour.steps.is_empty() {
            return None;
        }
        Some((tour, state.step_index()))
    }

    pub fn render_steps(&self, tour: &TourDefinition) -> Vec<RenderStep> {
        let total = tour.steps.len().to_string();
        tour.steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let mut args = HashMap::new();
                args.insert("step".to_string(), (i + 1).to_string());
                args.insert("total".to_string(), total.clone());
                RenderStep {
                    target: step.target.selector().to_string(),
                    title: self.localizer.resolve(&step.title, &args),
                    content: self.localizer.resolve(&step.content, &args),
                    placement: step.placement,
                    spotlight_padding: step.spotlight_padding,
                    disable_interaction: step.disable_interaction,
                    disable_beacon: true,
                }
            })
            .collect()
    }

    /// Current frame, or `None` when idle or when the index has run past the
    /// last step.
    pub fn frame(&self) -> Option<SpotlightFrame> {
        let (tour, step_index) = self.active_tour()?;
        if step_index >= tour.steps.len() {
            return None;
        }
        Some(SpotlightFrame {
            tour_id: tour.id.clone(),
            steps: self.render_steps(tour),
            step_index,
            run: true,
        })
    }

    pub fn sync(&self, widget: &mut dyn SpotlightWidget) {
        widget.render(self.frame().as_ref());
    }

    /// Finish a tour whose step index was pushed past its last step from
    /// outside the runner (e.g. `next_step` called directly).
    pub fn reconcile(&self) -> RunnerOutcome {
        let Some((tour, step_index)) = self.active_tour() else {
            return RunnerOutcome::Ignored;
        };
        if step_index < tour.steps.len() {
            return RunnerOutcome::Ignored;
        }
        let tour_id = tour.id.clone();
        self.controller.complete(&tour_id);
        RunnerOutcome::Completed { tour_id }
    }

    pub async fn handle(&mut self, event: WidgetEvent) -> RunnerOutcome {
        let Some((tour, _)) = self.active_tour() else {
            tracing::debug!(?event, "widget event while idle");
            return RunnerOutcome::Ignored;
        };
        let tour_id = tour.id.clone();
        let step_count = tour.steps.len();
        let step = tour.steps.get(event.index);
        let before_hook = step.and_then(|s| s.before_step.clone());
        let after_hook = step.and_then(|s| s.after_step.clone());

        let token = self.controller.run_token();
        // Leaving a step runs its after hook, even when the widget is closing.
        if event.kind == EventKind::StepAfter {
            if let Some(hook) = &after_hook {
                if !run_hook(hook, &token, &tour_id, event.index, HookPhase::After).await {
                    return RunnerOutcome::Cancelled;
                }
            }
        }

        if event.action == WidgetAction::Close {
            self.controller.stop();
            return RunnerOutcome::Stopped;
        }
        match event.status {
            WidgetStatus::Finished => {
                self.controller.complete(&tour_id);
                return RunnerOutcome::Completed { tour_id };
            }
            WidgetStatus::Skipped => {
                self.controller.stop();
                return RunnerOutcome::Stopped;
            }
            _ => {}
        }

        match event.kind {
            EventKind::StepBefore => {
                if let Some(hook) = before_hook {
                    if !run_hook(&hook, &token, &tour_id, event.index, HookPhase::Before).await {
                        return RunnerOutcome::Cancelled;
                    }
                }
                RunnerOutcome::StepReady { index: event.index }
            }
            EventKind::StepAfter => match event.action {
                WidgetAction::Next => self.advance_to(&tour_id, event.index + 1, step_count),
                WidgetAction::Prev => {
                    self.advance_to(&tour_id, event.index.saturating_sub(1), step_count)
                }
                _ => RunnerOutcome::Ignored,
            },
            EventKind::TargetNotFound => {
                tracing::warn!(tour_id = %tour_id, index = event.index, "step target not found, skipping step");
                self.advance_to(&tour_id, event.index + 1, step_count)
            }
            _ => RunnerOutcome::Ignored,
        }
    }

    fn advance_to(&self, tour_id: &str, index: usize, step_count: usize) -> RunnerOutcome {
        if index >= step_count {
            self.controller.complete(tour_id);
            return RunnerOutcome::Completed {
                tour_id: tour_id.to_string(),
            };
        }
        self.controller.set_step_index(index);
        RunnerOutcome::Moved { index }
    }
}

/// Await a hook unless the run is cancelled first. Hook errors are logged
/// and the transition continues. Returns false when the run ended.
async fn run_hook(
    hook: &StepHook,
    token: &CancellationToken,
    tour_id: &str,
    index: usize,
    phase: HookPhase,
) -> bool {
    tokio::select! {
        _ = token.cancelled() => {
            tracing::debug!(tour_id = %tour_id, index, hook = phase.as_str(), "hook abandoned, run ended");
            false
        }
        result = hook.call() => {
            if let Err(e) = result {
                tracing::warn!(tour_id = %tour_id, index, hook = phase.as_str(), error = %e, "step hook failed, continuing");
            }
            !token.is_cancelled()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TourError;
    use crate::kv::MemoryStore;
    use crate::localize::CatalogLocalizer;
    use crate::persist::TourPersistence;
    use crate::registry::StepDefinition;
    use crate::store::TourStore;
    use crate::types::Category;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn registry() -> Registry {
        Registry::new(vec![
            TourDefinition::new("dashboard", Category::Operations).with_steps(vec![
                StepDefinition::new("body", "tours.dashboard.welcome", "tours.dashboard.intro"),
                StepDefinition::new("#systems", "tours.dashboard.systems", "tours.step"),
            ]),
            TourDefinition::new("empty", Category::Management),
        ])
    }

    fn localizer() -> Arc<dyn Localizer> {
        let mut entries = BTreeMap::new();
        entries.insert("tours.dashboard.welcome".to_string(), "Welcome".to_string());
        entries.insert("tours.step".to_string(), "Step {{step}} of {{total}}".to_string());
        Arc::new(CatalogLocalizer::new(entries))
    }

    fn runner_with(registry: Registry) -> StepRunner {
        let persistence = TourPersistence::new(Arc::new(MemoryStore::new()));
        let controller = TourController::new(Arc::new(TourStore::open(persistence)));
        StepRunner::new(controller, Arc::new(registry), localizer())
    }

    fn runner() -> StepRunner {
        runner_with(registry())
    }

    #[derive(Default)]
    struct RecordingWidget {
        frames: Vec<Option<SpotlightFrame>>,
    }

    impl SpotlightWidget for RecordingWidget {
        fn render(&mut self, frame: Option<&SpotlightFrame>) {
            self.frames.push(frame.cloned());
        }
    }

    #[test]
    fn idle_until_a_registered_tour_runs() {
        let r = runner();
        assert_eq!(r.state(), RunnerState::Idle);

        r.controller().start("not-registered");
        assert!(r.controller().is_running());
        assert_eq!(r.state(), RunnerState::Idle);
        assert!(r.frame().is_none());

        r.controller().start("empty");
        assert_eq!(r.state(), RunnerState::Idle);

        r.controller().start("dashboard");
        assert_eq!(
            r.state(),
            RunnerState::Active {
                tour_id: "dashboard".into(),
                step_index: 0
            }
        );
    }

    #[test]
    fn frame_resolves_text_and_disables_beacons() {
        let r = runner();
        r.controller().start("dashboard");
        let frame = r.frame().unwrap();
        assert!(frame.run);
        assert_eq!(frame.steps.len(), 2);
        assert_eq!(frame.steps[0].target, "body");
        assert_eq!(frame.steps[0].title, "Welcome");
        assert_eq!(frame.steps[0].content, "tours.dashboard.intro");
        assert_eq!(frame.steps[1].content, "Step 2 of 2");
        assert!(frame.steps.iter().all(|s| s.disable_beacon));
        assert_eq!(frame.current().unwrap().title, "Welcome");
    }

    #[test]
    fn sync_pushes_frames_to_widget() {
        let r = runner();
        let mut widget = RecordingWidget::default();
        r.sync(&mut widget);
        r.controller().start("dashboard");
        r.sync(&mut widget);
        assert!(widget.frames[0].is_none());
        assert_eq!(widget.frames[1].as_ref().unwrap().tour_id, "dashboard");
    }

    #[tokio::test]
    async fn events_while_idle_are_ignored() {
        let mut r = runner();
        assert_eq!(r.handle(WidgetEvent::finished(0)).await, RunnerOutcome::Ignored);
        assert!(r.controller().completed_tour_ids().is_empty());
    }

    #[tokio::test]
    async fn walk_forward_and_back_then_finish() {
        let mut r = runner();
        r.controller().start("dashboard");

        assert_eq!(
            r.handle(WidgetEvent::step_before(0)).await,
            RunnerOutcome::StepReady { index: 0 }
        );
        assert_eq!(
            r.handle(WidgetEvent::step_after(0, WidgetAction::Next)).await,
            RunnerOutcome::Moved { index: 1 }
        );
        assert_eq!(r.controller().step_index(), 1);
        assert_eq!(
            r.handle(WidgetEvent::step_after(1, WidgetAction::Prev)).await,
            RunnerOutcome::Moved { index: 0 }
        );
        assert_eq!(
            r.handle(WidgetEvent::step_after(0, WidgetAction::Prev)).await,
            RunnerOutcome::Moved { index: 0 }
        );
        assert_eq!(
            r.handle(WidgetEvent::finished(1)).await,
            RunnerOutcome::Completed {
                tour_id: "dashboard".into()
            }
        );
        assert!(r.controller().is_completed("dashboard"));
        assert!(!r.controller().is_running());
    }

    #[tokio::test]
    async fn advancing_past_last_step_completes() {
        let mut r = runner();
        r.controller().start("dashboard");
        r.handle(WidgetEvent::step_after(0, WidgetAction::Next)).await;
        let outcome = r.handle(WidgetEvent::step_after(1, WidgetAction::Next)).await;
        assert_eq!(
            outcome,
            RunnerOutcome::Completed {
                tour_id: "dashboard".into()
            }
        );
        assert!(r.controller().is_completed("dashboard"));
    }

    #[test]
    fn reconcile_finishes_overflowed_tour() {
        let r = runner();
        r.controller().start("dashboard");
        assert_eq!(r.reconcile(), RunnerOutcome::Ignored);
        r.controller().next_step();
        r.controller().next_step();
        r.controller().next_step();
        assert_eq!(r.controller().step_index(), 3);
        assert!(r.frame().is_none());
        assert_eq!(
            r.reconcile(),
            RunnerOutcome::Completed {
                tour_id: "dashboard".into()
            }
        );
        assert!(!r.controller().is_running());
    }

    #[tokio::test]
    async fn skip_stops_without_completion() {
        let mut r = runner();
        r.controller().start("dashboard");
        assert_eq!(r.handle(WidgetEvent::skipped(0)).await, RunnerOutcome::Stopped);
        assert!(!r.controller().is_running());
        assert!(!r.controller().is_completed("dashboard"));
    }

    #[tokio::test]
    async fn close_stops_even_when_finished() {
        let mut r = runner();
        r.controller().start("dashboard");
        let event = WidgetEvent {
            status: WidgetStatus::Finished,
            action: WidgetAction::Close,
            index: 1,
            kind: EventKind::TourEnd,
        };
        assert_eq!(r.handle(event).await, RunnerOutcome::Stopped);
        assert!(!r.controller().is_completed("dashboard"));
    }

    fn counting_hook(calls: &Arc<AtomicUsize>) -> StepHook {
        let calls = calls.clone();
        StepHook::new(move || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn close_runs_after_hook_once_then_stops() {
        let calls = Arc::new(AtomicUsize::new(0));
        let reg = Registry::new(vec![TourDefinition::new("dashboard", Category::Operations)
            .with_steps(vec![
                StepDefinition::new("body", "tours.dashboard.welcome", "tours.step")
                    .with_after_step(counting_hook(&calls)),
                StepDefinition::new("#systems", "tours.dashboard.systems", "tours.step"),
            ])]);
        let mut r = runner_with(reg);
        r.controller().start("dashboard");

        assert_eq!(r.handle(WidgetEvent::closed(0)).await, RunnerOutcome::Stopped);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!r.controller().is_running());
        assert!(!r.controller().is_completed("dashboard"));
    }

    #[tokio::test]
    async fn builder_before_hook_runs_on_step_entry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let reg = Registry::new(vec![TourDefinition::new("dashboard", Category::Operations)
            .with_steps(vec![StepDefinition::new(
                "body",
                "tours.dashboard.welcome",
                "tours.step",
            )
            .with_before_step(counting_hook(&calls))])]);
        let mut r = runner_with(reg);
        r.controller().start("dashboard");

        assert_eq!(
            r.handle(WidgetEvent::step_before(0)).await,
            RunnerOutcome::StepReady { index: 0 }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            r.handle(WidgetEvent::step_after(0, WidgetAction::Next)).await,
            RunnerOutcome::Completed {
                tour_id: "dashboard".to_string()
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn target_not_found_moves_on() {
        let mut r = runner();
        r.controller().start("dashboard");
        assert_eq!(
            r.handle(WidgetEvent::target_not_found(0)).await,
            RunnerOutcome::Moved { index: 1 }
        );
    }

    #[tokio::test]
    async fn hooks_run_in_order_before_transitions() {
        let log = Arc::new(Mutex::new(Vec::<String>::new()));
        let hook = |label: &'static str| {
            let log = log.clone();
            StepHook::new(move || {
                let log = log.clone();
                async move {
                    tokio::task::yield_now().await;
                    log.lock().unwrap().push(label.to_string());
                    Ok(())
                }
            })
        };
        let mut reg = registry();
        reg.attach_before_step("dashboard", 1, hook("open-panel")).unwrap();
        reg.attach_after_step("dashboard", 0, hook("leave-welcome")).unwrap();

        let mut r = runner_with(reg);
        r.controller().start("dashboard");
        r.handle(WidgetEvent::step_before(0)).await;
        r.handle(WidgetEvent::step_after(0, WidgetAction::Next)).await;
        assert_eq!(r.controller().step_index(), 1);
        r.handle(WidgetEvent::step_before(1)).await;

        assert_eq!(*log.lock().unwrap(), vec!["leave-welcome", "open-panel"]);
    }

    #[tokio::test]
    async fn failing_hook_is_logged_and_tour_continues() {
        let mut reg = registry();
        reg.attach_after_step(
            "dashboard",
            0,
            StepHook::new(|| async { Err(TourError::Hook("panel missing".into())) }),
        )
        .unwrap();
        let mut r = runner_with(reg);
        r.controller().start("dashboard");
        assert_eq!(
            r.handle(WidgetEvent::step_after(0, WidgetAction::Next)).await,
            RunnerOutcome::Moved { index: 1 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_hook_drops_the_transition() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut reg = registry();
        let c = calls.clone();
        reg.attach_after_step(
            "dashboard",
            0,
            StepHook::new(move || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(())
                }
            }),
        )
        .unwrap();

        let mut r = runner_with(reg);
        let controller = r.controller().clone();
        controller.start("dashboard");

        let task = tokio::spawn(async move {
            r.handle(WidgetEvent::step_after(0, WidgetAction::Next)).await
        });
        tokio::task::yield_now().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        controller.stop();
        assert_eq!(task.await.unwrap(), RunnerOutcome::Cancelled);
        assert!(!controller.is_running());
        assert_eq!(controller.step_index(), 0);
        assert!(!controller.is_completed("dashboard"));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_during_hook_does_not_move_new_run() {
        let mut reg = registry();
        reg.attach_before_step(
            "dashboard",
            1,
            StepHook::new(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            }),
        )
        .unwrap();
        let mut r = runner_with(reg);
        let controller = r.controller().clone();
        controller.start("dashboard");
        controller.set_step_index(1);

        let task = tokio::spawn(async move { r.handle(WidgetEvent::step_before(1)).await });
        tokio::task::yield_now().await;
        controller.start("dashboard");

        assert_eq!(task.await.unwrap(), RunnerOutcome::Cancelled);
        assert!(controller.is_running());
        assert_eq!(controller.step_index(), 0);
    }
}

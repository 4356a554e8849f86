use crate::cancel::CancellationToken;
use crate::controller::TourController;
use crate::persist::TourPersistence;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// AutoStartDecision
// ---------------------------------------------------------------------------

/// Outcome of evaluating auto-start for one page mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoStartDecision {
    /// The mounting page opted out for this mount.
    Disabled,
    /// The user turned auto-start off in preferences.
    PreferenceOff,
    /// Another tour is already running.
    TourRunning,
    /// The tour has been completed before.
    Completed,
    /// Auto-start was already offered for this tour.
    AlreadyVisited,
    /// Visited marker written; start fires after the settle delay.
    Scheduled,
}

impl AutoStartDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            AutoStartDecision::Disabled => "disabled",
            AutoStartDecision::PreferenceOff => "preference_off",
            AutoStartDecision::TourRunning => "tour_running",
            AutoStartDecision::Completed => "completed",
            AutoStartDecision::AlreadyVisited => "already_visited",
            AutoStartDecision::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for AutoStartDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PendingStart
// ---------------------------------------------------------------------------

/// Handle owned by the mounting page. Dropping it (unmount) cancels a start
/// that has not fired yet; the visited marker stays set.
pub struct PendingStart {
    decision: AutoStartDecision,
    handle: Option<JoinHandle<bool>>,
    cancel: CancellationToken,
}

impl PendingStart {
    fn inert(decision: AutoStartDecision) -> Self {
        Self {
            decision,
            handle: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn decision(&self) -> AutoStartDecision {
        self.decision
    }

    pub fn is_scheduled(&self) -> bool {
        self.handle.is_some()
    }

    /// Explicit unmount. Same as dropping the handle.
    pub fn cancel(self) {}

    /// Wait for the settle delay to run out. Returns true if the tour was started.
    pub async fn wait(mut self) -> bool {
        match self.handle.take() {
            Some(handle) => handle.await.unwrap_or(false),
            None => false,
        }
    }
}

impl Drop for PendingStart {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ---------------------------------------------------------------------------
// AutoStartPolicy
// ---------------------------------------------------------------------------

/// Offers each tour at most once: the first eligible mount marks the tour
/// visited and schedules `start` after a settle delay so the page's anchors
/// exist by the time the spotlight looks for them.
#[derive(Clone)]
pub struct AutoStartPolicy {
    controller: TourController,
    persistence: TourPersistence,
    settle_delay: Duration,
}

impl AutoStartPolicy {
    pub fn new(
        controller: TourController,
        persistence: TourPersistence,
        settle_delay: Duration,
    ) -> Self {
        Self {
            controller,
            persistence,
            settle_delay,
        }
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Evaluate the eligibility checks without side effects.
    pub fn evaluate(&self, tour_id: &str, enabled: bool) -> AutoStartDecision {
        if !enabled {
            return AutoStartDecision::Disabled;
        }
        let state = self.controller.snapshot();
        if !state.preferences().auto_start_enabled {
            return AutoStartDecision::PreferenceOff;
        }
        if state.is_running() {
            return AutoStartDecision::TourRunning;
        }
        if state.is_completed(tour_id) {
            return AutoStartDecision::Completed;
        }
        if self.persistence.is_visited(tour_id) {
            return AutoStartDecision::AlreadyVisited;
        }
        AutoStartDecision::Scheduled
    }

    /// Page mount. When eligible, the visited marker is written before this
    /// returns and the delayed start is spawned on the current Tokio runtime.
    pub fn on_mount(&self, tour_id: &str, enabled: bool) -> PendingStart {
        let decision = self.evaluate(tour_id, enabled);
        tracing::debug!(tour_id = %tour_id, decision = %decision, "auto-start evaluated");
        if decision != AutoStartDecision::Scheduled {
            return PendingStart::inert(decision);
        }

        self.persistence.mark_visited(tour_id);

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let controller = self.controller.clone();
        let delay = self.settle_delay;
        let id = tour_id.to_string();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(tour_id = %id, "auto-start cancelled by unmount");
                    false
                }
                _ = tokio::time::sleep(delay) => {
                    tracing::info!(tour_id = %id, "auto-starting tour");
                    controller.start(&id);
                    true
                }
            }
        });

        PendingStart {
            decision,
            handle: Some(handle),
            cancel,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

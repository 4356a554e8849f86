use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// User-level tour preferences. Persisted as `{autoStartEnabled, showHelpButton}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "default_true")]
    pub auto_start_enabled: bool,
    #[serde(default = "default_true")]
    pub show_help_button: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_start_enabled: true,
            show_help_button: true,
        }
    }
}

/// Partial update for [`Preferences`]; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_help_button: Option<bool>,
}

impl PreferencesPatch {
    pub fn is_empty(&self) -> bool {
        self.auto_start_enabled.is_none() && self.show_help_button.is_none()
    }
}

impl Preferences {
    pub fn merge(self, patch: PreferencesPatch) -> Self {
        Self {
            auto_start_enabled: patch.auto_start_enabled.unwrap_or(self.auto_start_enabled),
            show_help_button: patch.show_help_button.unwrap_or(self.show_help_button),
        }
    }
}

// ---------------------------------------------------------------------------
// TourAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourAction {
    Start(String),
    Stop,
    Complete(String),
    Reset(String),
    ResetAll,
    SetStepIndex(usize),
    NextStep,
    PreviousStep,
    SetPreferences(PreferencesPatch),
}

impl TourAction {
    pub fn name(&self) -> &'static str {
        match self {
            TourAction::Start(_) => "start",
            TourAction::Stop => "stop",
            TourAction::Complete(_) => "complete",
            TourAction::Reset(_) => "reset",
            TourAction::ResetAll => "reset_all",
            TourAction::SetStepIndex(_) => "set_step_index",
            TourAction::NextStep => "next_step",
            TourAction::PreviousStep => "previous_step",
            TourAction::SetPreferences(_) => "set_preferences",
        }
    }
}

// ---------------------------------------------------------------------------
// TourState
// ---------------------------------------------------------------------------

/// Runtime state of the tour engine.
///
/// `is_running()` is derived from the active tour id, so a running state
/// without a tour cannot be constructed. Step moves are ignored while no tour
/// is active, which keeps `step_index == 0` whenever the engine is idle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TourState {
    active_tour_id: Option<String>,
    step_index: usize,
    completed_tour_ids: Vec<String>,
    preferences: Preferences,
}

impl TourState {
    /// Idle state seeded from persisted data. Duplicate ids are collapsed.
    pub fn new(completed_tour_ids: Vec<String>, preferences: Preferences) -> Self {
        let mut state = Self {
            preferences,
            ..Self::default()
        };
        for id in completed_tour_ids {
            state.insert_completed(id);
        }
        state
    }

    pub fn active_tour_id(&self) -> Option<&str> {
        self.active_tour_id.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.active_tour_id.is_some()
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn completed_tour_ids(&self) -> &[String] {
        &self.completed_tour_ids
    }

    pub fn is_completed(&self, tour_id: &str) -> bool {
        self.completed_tour_ids.iter().any(|id| id == tour_id)
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    fn insert_completed(&mut self, tour_id: String) {
        if !self.is_completed(&tour_id) {
            self.completed_tour_ids.push(tour_id);
        }
    }

    fn clear_running(&mut self) {
        self.active_tour_id = None;
        self.step_index = 0;
    }
}

/// Pure transition function. Returns the next state; never touches storage.
pub fn reduce(state: &TourState, action: &TourAction) -> TourState {
    let mut next = state.clone();
    match action {
        TourAction::Start(tour_id) => {
            next.active_tour_id = Some(tour_id.clone());
            next.step_index = 0;
        }
        TourAction::Stop => next.clear_running(),
        TourAction::Complete(tour_id) => {
            next.insert_completed(tour_id.clone());
            next.clear_running();
        }
        TourAction::Reset(tour_id) => {
            next.completed_tour_ids.retain(|id| id != tour_id);
        }
        TourAction::ResetAll => {
            next.completed_tour_ids.clear();
            next.clear_running();
        }
        TourAction::SetStepIndex(index) => {
            if next.is_running() {
                next.step_index = *index;
            }
        }
        TourAction::NextStep => {
            if next.is_running() {
                next.step_index = next.step_index.saturating_add(1);
            }
        }
        TourAction::PreviousStep => {
            next.step_index = next.step_index.saturating_sub(1);
        }
        TourAction::SetPreferences(patch) => {
            next.preferences = next.preferences.merge(*patch);
        }
    }
    next
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

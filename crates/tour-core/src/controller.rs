use crate::cancel::CancellationToken;
use crate::registry::{Registry, TourDefinition};
use crate::state::{Preferences, PreferencesPatch, TourAction, TourState};
use crate::store::TourStore;
use std::sync::Arc;

/// Command/query facade over a [`TourStore`]. Cheap to clone; holds no
/// state of its own.
#[derive(Clone)]
pub struct TourController {
    store: Arc<TourStore>,
}

impl TourController {
    pub fn new(store: Arc<TourStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<TourStore> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Start `tour_id` from its first step. The id is not checked against
    /// the registry; an unknown id yields a running state nothing can render.
    pub fn start(&self, tour_id: &str) {
        tracing::info!(tour_id = %tour_id, "tour started");
        self.store.dispatch(TourAction::Start(tour_id.to_string()));
    }

    pub fn stop(&self) {
        if let Some(id) = self.active_tour_id() {
            tracing::info!(tour_id = %id, "tour stopped");
        }
        self.store.dispatch(TourAction::Stop);
    }

    pub fn complete(&self, tour_id: &str) {
        tracing::info!(tour_id = %tour_id, "tour completed");
        self.store.dispatch(TourAction::Complete(tour_id.to_string()));
    }

    pub fn reset(&self, tour_id: &str) {
        self.store.dispatch(TourAction::Reset(tour_id.to_string()));
    }

    pub fn reset_all(&self) {
        tracing::info!("all tour progress reset");
        self.store.dispatch(TourAction::ResetAll);
    }

    pub fn set_step_index(&self, index: usize) {
        self.store.dispatch(TourAction::SetStepIndex(index));
    }

    pub fn next_step(&self) {
        self.store.dispatch(TourAction::NextStep);
    }

    pub fn previous_step(&self) {
        self.store.dispatch(TourAction::PreviousStep);
    }

    pub fn set_preferences(&self, patch: PreferencesPatch) -> Preferences {
        self.store
            .dispatch(TourAction::SetPreferences(patch))
            .preferences()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> TourState {
        self.store.snapshot()
    }

    pub fn is_completed(&self, tour_id: &str) -> bool {
        self.store.snapshot().is_completed(tour_id)
    }

    pub fn is_running(&self) -> bool {
        self.store.snapshot().is_running()
    }

    pub fn active_tour_id(&self) -> Option<String> {
        self.store.snapshot().active_tour_id().map(str::to_string)
    }

    pub fn step_index(&self) -> usize {
        self.store.snapshot().step_index()
    }

    pub fn completed_tour_ids(&self) -> Vec<String> {
        self.store.snapshot().completed_tour_ids().to_vec()
    }

    pub fn preferences(&self) -> Preferences {
        self.store.snapshot().preferences()
    }

    pub fn run_token(&self) -> CancellationToken {
        self.store.run_token()
    }

    pub fn get_tour_config<'r>(
        &self,
        tour_id: &str,
        registry: &'r Registry,
    ) -> Option<&'r TourDefinition> {
        registry.get(tour_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use crate::cancel::CancellationToken;
use crate::persist::TourPersistence;
use crate::state::{reduce, TourAction, TourState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Receives every dispatched action together with the state before and
/// after it. Observers run inside `dispatch` and must not dispatch themselves.
pub trait StateObserver: Send + Sync {
    fn on_change(&self, action: &TourAction, prev: &TourState, next: &TourState);
}

/// Injectable state container: owns the current [`TourState`], applies
/// actions through [`reduce`], and fans changes out to observers.
///
/// Each tour run gets its own [`CancellationToken`]. Starting a new tour or
/// leaving the running state cancels the previous run's token so in-flight
/// hooks and timers can tell their run is over.
pub struct TourStore {
    state: Mutex<TourState>,
    observers: Mutex<Vec<Arc<dyn StateObserver>>>,
    run_token: Mutex<CancellationToken>,
}

impl TourStore {
    pub fn new(initial: TourState) -> Self {
        Self {
            state: Mutex::new(initial),
            observers: Mutex::new(Vec::new()),
            run_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Store seeded from persisted data, with persistence subscribed.
    pub fn open(persistence: TourPersistence) -> Self {
        let store = Self::new(persistence.load_state());
        store.subscribe(Arc::new(persistence));
        store
    }

    pub fn subscribe(&self, observer: Arc<dyn StateObserver>) {
        lock(&self.observers).push(observer);
    }

    pub fn snapshot(&self) -> TourState {
        lock(&self.state).clone()
    }

    /// Token for the current run. Cancelled once that run stops, completes,
    /// or is replaced by another `start`.
    pub fn run_token(&self) -> CancellationToken {
        lock(&self.run_token).clone()
    }

    pub fn dispatch(&self, action: TourAction) -> TourState {
        let observers: Vec<Arc<dyn StateObserver>> = lock(&self.observers).clone();
        let mut state = lock(&self.state);
        let prev = state.clone();
        let next = reduce(&prev, &action);

        tracing::debug!(
            action = action.name(),
            active = ?next.active_tour_id(),
            step = next.step_index(),
            "tour action dispatched"
        );

        let restarted = matches!(action, TourAction::Start(_));
        let ended = prev.is_running() && !next.is_running();
        if restarted || ended {
            let mut token = lock(&self.run_token);
            token.cancel();
            *token = CancellationToken::new();
        }

        *state = next.clone();
        for observer in &observers {
            observer.on_change(&action, &prev, &next);
        }
        next
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

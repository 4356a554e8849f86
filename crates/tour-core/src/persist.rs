use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::state::{Preferences, TourAction, TourState};
use crate::store::StateObserver;
use std::sync::Arc;

pub const COMPLETED_KEY: &str = "tour-completed";
pub const PREFERENCES_KEY: &str = "tour-preferences";
pub const VISITED_PREFIX: &str = "tour-visited:";

pub fn visited_key(tour_id: &str) -> String {
    format!("{VISITED_PREFIX}{tour_id}")
}

/// Typed view over a [`KeyValueStore`].
///
/// Layout: `tour-completed` holds a JSON array of ids, `tour-preferences` a
/// JSON object, and `tour-visited:<id>` a JSON boolean per tour. Read and
/// write failures are logged and swallowed; callers always get a usable value.
#[derive(Clone)]
pub struct TourPersistence {
    kv: Arc<dyn KeyValueStore>,
}

impl TourPersistence {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Initial runtime state: persisted completed ids and preferences, idle.
    pub fn load_state(&self) -> TourState {
        TourState::new(self.load_completed(), self.load_preferences())
    }

    pub fn load_completed(&self) -> Vec<String> {
        self.read_json(COMPLETED_KEY).unwrap_or_default()
    }

    pub fn load_preferences(&self) -> Preferences {
        self.read_json(PREFERENCES_KEY).unwrap_or_default()
    }

    pub fn save_completed(&self, ids: &[String]) {
        self.write_json(COMPLETED_KEY, ids);
    }

    pub fn save_preferences(&self, prefs: Preferences) {
        self.write_json(PREFERENCES_KEY, &prefs);
    }

    pub fn is_visited(&self, tour_id: &str) -> bool {
        self.read_json(&visited_key(tour_id)).unwrap_or(false)
    }

    pub fn mark_visited(&self, tour_id: &str) {
        self.write_json(&visited_key(tour_id), &true);
    }

    /// Remove every visited marker. Returns how many were cleared.
    pub fn clear_visited(&self) -> usize {
        let keys = match self.kv.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list tour store keys");
                return 0;
            }
        };
        let mut cleared = 0;
        for key in keys.iter().filter(|k| k.starts_with(VISITED_PREFIX)) {
            match self.kv.remove(key) {
                Ok(()) => cleared += 1,
                Err(e) => tracing::warn!(key = %key, error = %e, "failed to clear visited marker"),
            }
        }
        cleared
    }

    /// Ids of every tour with a visited marker set.
    pub fn visited_tours(&self) -> Vec<String> {
        self.kv
            .keys()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|k| k.strip_prefix(VISITED_PREFIX).map(str::to_string))
            .filter(|id| self.is_visited(id))
            .collect()
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "tour store read failed, using default");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "corrupt tour store value, using default");
                None
            }
        }
    }

    fn write_json<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_write_json(key, value) {
            tracing::warn!(key = %key, error = %e, "tour store write failed");
        }
    }

    fn try_write_json<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.kv.set(key, &raw)
    }
}

/// Writes completed ids and preferences whenever a dispatch changes them.
/// `ResetAll` additionally clears every visited marker.
impl StateObserver for TourPersistence {
    fn on_change(&self, action: &TourAction, prev: &TourState, next: &TourState) {
        if prev.completed_tour_ids() != next.completed_tour_ids() {
            self.save_completed(next.completed_tour_ids());
        }
        if prev.preferences() != next.preferences() {
            self.save_preferences(next.preferences());
        }
        if matches!(action, TourAction::ResetAll) {
            let cleared = self.clear_visited();
            tracing::debug!(cleared, "visited markers cleared");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

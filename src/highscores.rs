//! All-time-high score record
//!
//! Persisted through the injected key-value store as a plain decimal string.
//! Writes only ever raise the value.

use std::cell::Cell;
use std::rc::Rc;

use crate::persistence::SharedStore;

/// Monotonic high-score store
#[derive(Clone)]
pub struct ScoreStore {
    backend: SharedStore,
    /// Best value seen this process, so a failing backend cannot make the
    /// record appear to go down
    session_best: Rc<Cell<f64>>,
}

impl ScoreStore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "arena_high_score";

    pub fn new(backend: SharedStore) -> Self {
        Self {
            backend,
            session_best: Rc::new(Cell::new(0.0)),
        }
    }

    /// Current all-time high; absent or corrupt records read as 0
    pub fn get(&self) -> f64 {
        let stored = self
            .backend
            .borrow()
            .get(Self::STORAGE_KEY)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(0.0);
        stored.max(self.session_best.get())
    }

    /// Persist `value` if it beats the stored record.
    /// Returns true when a new record was set.
    pub fn record_if_higher(&self, value: f64) -> bool {
        if !value.is_finite() || value <= self.get() {
            return false;
        }
        self.session_best.set(value);

        let result = self
            .backend
            .borrow_mut()
            .set(Self::STORAGE_KEY, &value.to_string());
        match result {
            Ok(()) => log::info!("New high score: {:.1}", value),
            Err(e) => log::warn!("High score {:.1} not persisted: {}", value, e),
        }
        true
    }
}

impl std::fmt::Debug for ScoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreStore")
            .field("best", &self.get())
            .finish()
    }
}

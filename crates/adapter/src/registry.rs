//! Placement-keyed store of mediation listeners for fullscreen ads.
//!
//! Interstitial and rewarded ads report clicks, rewards and dismissals long
//! after `load` returns, so the listener handed to `load` is parked here until
//! `show` claims it. At most one listener is held per placement; a later
//! registration replaces an earlier one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::mediation::PartnerAdListener;

#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<HashMap<String, Arc<dyn PartnerAdListener>>>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<dyn PartnerAdListener>>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `listener` for `placement_id`, returning any listener it replaced.
    pub fn insert(
        &self,
        placement_id: &str,
        listener: Arc<dyn PartnerAdListener>,
    ) -> Option<Arc<dyn PartnerAdListener>> {
        let replaced = self.lock().insert(placement_id.to_string(), listener);
        if replaced.is_some() {
            log::warn!(
                "Pangle: listener for placement '{}' replaced by a newer load",
                placement_id
            );
        }
        replaced
    }

    /// Removes and returns the listener for `placement_id`.
    ///
    /// A second call for the same placement returns `None`.
    pub fn take(&self, placement_id: &str) -> Option<Arc<dyn PartnerAdListener>> {
        self.lock().remove(placement_id)
    }

    /// Drops the listener for `placement_id`. Removing an absent key is a no-op.
    pub fn remove(&self, placement_id: &str) {
        if self.lock().remove(placement_id).is_none() {
            log::debug!(
                "Pangle: no listener registered for placement '{}'",
                placement_id
            );
        }
    }

    #[must_use]
    pub fn contains(&self, placement_id: &str) -> bool {
        self.lock().contains_key(placement_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

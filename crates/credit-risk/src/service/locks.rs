use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::applications::ApplicationId;

/// Per-application mutual exclusion. Work for different applications runs in parallel;
/// work for the same application runs one call at a time.
#[derive(Debug, Default)]
pub struct ApplicationLocks {
    entries: Mutex<HashMap<ApplicationId, Arc<Mutex<()>>>>,
}

impl ApplicationLocks {
    pub fn with_lock<T>(&self, id: ApplicationId, work: impl FnOnce() -> T) -> T {
        let entry = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(entries.entry(id).or_default())
        };

        let result = {
            let _guard = entry.lock().unwrap_or_else(PoisonError::into_inner);
            work()
        };

        // Entries are cloned only under the map lock, so a count of two (map + ours)
        // means nobody else holds or waits on this entry.
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if Arc::strong_count(&entry) == 2 {
            entries.remove(&id);
        }
        result
    }

    pub fn tracked(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

//! Construct-once cache of top-level cases.
//!
//! Each case number gets its own slot. The map lock is only held while a
//! slot is fetched or created; building a case happens under the slot's own
//! lock, so concurrent lookups of the same id wait for the single builder
//! while lookups of other ids proceed. Subcases are never cached on their
//! own: they are built with their parent and reached through it.

use std::sync::{Arc, Mutex, MutexGuard};

use ds_core::DsError;
use rustc_hash::FxHashMap;

use crate::case::Case;

type Slot = Arc<Mutex<Option<Arc<Case>>>>;

#[derive(Debug, Default)]
pub(crate) struct CaseCache {
    slots: Mutex<FxHashMap<u64, Slot>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking builder leaves the slot empty; the next caller retries.
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl CaseCache {
    /// Cached case `number`, building it with `build` on first use.
    ///
    /// A failed build is not cached.
    pub(crate) fn get_or_try_insert<F>(
        &self,
        number: u64,
        build: F,
    ) -> Result<Arc<Case>, DsError>
    where
        F: FnOnce() -> Result<Case, DsError>,
    {
        let slot = {
            let mut slots = lock(&self.slots);
            Arc::clone(slots.entry(number).or_default())
        };

        let mut guard = lock(&slot);
        if let Some(case) = guard.as_ref() {
            tracing::trace!(target: "cases", number, "cache_hit");
            return Ok(Arc::clone(case));
        }
        let case = Arc::new(build()?);
        *guard = Some(Arc::clone(&case));
        tracing::trace!(target: "cases", number, "cache_fill");
        Ok(case)
    }

    /// Number of built cases.
    pub(crate) fn len(&self) -> usize {
        let slots: Vec<Slot> = lock(&self.slots).values().cloned().collect();
        slots.iter().filter(|s| lock(s).is_some()).count()
    }

    pub(crate) fn contains(&self, number: u64) -> bool {
        let slot = lock(&self.slots).get(&number).cloned();
        slot.is_some_and(|s| lock(&s).is_some())
    }
}

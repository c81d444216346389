//! Concurrent instance cache with single-winner construction.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::DiResult;
use crate::key::ServiceKey;
use crate::registration::AnyArc;

/// Mapping from `(contract, service_id?)` to a constructed instance.
///
/// Two physical caches exist per container: one process-wide for Singleton
/// services, one per scope for Scoped services. Named lookups are a
/// secondary dimension of the same map.
///
/// The lock is never held while a constructor runs: callers check, construct
/// unlocked, then get-or-insert. Under a concurrent race exactly one
/// constructed instance is observed by every caller; losing constructions
/// are discarded. A failed construction inserts nothing, so a later resolve
/// retries instead of hitting a poisoned slot.
pub(crate) struct InstanceCache {
    map: Mutex<HashMap<ServiceKey, AnyArc, ahash::RandomState>>,
}

impl InstanceCache {
    pub(crate) fn new() -> Self {
        Self {
            map: Mutex::new(HashMap::default()),
        }
    }

    pub(crate) fn get(&self, key: &ServiceKey) -> Option<AnyArc> {
        self.map.lock().get(key).cloned()
    }

    /// Inserts `value` unless another construction won the race; returns the
    /// instance every caller must observe.
    pub(crate) fn get_or_insert(&self, key: ServiceKey, value: AnyArc) -> AnyArc {
        let mut map = self.map.lock();
        match map.get(&key) {
            Some(winner) => winner.clone(),
            None => {
                map.insert(key, value.clone());
                value
            }
        }
    }

    /// Double-checked get-or-create; `construct` runs with the lock released.
    pub(crate) fn get_or_create(
        &self,
        key: &ServiceKey,
        construct: impl FnOnce() -> DiResult<AnyArc>,
    ) -> DiResult<AnyArc> {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }
        let value = construct()?;
        Ok(self.get_or_insert(key.clone(), value))
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.map.lock().len()
    }
}

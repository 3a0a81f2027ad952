//! Per-scope store for in-flight phase events
//!
//! Events are parked here between the signal that opens them and the signal
//! that closes them. Keys are `(scope id, phase)` pairs; the map is sharded so
//! sibling scopes running on different threads never contend on a global lock.

use crate::event::PhaseEvent;
use crate::types::{CorrelatorError, Phase, Result, ScopeId};
use dashmap::DashMap;
use std::fmt;

/// Address of one stored event handle
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationKey {
    pub scope: ScopeId,
    pub phase: Phase,
}

impl CorrelationKey {
    pub fn new(scope: &ScopeId, phase: Phase) -> Self {
        Self {
            scope: scope.clone(),
            phase,
        }
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.scope, self.phase)
    }
}

/// Concurrent store of open events keyed by scope and phase
pub struct ScopeStore {
    entries: DashMap<CorrelationKey, PhaseEvent>,
}

impl ScopeStore {
    /// Create an empty store with the default shard count
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Create an empty store with an explicit shard count
    ///
    /// # Returns
    /// * `Err(CorrelatorError::InvalidConfig)` unless `shards` is a power of two greater than one
    pub fn with_shards(shards: usize) -> Result<Self> {
        if shards < 2 || !shards.is_power_of_two() {
            return Err(CorrelatorError::InvalidConfig(format!(
                "store_shards must be a power of two greater than 1, got {}",
                shards
            )));
        }

        Ok(Self {
            entries: DashMap::with_shard_amount(shards),
        })
    }

    /// Associate an event with `(scope, phase)`
    ///
    /// Any previous value is overwritten and handed back to the caller.
    pub fn put(&self, scope: &ScopeId, phase: Phase, event: PhaseEvent) -> Option<PhaseEvent> {
        self.entries.insert(CorrelationKey::new(scope, phase), event)
    }

    /// Retrieve and clear the event stored under `(scope, phase)`
    ///
    /// `None` means the phase was never opened or was already closed.
    pub fn remove(&self, scope: &ScopeId, phase: Phase) -> Option<PhaseEvent> {
        self.entries
            .remove(&CorrelationKey::new(scope, phase))
            .map(|(_, event)| event)
    }

    pub fn contains(&self, scope: &ScopeId, phase: Phase) -> bool {
        self.entries.contains_key(&CorrelationKey::new(scope, phase))
    }

    /// Number of open events
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys of all open events, sorted for stable diagnostics
    pub fn pending_keys(&self) -> Vec<CorrelationKey> {
        let mut keys: Vec<CorrelationKey> =
            self.entries.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Remove and return every open event
    pub fn drain(&self) -> Vec<PhaseEvent> {
        self.pending_keys()
            .into_iter()
            .filter_map(|key| self.entries.remove(&key).map(|(_, event)| event))
            .collect()
    }
}

impl Default for ScopeStore {
    fn default() -> Self {
        Self::new()
    }
}

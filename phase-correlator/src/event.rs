//! Phase event records
//!
//! A single tagged event type covers all five lifecycle phases. Metadata is
//! stamped when the event is created and cannot be changed afterwards; only the
//! begin/stop markers move, and each of them at most once.

use crate::scope::{Scope, Subject};
use crate::types::{CorrelatorError, Phase, Result, ScopeId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Process-wide logical clock, strictly increasing across threads
static LOGICAL_CLOCK: AtomicU64 = AtomicU64::new(1);

fn next_tick() -> u64 {
    LOGICAL_CLOCK.fetch_add(1, Ordering::SeqCst)
}

/// The duration of one lifecycle phase of one scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseEvent {
    phase: Phase,
    scope_id: ScopeId,
    display_name: String,
    subject: Option<Subject>,
    owning_type: Option<String>,
    category: String,
    started_at: Option<Timestamp>,
    stopped_at: Option<Timestamp>,
    start_tick: Option<u64>,
    stop_tick: Option<u64>,
}

impl PhaseEvent {
    /// Create an event for `phase`, stamped with the metadata of `scope`
    ///
    /// `stored_under` is the scope whose store will hold the event. It differs
    /// from `scope.id` only for container teardown, which a member opens on
    /// behalf of its parent.
    pub fn new(phase: Phase, scope: &Scope, stored_under: &ScopeId, category: &str) -> Self {
        // Container-level events describe the owning type, not a single method
        let subject = if phase.is_container_level() {
            None
        } else {
            scope.subject.clone()
        };

        Self {
            phase,
            scope_id: stored_under.clone(),
            display_name: scope.display_name.clone(),
            subject,
            owning_type: scope.owning_type.clone(),
            category: category.to_string(),
            started_at: None,
            stopped_at: None,
            start_tick: None,
            stop_tick: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Scope the event belongs to
    pub fn scope_id(&self) -> &ScopeId {
        &self.scope_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    pub fn owning_type(&self) -> Option<&str> {
        self.owning_type.as_deref()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn stopped_at(&self) -> Option<Timestamp> {
        self.stopped_at
    }

    /// Logical tick taken at begin; orders events across threads
    pub fn start_tick(&self) -> Option<u64> {
        self.start_tick
    }

    /// Logical tick taken at stop
    pub fn stop_tick(&self) -> Option<u64> {
        self.stop_tick
    }

    pub fn is_begun(&self) -> bool {
        self.start_tick.is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_tick.is_some()
    }

    /// Wall-clock time between begin and stop
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.stopped_at) {
            (Some(start), Some(stop)) => (stop - start).to_std().ok(),
            _ => None,
        }
    }

    /// Mark the start of the phase
    pub fn mark_begun(&mut self) -> Result<()> {
        if self.is_begun() {
            return Err(CorrelatorError::AlreadyBegun(self.phase));
        }
        self.started_at = Some(Utc::now());
        self.start_tick = Some(next_tick());
        Ok(())
    }

    /// Mark the end of the phase
    pub fn mark_stopped(&mut self) -> Result<()> {
        if !self.is_begun() {
            return Err(CorrelatorError::NotBegun(self.phase));
        }
        if self.is_stopped() {
            return Err(CorrelatorError::AlreadyStopped(self.phase));
        }
        self.stop_tick = Some(next_tick());
        self.stopped_at = Some(Utc::now());
        Ok(())
    }
}

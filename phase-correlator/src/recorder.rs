//! Recording backend contract
//!
//! The correlator only ever talks to a backend through [`EventRecorder`]:
//! `begin` marks the start of a phase, `stop` marks its end and `commit`
//! records it. Commit takes the event by value, so a handle can be committed
//! at most once.

use crate::event::PhaseEvent;
use crate::types::{Phase, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Abstract sink that durably records phase events
pub trait EventRecorder: Send + Sync {
    /// Mark the start time of an event
    fn begin(&self, event: &mut PhaseEvent) -> Result<()> {
        event.mark_begun()
    }

    /// Mark the end time of an event
    fn stop(&self, event: &mut PhaseEvent) -> Result<()> {
        event.mark_stopped()
    }

    /// Durably record a stopped event
    fn commit(&self, event: PhaseEvent) -> Result<()>;

    /// Dispose of a begun event that will never be committed
    fn discard(&self, _event: PhaseEvent) {}
}

impl<R: EventRecorder + ?Sized> EventRecorder for Arc<R> {
    fn begin(&self, event: &mut PhaseEvent) -> Result<()> {
        (**self).begin(event)
    }

    fn stop(&self, event: &mut PhaseEvent) -> Result<()> {
        (**self).stop(event)
    }

    fn commit(&self, event: PhaseEvent) -> Result<()> {
        (**self).commit(event)
    }

    fn discard(&self, event: PhaseEvent) {
        (**self).discard(event)
    }
}

impl<R: EventRecorder + ?Sized> EventRecorder for Box<R> {
    fn begin(&self, event: &mut PhaseEvent) -> Result<()> {
        (**self).begin(event)
    }

    fn stop(&self, event: &mut PhaseEvent) -> Result<()> {
        (**self).stop(event)
    }

    fn commit(&self, event: PhaseEvent) -> Result<()> {
        (**self).commit(event)
    }

    fn discard(&self, event: PhaseEvent) {
        (**self).discard(event)
    }
}

impl<R: EventRecorder + ?Sized> EventRecorder for &R {
    fn begin(&self, event: &mut PhaseEvent) -> Result<()> {
        (**self).begin(event)
    }

    fn stop(&self, event: &mut PhaseEvent) -> Result<()> {
        (**self).stop(event)
    }

    fn commit(&self, event: PhaseEvent) -> Result<()> {
        (**self).commit(event)
    }

    fn discard(&self, event: PhaseEvent) {
        (**self).discard(event)
    }
}

/// Default number of events kept by [`MemoryRecorder`]
pub const DEFAULT_CAPACITY: usize = 10_000;

/// In-memory recorder with a bounded buffer
///
/// Committed and discarded events are kept in separate buffers of the same
/// capacity. When a buffer is full its oldest event is dropped.
#[derive(Debug)]
pub struct MemoryRecorder {
    capacity: usize,
    committed: Mutex<VecDeque<PhaseEvent>>,
    discarded: Mutex<VecDeque<PhaseEvent>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            committed: Mutex::new(VecDeque::new()),
            discarded: Mutex::new(VecDeque::new()),
        }
    }

    /// Snapshot of committed events in commit order
    pub fn events(&self) -> Vec<PhaseEvent> {
        lock(&self.committed).iter().cloned().collect()
    }

    /// Number of committed events of a phase
    pub fn count(&self, phase: Phase) -> usize {
        lock(&self.committed)
            .iter()
            .filter(|event| event.phase() == phase)
            .count()
    }

    pub fn len(&self) -> usize {
        lock(&self.committed).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.committed).is_empty()
    }

    /// Events that were begun but superseded before they could be committed
    pub fn discarded(&self) -> Vec<PhaseEvent> {
        lock(&self.discarded).iter().cloned().collect()
    }

    pub fn clear(&self) {
        lock(&self.committed).clear();
        lock(&self.discarded).clear();
    }
}

impl Default for MemoryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRecorder for MemoryRecorder {
    fn commit(&self, event: PhaseEvent) -> Result<()> {
        push_bounded(&mut lock(&self.committed), event, self.capacity);
        Ok(())
    }

    fn discard(&self, event: PhaseEvent) {
        push_bounded(&mut lock(&self.discarded), event, self.capacity);
    }
}

fn push_bounded(buffer: &mut VecDeque<PhaseEvent>, event: PhaseEvent, capacity: usize) {
    if buffer.len() >= capacity {
        buffer.pop_front();
    }
    buffer.push_back(event);
}

/// Recorder that writes committed events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRecorder;

impl EventRecorder for LogRecorder {
    fn commit(&self, event: PhaseEvent) -> Result<()> {
        log::info!(
            "[{}] {} {} '{}' took {:?}",
            event.category(),
            event.phase().label(),
            event.scope_id(),
            event.display_name(),
            event.duration().unwrap_or_default()
        );
        Ok(())
    }

    fn discard(&self, event: PhaseEvent) {
        log::trace!(
            "Discarding superseded {} event for {}",
            event.phase(),
            event.scope_id()
        );
    }
}

// A poisoned buffer still holds valid events
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

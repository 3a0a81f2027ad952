//! Lifecycle correlator
//!
//! Turns the ordered enter/leave signals of a test framework into paired
//! begin/stop events. Each signal first closes the event left open by the
//! previous phase and then opens the event of the next phase, so consecutive
//! windows of one scope touch without overlapping.
//!
//! | Signal          | Closes                        | Opens                            |
//! |-----------------|-------------------------------|----------------------------------|
//! | container-enter | -                             | ContainerSetup (this scope)      |
//! | member-enter    | ContainerSetup (parent scope) | MemberSetup (this scope)         |
//! | unit-enter      | MemberSetup (this scope)      | UnitExecution (this scope)       |
//! | unit-leave      | UnitExecution (this scope)    | MemberTeardown (this scope)      |
//! | member-leave    | MemberTeardown (this scope)   | ContainerTeardown (parent scope) |
//! | container-leave | ContainerTeardown (this scope)| -                                |
//!
//! All state lives in the [`ScopeStore`]; the correlator can be shared by every
//! thread of a run. Telemetry problems are logged and never reach the caller.

use crate::config::CorrelatorConfig;
use crate::event::PhaseEvent;
use crate::recorder::EventRecorder;
use crate::scope::Scope;
use crate::store::{CorrelationKey, ScopeStore};
use crate::types::{Phase, Result, ScopeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle notification delivered by the test framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleSignal {
    ContainerEnter,
    MemberEnter,
    UnitEnter,
    UnitLeave,
    MemberLeave,
    ContainerLeave,
}

impl LifecycleSignal {
    /// All signals in the order a single-member container fires them
    pub const ALL: [LifecycleSignal; 6] = [
        LifecycleSignal::ContainerEnter,
        LifecycleSignal::MemberEnter,
        LifecycleSignal::UnitEnter,
        LifecycleSignal::UnitLeave,
        LifecycleSignal::MemberLeave,
        LifecycleSignal::ContainerLeave,
    ];
}

impl fmt::Display for LifecycleSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleSignal::ContainerEnter => "container-enter",
            LifecycleSignal::MemberEnter => "member-enter",
            LifecycleSignal::UnitEnter => "unit-enter",
            LifecycleSignal::UnitLeave => "unit-leave",
            LifecycleSignal::MemberLeave => "member-leave",
            LifecycleSignal::ContainerLeave => "container-leave",
        };
        f.write_str(name)
    }
}

/// Correlates lifecycle signals into begin/stop/commit calls on a recorder
pub struct LifecycleCorrelator<R: EventRecorder> {
    store: ScopeStore,
    recorder: R,
    config: CorrelatorConfig,
}

impl<R: EventRecorder> LifecycleCorrelator<R> {
    /// Create a correlator with the default configuration
    pub fn new(recorder: R) -> Self {
        Self {
            store: ScopeStore::new(),
            recorder,
            config: CorrelatorConfig::default(),
        }
    }

    /// Create a correlator with an explicit configuration
    ///
    /// # Returns
    /// * `Err(CorrelatorError::InvalidConfig)` if the configuration is rejected
    pub fn with_config(recorder: R, config: CorrelatorConfig) -> Result<Self> {
        config.validate()?;

        let store = match config.store_shards {
            Some(shards) => ScopeStore::with_shards(shards)?,
            None => ScopeStore::new(),
        };

        Ok(Self {
            store,
            recorder,
            config,
        })
    }

    pub fn config(&self) -> &CorrelatorConfig {
        &self.config
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn store(&self) -> &ScopeStore {
        &self.store
    }

    /// Consume the correlator and hand back its recorder
    pub fn into_recorder(self) -> R {
        self.recorder
    }

    /// Dispatch a signal to the matching transition
    pub fn on_signal(&self, signal: LifecycleSignal, scope: &Scope) {
        log::debug!("{} for {}", signal, scope.id);

        match signal {
            LifecycleSignal::ContainerEnter => self.container_enter(scope),
            LifecycleSignal::MemberEnter => self.member_enter(scope),
            LifecycleSignal::UnitEnter => self.unit_enter(scope),
            LifecycleSignal::UnitLeave => self.unit_leave(scope),
            LifecycleSignal::MemberLeave => self.member_leave(scope),
            LifecycleSignal::ContainerLeave => self.container_leave(scope),
        }
    }

    /// A container starts running its setup routines
    pub fn container_enter(&self, scope: &Scope) {
        self.open(Phase::ContainerSetup, scope, &scope.id);
    }

    /// A member starts; the parent's container setup is over
    pub fn member_enter(&self, scope: &Scope) {
        match scope.parent() {
            Some(parent) => self.close(parent, Phase::ContainerSetup),
            None => log::debug!("Member {} has no parent, container setup left open", scope.id),
        }
        self.open(Phase::MemberSetup, scope, &scope.id);
    }

    /// The unit body starts
    pub fn unit_enter(&self, scope: &Scope) {
        self.close(&scope.id, Phase::MemberSetup);
        self.open(Phase::UnitExecution, scope, &scope.id);
    }

    /// The unit body finished; member teardown starts
    pub fn unit_leave(&self, scope: &Scope) {
        self.close(&scope.id, Phase::UnitExecution);
        self.open(Phase::MemberTeardown, scope, &scope.id);
    }

    /// Member teardown finished; the parent's container teardown (re)starts
    pub fn member_leave(&self, scope: &Scope) {
        self.close(&scope.id, Phase::MemberTeardown);
        match scope.parent() {
            Some(parent) => self.open(Phase::ContainerTeardown, scope, parent),
            None => log::debug!("Member {} has no parent, container teardown not opened", scope.id),
        }
    }

    /// The container finished its teardown routines
    pub fn container_leave(&self, scope: &Scope) {
        self.close(&scope.id, Phase::ContainerTeardown);
    }

    /// Keys of every event that is still open
    pub fn open_events(&self) -> Vec<CorrelationKey> {
        self.store.pending_keys()
    }

    /// Hand back every event still open at the end of a run
    ///
    /// A normally completing run returns an empty vector. Leftovers are events
    /// whose closing signal never arrived; they are reported, not committed.
    pub fn finish(&self) -> Vec<PhaseEvent> {
        let leaked = self.store.drain();
        for event in &leaked {
            log::warn!(
                "{} event for {} was never closed",
                event.phase(),
                event.scope_id()
            );
        }
        leaked
    }

    /// Create, store and begin the event of `phase`
    fn open(&self, phase: Phase, scope: &Scope, stored_under: &ScopeId) {
        if !self.config.should_record(phase) {
            log::trace!("{} not recorded for {}", phase, stored_under);
            return;
        }

        let mut event = PhaseEvent::new(phase, scope, stored_under, &self.config.category);
        if let Err(e) = self.recorder.begin(&mut event) {
            log::warn!("Failed to begin {} event for {}: {}", phase, stored_under, e);
            return;
        }

        if let Some(displaced) = self.store.put(stored_under, phase, event) {
            // Container teardown is re-opened by every member; the latest wins
            log::trace!("Superseding open {} event for {}", phase, stored_under);
            self.recorder.discard(displaced);
        }
    }

    /// Remove, stop and commit the event of `phase` stored under `scope_id`
    fn close(&self, scope_id: &ScopeId, phase: Phase) {
        let Some(mut event) = self.store.remove(scope_id, phase) else {
            log::trace!("No open {} event for {}", phase, scope_id);
            return;
        };

        if let Err(e) = self.recorder.stop(&mut event) {
            log::warn!("Failed to stop {} event for {}: {}", phase, scope_id, e);
            return;
        }

        if let Err(e) = self.recorder.commit(event) {
            log::warn!("Failed to commit {} event for {}: {}", phase, scope_id, e);
        }
    }
}

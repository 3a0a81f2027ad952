//! Phase Correlator Library
//!
//! Turns the nested lifecycle of a test run (container setup, member setup,
//! unit execution, member teardown, container teardown) into paired
//! begin/stop telemetry events whose windows mirror that nesting.
//!
//! # Architecture
//!
//! - [`ScopeStore`] parks in-flight events under `(scope id, phase)` keys
//! - [`LifecycleCorrelator`] closes the previous phase and opens the next one
//!   on every lifecycle signal, crossing into the parent scope where needed
//! - [`EventRecorder`] is the contract towards the recording backend
//!
//! The library does NOT:
//! - Decide what triggers a lifecycle transition
//! - Aggregate or query recorded events
//! - Manage the storage format of the recording backend
//!
//! # Example Usage
//!
//! ```
//! use phase_correlator::{LifecycleCorrelator, MemoryRecorder, Phase, Scope};
//! use std::sync::Arc;
//!
//! let recorder = Arc::new(MemoryRecorder::new());
//! let correlator = LifecycleCorrelator::new(recorder.clone());
//!
//! let suite = Scope::container("[class:Demo]", "Demo");
//! let test = Scope::member("[class:Demo]/[method:test1()]", "[class:Demo]", "test1()");
//!
//! correlator.container_enter(&suite);
//! correlator.member_enter(&test);
//! correlator.unit_enter(&test);
//! correlator.unit_leave(&test);
//! correlator.member_leave(&test);
//! correlator.container_leave(&suite);
//!
//! assert_eq!(recorder.len(), 5);
//! assert_eq!(recorder.count(Phase::UnitExecution), 1);
//! ```

// Public modules
pub mod config;
pub mod correlator;
pub mod event;
pub mod recorder;
pub mod scope;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use config::CorrelatorConfig;
pub use correlator::{LifecycleCorrelator, LifecycleSignal};
pub use event::PhaseEvent;
pub use recorder::{EventRecorder, LogRecorder, MemoryRecorder};
pub use scope::{MethodSignature, Scope, Subject};
pub use store::{CorrelationKey, ScopeStore};
pub use types::{CorrelatorError, Phase, Result, ScopeId, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

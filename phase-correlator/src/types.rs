//! Core types for the phase correlator library
//!
//! This module defines the fundamental vocabulary shared by the store, the
//! correlator and the recorders: scope identifiers, lifecycle phases and the
//! library error type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the correlator
pub type Timestamp = DateTime<Utc>;

/// Result type for correlator operations
pub type Result<T> = std::result::Result<T, CorrelatorError>;

/// Unique identifier of a scope in the execution tree
///
/// Uniqueness is guaranteed by the test framework that hands scopes to the
/// correlator (for example `[engine:junit]/[class:Foo]/[method:bar()]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(String);

impl ScopeId {
    /// Create a scope id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScopeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ScopeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One of the five lifecycle stages of a test execution tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// All setup routines that run once per container
    ContainerSetup,
    /// All setup routines that run once per unit, before the unit body
    MemberSetup,
    /// The unit body itself
    UnitExecution,
    /// All teardown routines that run once per unit, after the unit body
    MemberTeardown,
    /// All teardown routines that run once per container
    ContainerTeardown,
}

impl Phase {
    /// All phases in lifecycle order
    pub const ALL: [Phase; 5] = [
        Phase::ContainerSetup,
        Phase::MemberSetup,
        Phase::UnitExecution,
        Phase::MemberTeardown,
        Phase::ContainerTeardown,
    ];

    /// Short label shown by recording backends
    pub fn label(&self) -> &'static str {
        match self {
            Phase::ContainerSetup => "@BeforeAll",
            Phase::MemberSetup => "@BeforeEach",
            Phase::UnitExecution => "@Test",
            Phase::MemberTeardown => "@AfterEach",
            Phase::ContainerTeardown => "@AfterAll",
        }
    }

    /// Human-readable description of what the phase spans
    pub fn description(&self) -> &'static str {
        match self {
            Phase::ContainerSetup => "execution of all @BeforeAll methods",
            Phase::MemberSetup => "execution of all @BeforeEach methods",
            Phase::UnitExecution => "execution of a test without @BeforeEach and @AfterEach methods",
            Phase::MemberTeardown => "execution of all @AfterEach methods",
            Phase::ContainerTeardown => "execution of all @AfterAll methods",
        }
    }

    /// True for the phases that run once per container
    pub fn is_container_level(&self) -> bool {
        matches!(self, Phase::ContainerSetup | Phase::ContainerTeardown)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::ContainerSetup => write!(f, "ContainerSetup"),
            Phase::MemberSetup => write!(f, "MemberSetup"),
            Phase::UnitExecution => write!(f, "UnitExecution"),
            Phase::MemberTeardown => write!(f, "MemberTeardown"),
            Phase::ContainerTeardown => write!(f, "ContainerTeardown"),
        }
    }
}

/// Errors that can occur while handling phase events
///
/// None of these ever escape the correlator's lifecycle operations; they are
/// returned by event handles and recorders and logged by the correlator.
#[derive(Debug, thiserror::Error)]
pub enum CorrelatorError {
    #[error("Event already begun: {0}")]
    AlreadyBegun(Phase),

    #[error("Event not begun: {0}")]
    NotBegun(Phase),

    #[error("Event already stopped: {0}")]
    AlreadyStopped(Phase),

    #[error("Recording backend failure: {0}")]
    Backend(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order_and_labels() {
        assert_eq!(Phase::ALL[0], Phase::ContainerSetup);
        assert_eq!(Phase::ALL[4], Phase::ContainerTeardown);
        assert!(Phase::ALL.windows(2).all(|w| w[0] < w[1]));

        assert_eq!(Phase::UnitExecution.label(), "@Test");
        assert_eq!(Phase::MemberSetup.description(), "execution of all @BeforeEach methods");
    }

    #[test]
    fn test_container_level_phases() {
        let container_level: Vec<Phase> = Phase::ALL
            .iter()
            .copied()
            .filter(Phase::is_container_level)
            .collect();
        assert_eq!(container_level, vec![Phase::ContainerSetup, Phase::ContainerTeardown]);
    }

    #[test]
    fn test_scope_id_display() {
        let id = ScopeId::from("[engine:junit]/[class:Demo]");
        assert_eq!(format!("{}", id), "[engine:junit]/[class:Demo]");
        assert_eq!(id.as_str(), "[engine:junit]/[class:Demo]");
    }
}

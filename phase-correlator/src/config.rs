//! Correlator configuration types
//!
//! The correlator needs very little configuration: how the scope store is
//! partitioned, which phases are recorded and the category stamped on events.

use crate::types::{CorrelatorError, Phase, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the lifecycle correlator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatorConfig {
    /// Number of store shards (power of two, greater than one). `None` lets the
    /// store pick a default based on available parallelism.
    #[serde(default)]
    pub store_shards: Option<usize>,

    /// Optional: only record these phases
    #[serde(default)]
    pub recorded_phases: Option<Vec<Phase>>,

    /// Category stamped on every event (default: "JUnit")
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "JUnit".to_string()
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            store_shards: None,
            recorded_phases: None,
            category: default_category(),
        }
    }
}

impl CorrelatorConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the number of store shards
    pub fn with_store_shards(mut self, shards: usize) -> Self {
        self.store_shards = Some(shards);
        self
    }

    /// Builder method: record only the given phases
    pub fn with_recorded_phases(mut self, phases: Vec<Phase>) -> Self {
        self.recorded_phases = Some(phases);
        self
    }

    /// Builder method: set the event category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Check if events of a phase should be opened
    pub fn should_record(&self, phase: Phase) -> bool {
        match &self.recorded_phases {
            Some(phases) => phases.contains(&phase),
            None => true,
        }
    }

    /// Validate settings that would otherwise fail when the store is built
    pub fn validate(&self) -> Result<()> {
        if let Some(shards) = self.store_shards {
            if shards < 2 || !shards.is_power_of_two() {
                return Err(CorrelatorError::InvalidConfig(format!(
                    "store_shards must be a power of two greater than 1, got {}",
                    shards
                )));
            }
        }

        if self.category.trim().is_empty() {
            return Err(CorrelatorError::InvalidConfig(
                "category must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = CorrelatorConfig::new()
            .with_store_shards(8)
            .with_recorded_phases(vec![Phase::UnitExecution])
            .with_category("Integration");

        assert_eq!(config.store_shards, Some(8));
        assert_eq!(config.category, "Integration");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_phase_filter() {
        let config = CorrelatorConfig::new()
            .with_recorded_phases(vec![Phase::ContainerSetup, Phase::UnitExecution]);

        assert!(config.should_record(Phase::ContainerSetup));
        assert!(config.should_record(Phase::UnitExecution));
        assert!(!config.should_record(Phase::MemberTeardown));

        // Without a filter every phase is recorded
        let config = CorrelatorConfig::new();
        assert!(Phase::ALL.iter().all(|phase| config.should_record(*phase)));
    }

    #[test]
    fn test_invalid_shard_count() {
        assert!(CorrelatorConfig::new().with_store_shards(6).validate().is_err());
        assert!(CorrelatorConfig::new().with_store_shards(1).validate().is_err());
        assert!(CorrelatorConfig::new().with_category(" ").validate().is_err());
    }

    #[test]
    fn test_config_defaults_from_empty_input() {
        let config: CorrelatorConfig =
            serde_json::from_str("{}").expect("empty config deserializes");
        assert_eq!(config, CorrelatorConfig::default());
        assert_eq!(config.category, "JUnit");
    }
}

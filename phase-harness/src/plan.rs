//! Run plan loading and validation
//!
//! A run plan describes the scope tree the harness plays back: containers,
//! their test members and nested containers, plus correlator and output
//! settings.

use crate::output::OutputConfig;
use anyhow::{bail, Context, Result};
use phase_correlator::{CorrelatorConfig, MethodSignature};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Complete run plan (loaded from a TOML file)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunPlan {
    /// Run top-level containers concurrently
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub correlator: CorrelatorConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub containers: Vec<ContainerPlan>,
}

/// A container (test class) with its members and nested containers
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContainerPlan {
    /// Type name of the container, also used in its unique id
    pub name: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub members: Vec<MemberPlan>,
    #[serde(default)]
    pub nested: Vec<ContainerPlan>,
}

/// A single test method
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemberPlan {
    pub name: String,
    pub display_name: Option<String>,
    pub return_type: Option<String>,
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl ContainerPlan {
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Number of members in this container and all nested containers
    pub fn member_count(&self) -> usize {
        self.members.len() + self.nested.iter().map(ContainerPlan::member_count).sum::<usize>()
    }
}

impl MemberPlan {
    pub fn signature(&self) -> MethodSignature {
        MethodSignature {
            name: self.name.clone(),
            return_type: self.return_type.clone(),
            parameter_types: self.parameters.clone(),
        }
    }

    /// Display name, defaulting to the rendered signature like the framework does
    pub fn display_name(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| self.signature().render())
    }
}

/// Load a run plan from a TOML file
pub fn load_plan(path: &Path) -> Result<RunPlan> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file: {:?}", path))?;

    parse_plan(&content).with_context(|| format!("Failed to parse plan file: {:?}", path))
}

/// Parse and validate a run plan from TOML text
pub fn parse_plan(content: &str) -> Result<RunPlan> {
    let plan: RunPlan = toml::from_str(content)?;
    validate_plan(&plan)?;
    Ok(plan)
}

/// Check that every scope of the plan gets a unique id
pub fn validate_plan(plan: &RunPlan) -> Result<()> {
    plan.correlator
        .validate()
        .context("Invalid [correlator] settings")?;

    let mut top_level = HashSet::new();
    for container in &plan.containers {
        if !top_level.insert(container.name.as_str()) {
            bail!("Duplicate container: {}", container.name);
        }
        validate_container(container)?;
    }

    Ok(())
}

fn validate_container(container: &ContainerPlan) -> Result<()> {
    if container.name.trim().is_empty() {
        bail!("Container name must not be empty");
    }

    let mut signatures = HashSet::new();
    for member in &container.members {
        if member.name.trim().is_empty() {
            bail!("Member name must not be empty in container {}", container.name);
        }
        let signature = member.signature().render();
        if !signatures.insert(signature.clone()) {
            bail!("Duplicate member {} in container {}", signature, container.name);
        }
    }

    let mut nested_names = HashSet::new();
    for nested in &container.nested {
        if !nested_names.insert(nested.name.as_str()) {
            bail!("Duplicate nested container {} in {}", nested.name, container.name);
        }
        validate_container(nested)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use phase_correlator::Phase;

    #[test]
    fn test_plan_deserialization() {
        let toml_content = r#"
            parallel = true

            [correlator]
            category = "Integration"
            recorded_phases = ["unit_execution"]

            [output]
            format = "log"

            [[containers]]
            name = "JfrExtensionTest"
            display_name = "JFR Demo Test"

            [[containers.members]]
            name = "test1"
            display_name = "TEST 1"

            [[containers.members]]
            name = "lookup"
            return_type = "String"
            parameters = ["int"]
        "#;

        let plan = parse_plan(toml_content).unwrap();
        assert!(plan.parallel);
        assert_eq!(plan.correlator.category, "Integration");
        assert_eq!(plan.correlator.recorded_phases, Some(vec![Phase::UnitExecution]));
        assert_eq!(plan.output.format, OutputFormat::Log);

        let container = &plan.containers[0];
        assert_eq!(container.display_name(), "JFR Demo Test");
        assert_eq!(container.members[0].display_name(), "TEST 1");
        assert_eq!(container.members[1].display_name(), "String lookup(int)");
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let toml_content = r#"
            [[containers]]
            name = "Demo"

            [[containers.members]]
            name = "test1"

            [[containers.members]]
            name = "test1"
        "#;

        let err = parse_plan(toml_content).unwrap_err();
        assert!(err.to_string().contains("Duplicate member test1()"));
    }

    #[test]
    fn test_overloads_are_distinct_members() {
        let toml_content = r#"
            [[containers]]
            name = "Demo"

            [[containers.members]]
            name = "check"

            [[containers.members]]
            name = "check"
            parameters = ["String"]
        "#;

        assert!(parse_plan(toml_content).is_ok());
    }

    #[test]
    fn test_invalid_correlator_settings_rejected() {
        let toml_content = r#"
            [correlator]
            store_shards = 3
        "#;

        assert!(parse_plan(toml_content).is_err());
    }

    #[test]
    fn test_member_count_includes_nested() {
        let toml_content = r#"
            [[containers]]
            name = "Outer"

            [[containers.members]]
            name = "a"

            [[containers.nested]]
            name = "Inner"

            [[containers.nested.members]]
            name = "b"

            [[containers.nested.members]]
            name = "c"
        "#;

        let plan = parse_plan(toml_content).unwrap();
        assert_eq!(plan.containers[0].member_count(), 3);
    }
}

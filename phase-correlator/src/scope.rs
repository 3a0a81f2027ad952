//! Scope descriptors handed over by the test framework
//!
//! A [`Scope`] is a read-only view of one node in the execution tree. The
//! correlator never creates or destroys framework scopes; it only reads their
//! identifiers, parent references and metadata.

use crate::types::ScopeId;
use serde::{Deserialize, Serialize};

/// One node of the nested execution tree (a container or a single unit)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Unique identifier assigned by the framework
    pub id: ScopeId,
    /// Parent scope, if this scope is nested
    pub parent: Option<ScopeId>,
    /// Display name for the test or container
    pub display_name: String,
    /// The code unit this scope runs, if available
    pub subject: Option<Subject>,
    /// The type that owns the code unit, if available
    pub owning_type: Option<String>,
}

impl Scope {
    /// Create a top-level container scope
    pub fn container(id: impl Into<ScopeId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: None,
            display_name: display_name.into(),
            subject: None,
            owning_type: None,
        }
    }

    /// Create a scope nested below `parent`
    pub fn member(
        id: impl Into<ScopeId>,
        parent: impl Into<ScopeId>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent: Some(parent.into()),
            display_name: display_name.into(),
            subject: None,
            owning_type: None,
        }
    }

    /// Builder method: attach subject metadata
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Builder method: attach the owning type descriptor
    pub fn with_owning_type(mut self, owning_type: impl Into<String>) -> Self {
        self.owning_type = Some(owning_type.into());
        self
    }

    /// Parent scope id, if any
    pub fn parent(&self) -> Option<&ScopeId> {
        self.parent.as_ref()
    }
}

/// Symbolic description of the code unit a scope runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Simple name (e.g. `test1`)
    pub simple_name: String,
    /// Fully rendered signature (e.g. `test1()`)
    pub signature: String,
}

impl Subject {
    /// Create subject metadata from its two forms
    pub fn new(simple_name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            simple_name: simple_name.into(),
            signature: signature.into(),
        }
    }

    /// Derive both forms from a method signature
    pub fn from_signature(signature: &MethodSignature) -> Self {
        Self::new(signature.name.clone(), signature.render())
    }
}

/// Structured signature of a test method
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Method name
    pub name: String,
    /// Simple name of the return type (`None` for void)
    #[serde(default)]
    pub return_type: Option<String>,
    /// Simple names of the parameter types, in declaration order
    #[serde(default)]
    pub parameter_types: Vec<String>,
}

impl MethodSignature {
    /// Create a signature for a void method without parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder method: set the return type
    pub fn returning(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    /// Builder method: append a parameter type
    pub fn with_parameter(mut self, parameter_type: impl Into<String>) -> Self {
        self.parameter_types.push(parameter_type.into());
        self
    }

    /// Render as `[ReturnType ]name(Param1, Param2)`
    pub fn render(&self) -> String {
        let mut buffer = String::new();

        // Void methods carry no return type prefix
        if let Some(return_type) = self.return_type.as_deref() {
            if return_type != "void" {
                buffer.push_str(return_type);
                buffer.push(' ');
            }
        }

        buffer.push_str(&self.name);
        buffer.push('(');
        buffer.push_str(&self.parameter_types.join(", "));
        buffer.push(')');
        buffer
    }
}

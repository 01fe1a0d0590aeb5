use crate::models::{NodeId, TypeRef};
use serde::Serialize;
use std::fmt;

/// State of one generated field as seen by validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FieldStatus {
    Bound,
    /// The compiled type no longer declares the field
    FieldNotPresent,
    Unassigned,
    /// Assigned, but to something other than the binding's target
    Stale,
    TypeMismatch { declared: String, target: String },
    TargetMissing,
}

impl FieldStatus {
    pub fn is_bound(&self) -> bool {
        matches!(self, FieldStatus::Bound)
    }
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldStatus::Bound => f.write_str("bound"),
            FieldStatus::FieldNotPresent => f.write_str("field not present"),
            FieldStatus::Unassigned => f.write_str("field unassigned"),
            FieldStatus::Stale => f.write_str("assigned to a different target"),
            FieldStatus::TypeMismatch { declared, target } => {
                write!(f, "type mismatch: field is {declared}, target is {target}")
            }
            FieldStatus::TargetMissing => f.write_str("target could not be resolved"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingFieldStatus {
    pub field_name: String,
    /// Qualified type of the binding target, or the nested class name
    pub target_type: String,
    #[serde(flatten)]
    pub status: FieldStatus,
}

/// Result of [`crate::binder::CodeBinder::validate_binding`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingValidation {
    pub container: String,
    pub class_name: String,
    /// Qualified name of the compiled type, when it could be resolved
    pub script_type: Option<String>,
    pub valid_fields: Vec<BindingFieldStatus>,
    pub invalid_fields: Vec<BindingFieldStatus>,
    pub errors: Vec<String>,
}

impl BindingValidation {
    pub fn new(container: &str, class_name: &str) -> Self {
        Self {
            container: container.to_string(),
            class_name: class_name.to_string(),
            ..Default::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.invalid_fields.is_empty()
    }

    pub fn push(&mut self, field: BindingFieldStatus) {
        if field.status.is_bound() {
            self.valid_fields.push(field);
        } else {
            self.invalid_fields.push(field);
        }
    }

    /// Status of a single field, wherever it was filed
    pub fn field(&self, name: &str) -> Option<&BindingFieldStatus> {
        self.valid_fields
            .iter()
            .chain(self.invalid_fields.iter())
            .find(|f| f.field_name == name)
    }

    /// Human readable report
    pub fn report(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Binding validation report ===\n");
        out.push_str(&format!("Object: {}\n", self.container));
        out.push_str(&format!(
            "Script type: {}\n",
            self.script_type.as_deref().unwrap_or("not found")
        ));
        out.push_str(&format!(
            "Status: {}\n",
            if self.is_valid() { "valid" } else { "invalid" }
        ));

        if !self.valid_fields.is_empty() {
            out.push_str(&format!("\nBound fields ({}):\n", self.valid_fields.len()));
            for field in &self.valid_fields {
                out.push_str(&format!("  ✓ {} ({})\n", field.field_name, field.target_type));
            }
        }

        if !self.invalid_fields.is_empty() {
            out.push_str(&format!("\nInvalid fields ({}):\n", self.invalid_fields.len()));
            for field in &self.invalid_fields {
                out.push_str(&format!("  ✗ {}: {}\n", field.field_name, field.status));
            }
        }

        if !self.errors.is_empty() {
            out.push_str("\nErrors:\n");
            for error in &self.errors {
                out.push_str(&format!("  - {}\n", error));
            }
        }
        out
    }
}

impl fmt::Display for BindingValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}

/// A field the binder could not fill
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFailure {
    pub field_name: String,
    pub reason: String,
}

/// What [`crate::binder::CodeBinder::bind_components`] did to one container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindOutcome {
    pub container: NodeId,
    pub class_name: String,
    /// Type of the generated instance on the container
    pub instance_type: TypeRef,
    /// A new generated instance was attached
    pub attached: bool,
    pub bound_fields: Vec<String>,
    /// Includes failures of nested containers, as `<field>.<nested field>`
    pub failures: Vec<FieldFailure>,
}

impl BindOutcome {
    pub fn new(container: NodeId, class_name: &str, instance_type: TypeRef) -> Self {
        Self {
            container,
            class_name: class_name.to_string(),
            instance_type,
            attached: false,
            bound_fields: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn fail_field(&mut self, field_name: &str, reason: impl fmt::Display) {
        self.failures.push(FieldFailure {
            field_name: field_name.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Aggregate over a batch of containers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingResult {
    pub success_count: usize,
    pub failure_count: usize,
    pub success_list: Vec<String>,
    pub failure_list: Vec<String>,
    /// One `"<name>: <message>"` entry per failed item
    pub errors: Vec<String>,
    /// Per-field problems inside containers that otherwise succeeded
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Items never attempted because the batch was cancelled
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_processed: Vec<String>,
    /// Selected items with nothing to do
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl BindingResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, name: &str) {
        self.success_count += 1;
        self.success_list.push(name.to_string());
    }

    pub fn record_failure(&mut self, name: &str, error: impl fmt::Display) {
        self.failure_count += 1;
        self.failure_list.push(name.to_string());
        self.errors.push(format!("{}: {}", name, error));
    }

    pub fn is_success(&self) -> bool {
        self.failure_count == 0 && self.not_processed.is_empty()
    }

    pub fn was_cancelled(&self) -> bool {
        !self.not_processed.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} succeeded, {} failed",
            self.success_count, self.failure_count
        );
        if !self.skipped.is_empty() {
            out.push_str(&format!(", {} skipped", self.skipped.len()));
        }
        if self.was_cancelled() {
            out.push_str(&format!(", {} not processed (cancelled)", self.not_processed.len()));
        }
        out
    }
}

impl fmt::Display for BindingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for name in &self.success_list {
            writeln!(f, "  ✓ {}", name)?;
        }
        for error in &self.errors {
            writeln!(f, "  ✗ {}", error)?;
        }
        for warning in &self.warnings {
            writeln!(f, "  ! {}", warning)?;
        }
        for name in &self.skipped {
            writeln!(f, "  - {}: nothing to bind", name)?;
        }
        Ok(())
    }
}

//! Completeness check gating the Configure → Review transition.

use std::fmt;

use crate::{draft::ConnectionDraft, schema::SourceSchema};

/// Label used for the connection name in violation messages.
pub const CONNECTION_NAME_LABEL: &str = "Connection name";

const SEPARATOR: &str = ", ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    ConnectionName,
    MissingField { name: String, title: String },
}

impl Violation {
    pub fn label(&self) -> &str {
        match self {
            Self::ConnectionName => CONNECTION_NAME_LABEL,
            Self::MissingField { title, .. } => title,
        }
    }
}

/// Every violation found, name first, then fields in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// One combined, user-facing message.
    pub fn message(&self) -> String {
        let labels = self
            .violations
            .iter()
            .map(Violation::label)
            .collect::<Vec<_>>()
            .join(SEPARATOR);
        format!("Please fill in: {labels}")
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Check the draft against the schema. Never short-circuits.
pub fn validate(draft: &ConnectionDraft, schema: &SourceSchema) -> ValidationReport {
    let mut violations = Vec::new();
    if is_blank(&draft.name) {
        violations.push(Violation::ConnectionName);
    }
    violations.extend(
        schema
            .fields
            .iter()
            .filter(|field| draft.field(&field.name).is_none_or(is_blank))
            .map(|field| Violation::MissingField {
                name: field.name.clone(),
                title: field.title.clone(),
            }),
    );
    ValidationReport { violations }
}

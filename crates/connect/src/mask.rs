//! Display-only redaction of sensitive values on the review step.

use crate::schema::ConfigField;

/// Characters of the raw value kept in front of the mask.
pub const VISIBLE_PREFIX: usize = 6;
/// The fixed mask appended after the prefix, independent of value length.
pub const MASK: &str = "********";

/// Mask a value for display: the first six characters followed by eight
/// mask characters. Empty input stays empty.
pub fn mask_value(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let mut masked: String = value.chars().take(VISIBLE_PREFIX).collect();
    masked.push_str(MASK);
    masked
}

/// Name heuristic: does `name` contain any of `hints`, ignoring case?
pub fn is_sensitive_name<S: AsRef<str>>(name: &str, hints: &[S]) -> bool {
    let name = name.to_lowercase();
    hints
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .any(|h| !h.is_empty() && name.contains(&h))
}

/// Decides which fields get masked on review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitivityPolicy {
    name_hints: Vec<String>,
}

impl Default for SensitivityPolicy {
    fn default() -> Self {
        Self::from_config(&conduit_config::WizardConfig::default())
    }
}

impl SensitivityPolicy {
    pub fn new(name_hints: Vec<String>) -> Self {
        Self { name_hints }
    }

    pub fn from_config(config: &conduit_config::WizardConfig) -> Self {
        Self::new(config.sensitive_name_hints.clone())
    }

    /// Declared password entries, plus anything the name heuristic flags.
    pub fn is_sensitive(&self, field: &ConfigField) -> bool {
        field.kind.is_masked_entry() || is_sensitive_name(&field.name, &self.name_hints)
    }

    /// The value as it should be displayed for `field`.
    pub fn display_value(&self, field: &ConfigField, value: &str) -> String {
        if self.is_sensitive(field) {
            mask_value(value)
        } else {
            value.to_string()
        }
    }
}

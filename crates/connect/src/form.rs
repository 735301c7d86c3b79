//! Rendering contract for the dynamic configuration form and the review list.
//!
//! Widgets live in the host; these types carry everything a host needs to draw
//! the inputs and bind them back to the draft.

use serde::Serialize;

use crate::{
    draft::ConnectionDraft,
    mask::SensitivityPolicy,
    schema::{ConfigField, FieldKind, SourceSchema},
    validate::CONNECTION_NAME_LABEL,
};

/// One input on the Configure step, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    /// Draft key the input is bound to.
    pub name: String,
    pub label: String,
    pub hint: Option<String>,
    pub placeholder: String,
    pub input_type: String,
    #[serde(skip)]
    pub kind: FieldKind,
    pub value: String,
}

impl FieldView {
    pub fn masked_entry(&self) -> bool {
        self.kind.is_masked_entry()
    }
}

pub fn placeholder_for(title: &str) -> String {
    format!("Enter {}", title.to_lowercase())
}

fn field_view(field: &ConfigField, value: &str) -> FieldView {
    FieldView {
        name: field.name.clone(),
        label: field.title.clone(),
        hint: field.hint().map(ToOwned::to_owned),
        placeholder: placeholder_for(&field.title),
        input_type: field.kind.input_type().to_string(),
        kind: field.kind.clone(),
        value: value.to_string(),
    }
}

/// Build the Configure step inputs. Values come from the draft; a field the
/// draft does not know yet renders empty.
pub fn render_form(schema: &SourceSchema, draft: &ConnectionDraft) -> Vec<FieldView> {
    schema
        .fields
        .iter()
        .map(|field| field_view(field, draft.field(&field.name).unwrap_or_default()))
        .collect()
}

/// One line on the Review step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRow {
    pub label: String,
    pub value: String,
    pub masked: bool,
}

/// Connection name first, then every field with sensitive values masked.
pub fn review_rows(
    schema: &SourceSchema,
    draft: &ConnectionDraft,
    policy: &SensitivityPolicy,
) -> Vec<ReviewRow> {
    let name = ReviewRow {
        label: CONNECTION_NAME_LABEL.to_string(),
        value: draft.name.trim().to_string(),
        masked: false,
    };
    std::iter::once(name)
        .chain(schema.fields.iter().map(|field| {
            let raw = draft.field(&field.name).unwrap_or_default();
            ReviewRow {
                label: field.title.clone(),
                value: policy.display_value(field, raw),
                masked: policy.is_sensitive(field),
            }
        }))
        .collect()
}

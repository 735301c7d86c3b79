//! The user's in-progress connection values.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    error::{Error, Result},
    schema::SourceSchema,
};

/// Connection name plus one value per schema field.
///
/// Serializes as the `POST /connections/connect/source/{short_name}` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionDraft {
    pub name: String,
    #[serde(rename = "config_fields")]
    field_values: BTreeMap<String, String>,
}

impl ConnectionDraft {
    /// Empty name and one empty value for every field in `schema`.
    pub fn for_schema(schema: &SourceSchema) -> Self {
        Self {
            name: String::new(),
            field_values: schema
                .fields
                .iter()
                .map(|f| (f.name.clone(), String::new()))
                .collect(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.field_values.get(name).map(String::as_str)
    }

    pub fn field_values(&self) -> &BTreeMap<String, String> {
        &self.field_values
    }

    /// Overwrite a field value. Only keys seeded from the schema are accepted.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let slot = self
            .field_values
            .get_mut(name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))?;
        *slot = value.into();
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.field_values.is_empty()
    }
}

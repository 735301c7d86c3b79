//! Provider-declared configuration schema, as served by
//! `GET /sources/detail/{short_name}`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Declared types a form renderer understands as-is.
pub const PASS_THROUGH_INPUT_TYPES: &[&str] = &[
    "date",
    "datetime-local",
    "email",
    "number",
    "tel",
    "textarea",
    "url",
];

/// How a field should be rendered, derived from its declared type tag.
///
/// Unknown tags degrade to a pass-through hint instead of failing the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FieldKind {
    #[default]
    Text,
    Secret,
    Other(String),
}

impl FieldKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "" | "string" => Self::Text,
            "password" => Self::Secret,
            other => Self::Other(other.to_string()),
        }
    }

    /// The tag as the provider declared it.
    pub fn tag(&self) -> &str {
        match self {
            Self::Text => "string",
            Self::Secret => "password",
            Self::Other(tag) => tag,
        }
    }

    /// Input hint handed to the form renderer. Tags outside
    /// [`PASS_THROUGH_INPUT_TYPES`] render as plain text.
    pub fn input_type(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Secret => "password",
            Self::Other(tag) if PASS_THROUGH_INPUT_TYPES.contains(&tag.as_str()) => tag,
            Self::Other(_) => "text",
        }
    }

    pub fn is_masked_entry(&self) -> bool {
        matches!(self, Self::Secret)
    }
}

impl Serialize for FieldKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.as_deref().map(Self::from_tag).unwrap_or_default())
    }
}

/// One provider configuration input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigField {
    pub name: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
}

impl ConfigField {
    pub fn new(name: impl Into<String>, title: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: String::new(),
            kind,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn hint(&self) -> Option<&str> {
        let hint = self.description.trim();
        (!hint.is_empty()).then_some(hint)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ConfigFields {
    #[serde(default)]
    fields: Vec<ConfigField>,
}

/// A source's schema. Immutable for the lifetime of one wizard session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSchema {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub short_name: String,
    /// How the provider authenticates (e.g. `oauth2_with_refresh`). Shown to
    /// the user; the wizard itself only collects `config_fields`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
    #[serde(
        rename = "config_fields",
        default,
        deserialize_with = "fields_from_wire",
        serialize_with = "fields_to_wire"
    )]
    pub fields: Vec<ConfigField>,
}

impl SourceSchema {
    pub fn field(&self, name: &str) -> Option<&ConfigField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn fields_from_wire<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ConfigField>, D::Error> {
    Ok(Option::<ConfigFields>::deserialize(deserializer)?
        .map(|c| c.fields)
        .unwrap_or_default())
}

fn fields_to_wire<S: Serializer>(fields: &[ConfigField], serializer: S) -> Result<S::Ok, S::Error> {
    ConfigFields {
        fields: fields.to_vec(),
    }
    .serialize(serializer)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn parses_detail_payload() {
        let payload = json!({
            "name": "Zendesk",
            "description": "Tickets, users and organizations",
            "short_name": "zendesk",
            "auth_type": "oauth2_with_refresh",
            "config_fields": {
                "fields": [
                    {"name": "subdomain", "title": "Subdomain", "description": "acme for acme.zendesk.com", "type": "string"},
                    {"name": "api_token", "title": "API Token", "description": null, "type": "password"},
                    {"name": "page_size", "title": "Page Size", "type": "integer"}
                ]
            }
        });
        let schema: SourceSchema = serde_json::from_value(payload).unwrap();
        assert_eq!(schema.short_name, "zendesk");
        assert_eq!(schema.fields.len(), 3);
        assert_eq!(schema.fields[0].kind, FieldKind::Text);
        assert_eq!(schema.fields[0].hint(), Some("acme for acme.zendesk.com"));
        assert_eq!(schema.fields[1].kind, FieldKind::Secret);
        assert_eq!(schema.fields[1].hint(), None);
        assert_eq!(schema.fields[2].kind, FieldKind::Other("integer".into()));
        assert_eq!(schema.auth_type.as_deref(), Some("oauth2_with_refresh"));
    }

    #[test]
    fn missing_config_fields_means_no_fields() {
        let schema: SourceSchema =
            serde_json::from_value(json!({"name": "Stripe", "short_name": "stripe", "config_fields": null}))
                .unwrap();
        assert!(schema.fields.is_empty());
        assert_eq!(schema.description, "");
    }

    #[test]
    fn kind_input_types() {
        assert_eq!(FieldKind::from_tag("string").input_type(), "text");
        assert_eq!(FieldKind::from_tag("").input_type(), "text");
        assert_eq!(FieldKind::from_tag("password").input_type(), "password");
        assert_eq!(FieldKind::from_tag("url").input_type(), "url");
        assert_eq!(FieldKind::from_tag("integer").input_type(), "text");
        assert_eq!(FieldKind::from_tag("integer").tag(), "integer");
        assert!(FieldKind::Secret.is_masked_entry());
        assert!(!FieldKind::Other("password2".into()).is_masked_entry());
    }

    #[test]
    fn serializes_back_to_wire_shape() {
        let schema = SourceSchema {
            name: "Asana".into(),
            description: String::new(),
            short_name: "asana".into(),
            auth_type: None,
            fields: vec![ConfigField::new("token", "Token", FieldKind::Secret)],
        };
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["config_fields"]["fields"][0]["type"], "password");
        assert!(value.get("auth_type").is_none());
        let back: SourceSchema = serde_json::from_value(value).unwrap();
        assert_eq!(back, schema);
    }
}

use conduit_common::FromMessage;

use crate::validate::ValidationReport;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load source '{short_name}': {reason}")]
    SchemaFetch { short_name: String, reason: String },

    #[error("{0}")]
    Validation(ValidationReport),

    #[error("failed to create connection: {reason}")]
    Provisioning { reason: String },

    #[error("unknown configuration field '{0}'")]
    UnknownField(String),

    #[error("{action} is not allowed {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn schema_fetch(short_name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::SchemaFetch {
            short_name: short_name.into(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn provisioning(reason: impl std::fmt::Display) -> Self {
        Self::Provisioning {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn transition(action: &'static str, state: &'static str) -> Self {
        Self::InvalidTransition { action, state }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

conduit_common::impl_context!();

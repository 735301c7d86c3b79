//! Wizard session state. No I/O.

use serde::Serialize;

use crate::{draft::ConnectionDraft, schema::SourceSchema};

/// Steps in the connection wizard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Configure,
    Review,
}

impl WizardStep {
    pub fn number(self) -> usize {
        match self {
            Self::Configure => 1,
            Self::Review => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Configure => "Configure",
            Self::Review => "Review",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Configure => "Configure your connection",
            Self::Review => "Review and create",
        }
    }
}

/// Identifies one open/close cycle. Async results carry the generation they
/// were issued under so late arrivals can be told apart from live ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SessionGeneration(u64);

impl SessionGeneration {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of the one live wizard dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardSession {
    pub(crate) current_step: WizardStep,
    pub(crate) schema: Option<SourceSchema>,
    pub(crate) draft: ConnectionDraft,
    pub(crate) loading_schema: bool,
    pub(crate) submitting: bool,
}

impl WizardSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn schema(&self) -> Option<&SourceSchema> {
        self.schema.as_ref()
    }

    pub fn draft(&self) -> &ConnectionDraft {
        &self.draft
    }

    pub fn loading_schema(&self) -> bool {
        self.loading_schema
    }

    pub fn submitting(&self) -> bool {
        self.submitting
    }

    /// An async operation currently owns the UI.
    pub fn is_busy(&self) -> bool {
        self.loading_schema || self.submitting
    }

    /// Back to the values of a freshly opened dialog.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_initial(&self) -> bool {
        *self == Self::default()
    }
}

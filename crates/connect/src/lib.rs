//! Two-step connection setup wizard for data sources.
//!
//! Flow: open → fetch schema → configure → review → create.
//!
//! The provider's schema drives the form; no provider-specific code lives
//! here. [`controller::WizardController`] holds the state machine and talks to
//! the backend through [`client::SourceApi`]; [`wizard`] is a terminal front end
//! on top of it.

pub mod client;
pub mod controller;
pub mod draft;
pub mod error;
pub mod form;
pub mod mask;
pub mod schema;
pub mod session;
pub mod validate;
pub mod wizard;

pub use {
    client::{CreatedConnection, HttpSourceApi, SourceApi},
    controller::{Completion, Notice, NoticeLevel, WizardController, WizardHost},
    draft::ConnectionDraft,
    error::{Context, Error, Result},
    form::{FieldView, ReviewRow},
    mask::SensitivityPolicy,
    schema::{ConfigField, FieldKind, SourceSchema},
    session::{SessionGeneration, WizardSession, WizardStep},
    validate::{ValidationReport, Violation, validate},
    wizard::{TerminalHost, run_connect_wizard},
};

//! Wizard controller: owns the session, sequences the schema fetch, form edits,
//! validation and provisioning, and reports back to the host.
//!
//! Network calls run as spawned tasks. Their results come back through
//! [`WizardController::pump`] (or [`WizardController::poll_completions`] for
//! hosts that drive their own event loop) tagged with the
//! [`SessionGeneration`] that issued them; anything addressed to an earlier
//! generation is dropped.

use std::sync::Arc;

use {
    serde::Serialize,
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use crate::{
    client::{CreatedConnection, SourceApi},
    draft::ConnectionDraft,
    error::{Error, Result},
    form::{FieldView, ReviewRow, render_form, review_rows},
    mask::SensitivityPolicy,
    schema::SourceSchema,
    session::{SessionGeneration, WizardSession, WizardStep},
    validate::validate,
};

pub const SCHEMA_FETCH_FAILED: &str = "Failed to load source";
pub const VALIDATION_FAILED: &str = "Missing required fields";
pub const PROVISIONING_FAILED: &str = "Failed to create connection";
pub const PROVISIONING_SUCCEEDED: &str = "Connection created";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-visible notification. Rendering (toast, status line) is the host's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Callbacks into the application hosting the wizard dialog.
pub trait WizardHost {
    /// Called once, only after the backend created the connection.
    fn on_complete(&mut self, connection_id: &str);

    /// Request the dialog be shown or hidden. The wizard only ever asks to
    /// close, right after a successful submit.
    fn on_open_change(&mut self, open: bool);

    fn notify(&mut self, notice: Notice);
}

/// Result of a spawned network call.
#[derive(Debug)]
pub enum Completion {
    SchemaLoaded {
        generation: SessionGeneration,
        short_name: String,
        result: Result<SourceSchema>,
    },
    Provisioned {
        generation: SessionGeneration,
        result: Result<CreatedConnection>,
    },
}

impl Completion {
    pub fn generation(&self) -> SessionGeneration {
        match self {
            Self::SchemaLoaded { generation, .. } | Self::Provisioned { generation, .. } => {
                *generation
            },
        }
    }
}

/// Drives one wizard dialog at a time.
///
/// Must be used from within a tokio runtime: [`open`](Self::open) and
/// [`submit`](Self::submit) spawn their network calls.
pub struct WizardController<H> {
    api: Arc<dyn SourceApi>,
    host: H,
    policy: SensitivityPolicy,
    session: WizardSession,
    short_name: Option<String>,
    generation: SessionGeneration,
    outstanding: usize,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<H: WizardHost> WizardController<H> {
    pub fn new(api: Arc<dyn SourceApi>, host: H) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            api,
            host,
            policy: SensitivityPolicy::default(),
            session: WizardSession::new(),
            short_name: None,
            generation: SessionGeneration::default(),
            outstanding: 0,
            completions_tx,
            completions_rx,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SensitivityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn policy(&self) -> &SensitivityPolicy {
        &self.policy
    }

    pub fn generation(&self) -> SessionGeneration {
        self.generation
    }

    /// Provider of the open session, `None` while closed.
    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.short_name.is_some()
    }

    /// Open the wizard for a provider and start fetching its schema.
    ///
    /// Opening again for the same provider while open is a no-op; the schema
    /// is fetched once per open.
    pub fn open(&mut self, short_name: &str) -> Result<()> {
        let short_name = short_name.trim();
        if short_name.is_empty() {
            return Err(Error::message("provider identifier must not be empty"));
        }
        if self.short_name.as_deref() == Some(short_name) {
            debug!(short_name, "wizard already open for provider");
            return Ok(());
        }
        self.start_session(short_name);
        Ok(())
    }

    /// Switch the open wizard to another provider. Starts over with a new
    /// schema fetch; values entered for the previous provider are dropped.
    pub fn set_provider(&mut self, short_name: &str) -> Result<()> {
        if !self.is_open() {
            return Err(Error::transition("changing provider", "while closed"));
        }
        self.open(short_name)
    }

    fn start_session(&mut self, short_name: &str) {
        self.generation = self.generation.next();
        self.session.reset();
        self.session.loading_schema = true;
        self.short_name = Some(short_name.to_string());
        info!(short_name, generation = %self.generation, "wizard opened");

        let api = Arc::clone(&self.api);
        let tx = self.completions_tx.clone();
        let generation = self.generation;
        let short_name = short_name.to_string();
        self.outstanding += 1;
        tokio::spawn(async move {
            let result = api.fetch_schema(&short_name).await;
            // The controller may be gone; nothing left to update then.
            let _ = tx.send(Completion::SchemaLoaded {
                generation,
                short_name,
                result,
            });
        });
    }

    /// Unconditionally reset to the initial state. In-flight calls are not
    /// aborted; their results are discarded when they arrive.
    pub fn close(&mut self) {
        if let Some(short_name) = self.short_name.take() {
            info!(short_name, generation = %self.generation, "wizard closed");
        }
        self.session.reset();
        self.generation = self.generation.next();
    }

    fn ensure_editable(&self) -> Result<()> {
        if !self.is_open() {
            return Err(Error::transition("editing", "while closed"));
        }
        if self.session.is_busy() {
            return Err(Error::transition("editing", "while a request is in flight"));
        }
        if self.session.current_step != WizardStep::Configure {
            return Err(Error::transition("editing", "on the review step"));
        }
        if self.session.schema.is_none() {
            return Err(Error::transition("editing", "without a loaded schema"));
        }
        Ok(())
    }

    pub fn set_name(&mut self, value: impl Into<String>) -> Result<()> {
        self.ensure_editable()?;
        self.session.draft.name = value.into();
        Ok(())
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        self.ensure_editable()?;
        self.session.draft.set_field(name, value)
    }

    /// Configure → Review, gated by validation. A failed check notifies the
    /// host with every missing field and keeps the Configure step.
    pub fn next(&mut self) -> Result<()> {
        self.ensure_editable()
            .map_err(|_| Error::transition("next", "outside a loaded configure step"))?;
        let Some(schema) = self.session.schema.as_ref() else {
            return Err(Error::transition("next", "without a loaded schema"));
        };

        let report = validate(&self.session.draft, schema);
        if !report.is_valid() {
            debug!(
                violations = report.violations().len(),
                "configuration incomplete"
            );
            self.host
                .notify(Notice::error(VALIDATION_FAILED, report.message()));
            return Err(Error::Validation(report));
        }

        // Review shows exactly what submit sends.
        self.session.draft.name = self.session.draft.name.trim().to_string();
        self.session.current_step = WizardStep::Review;
        debug!(generation = %self.generation, "advanced to review");
        Ok(())
    }

    /// Review → Configure. Nothing entered is cleared.
    pub fn back(&mut self) -> Result<()> {
        if self.session.current_step != WizardStep::Review {
            return Err(Error::transition("back", "outside the review step"));
        }
        if self.session.submitting {
            return Err(Error::transition("back", "while submitting"));
        }
        self.session.current_step = WizardStep::Configure;
        Ok(())
    }

    /// Send the whole draft to the backend.
    pub fn submit(&mut self) -> Result<()> {
        if self.session.current_step != WizardStep::Review {
            return Err(Error::transition("submit", "outside the review step"));
        }
        if self.session.submitting {
            return Err(Error::transition("submit", "while already submitting"));
        }
        let Some(short_name) = self.short_name.clone() else {
            return Err(Error::transition("submit", "while closed"));
        };

        self.session.submitting = true;
        info!(short_name, generation = %self.generation, "submitting connection");

        let api = Arc::clone(&self.api);
        let tx = self.completions_tx.clone();
        let generation = self.generation;
        let draft: ConnectionDraft = self.session.draft.clone();
        self.outstanding += 1;
        tokio::spawn(async move {
            let result = api.create_connection(&short_name, &draft).await;
            let _ = tx.send(Completion::Provisioned { generation, result });
        });
        Ok(())
    }

    /// Apply an async result to the session it was issued for.
    pub fn handle(&mut self, completion: Completion) {
        if completion.generation() != self.generation {
            debug!(
                issued = %completion.generation(),
                current = %self.generation,
                "discarding result for a stale session"
            );
            return;
        }

        match completion {
            Completion::SchemaLoaded {
                short_name, result, ..
            } => self.on_schema_loaded(&short_name, result),
            Completion::Provisioned { result, .. } => self.on_provisioned(result),
        }
    }

    fn on_schema_loaded(&mut self, short_name: &str, result: Result<SourceSchema>) {
        if !self.session.loading_schema {
            warn!(short_name, "schema result without a pending fetch");
            return;
        }
        self.session.loading_schema = false;
        match result {
            Ok(schema) => {
                debug!(short_name, field_count = schema.fields.len(), "schema ready");
                self.session.draft = ConnectionDraft::for_schema(&schema);
                self.session.schema = Some(schema);
            },
            Err(e) => {
                warn!(short_name, error = %e, "schema fetch failed");
                self.host.notify(Notice::error(SCHEMA_FETCH_FAILED, e.to_string()));
            },
        }
    }

    fn on_provisioned(&mut self, result: Result<CreatedConnection>) {
        if !self.session.submitting {
            warn!("provisioning result without a pending submit");
            return;
        }
        self.session.submitting = false;
        match result {
            Ok(created) => {
                info!(connection_id = %created.id, "connection provisioned");
                let name = created
                    .name
                    .clone()
                    .unwrap_or_else(|| self.session.draft.name.trim().to_string());
                self.host.notify(Notice::success(
                    PROVISIONING_SUCCEEDED,
                    format!("{name} is ready"),
                ));
                self.host.on_complete(&created.id);
                self.host.on_open_change(false);
                self.close();
            },
            Err(e) => {
                warn!(error = %e, "provisioning failed");
                self.host
                    .notify(Notice::error(PROVISIONING_FAILED, e.to_string()));
            },
        }
    }

    /// Wait for the next async result and apply it. Returns `false` right
    /// away when nothing is outstanding.
    pub async fn pump(&mut self) -> bool {
        if self.outstanding == 0 {
            return false;
        }
        match self.completions_rx.recv().await {
            Some(completion) => {
                self.outstanding = self.outstanding.saturating_sub(1);
                self.handle(completion);
                true
            },
            None => false,
        }
    }

    /// Apply every result that has already arrived without waiting.
    pub fn poll_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.outstanding = self.outstanding.saturating_sub(1);
            self.handle(completion);
            applied += 1;
        }
        applied
    }

    /// Number of spawned calls whose results have not been received yet,
    /// including ones that will be discarded.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Inputs for the Configure step; empty until a schema has loaded.
    pub fn form(&self) -> Vec<FieldView> {
        self.session
            .schema
            .as_ref()
            .map(|schema| render_form(schema, &self.session.draft))
            .unwrap_or_default()
    }

    /// Masked summary for the Review step; empty on any other step.
    pub fn review(&self) -> Vec<ReviewRow> {
        match (&self.session.schema, self.session.current_step) {
            (Some(schema), WizardStep::Review) => {
                review_rows(schema, &self.session.draft, &self.policy)
            },
            _ => Vec::new(),
        }
    }

    pub fn can_advance(&self) -> bool {
        self.ensure_editable().is_ok()
    }

    pub fn can_submit(&self) -> bool {
        self.is_open()
            && self.session.current_step == WizardStep::Review
            && !self.session.submitting
    }
}

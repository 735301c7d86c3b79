//! Terminal front end for the connection wizard.

use std::{
    io::{BufRead, Write},
    sync::Arc,
};

use tracing::debug;

use crate::{
    client::SourceApi,
    controller::{Notice, NoticeLevel, WizardController, WizardHost},
    error::{Error, Result},
    mask::{SensitivityPolicy, mask_value},
    session::WizardStep,
};

/// Host that buffers notices for the prompt loop to print.
#[derive(Debug, Default)]
pub struct TerminalHost {
    notices: Vec<Notice>,
    completed: Option<String>,
    closed: bool,
}

impl TerminalHost {
    pub fn completed(&self) -> Option<&str> {
        self.completed.as_deref()
    }

    /// The wizard asked for the dialog to be dismissed.
    pub fn closed(&self) -> bool {
        self.closed
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

impl WizardHost for TerminalHost {
    fn on_complete(&mut self, connection_id: &str) {
        self.completed = Some(connection_id.to_string());
    }

    fn on_open_change(&mut self, open: bool) {
        self.closed = !open;
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// Run the wizard on stdin/stdout. Returns the new connection's id, or `None`
/// when the user quit or the source could not be loaded.
pub async fn run_connect_wizard(
    api: Arc<dyn SourceApi>,
    short_name: &str,
    policy: SensitivityPolicy,
) -> Result<Option<String>> {
    let mut reader = std::io::BufReader::new(std::io::stdin());
    let mut out = std::io::stdout();
    run_connect_wizard_with(api, short_name, policy, &mut reader, &mut out).await
}

/// [`run_connect_wizard`] over arbitrary input and output streams.
pub async fn run_connect_wizard_with<R: BufRead, W: Write>(
    api: Arc<dyn SourceApi>,
    short_name: &str,
    policy: SensitivityPolicy,
    reader: &mut R,
    out: &mut W,
) -> Result<Option<String>> {
    let mut ctl = WizardController::new(api, TerminalHost::default()).with_policy(policy);
    ctl.open(short_name)?;
    while ctl.session().loading_schema() && ctl.pump().await {}
    flush_notices(&mut ctl, out)?;

    let Some(schema) = ctl.session().schema().cloned() else {
        ctl.close();
        return Ok(None);
    };
    writeln!(out, "{}", schema.name)?;
    if !schema.description.is_empty() {
        writeln!(out, "{}", schema.description)?;
    }
    if let Some(auth_type) = &schema.auth_type {
        writeln!(out, "Authentication: {auth_type}")?;
    }

    loop {
        let step = ctl.session().current_step();
        writeln!(out)?;
        writeln!(out, "Step {} of 2: {}", step.number(), step.title())?;

        match step {
            WizardStep::Configure => {
                if !configure(&mut ctl, reader, out)? {
                    ctl.close();
                    return Ok(None);
                }
                match ctl.next() {
                    Ok(()) | Err(Error::Validation(_)) => {},
                    Err(e) => return Err(e),
                }
                flush_notices(&mut ctl, out)?;
            },
            WizardStep::Review => {
                for row in ctl.review() {
                    writeln!(out, "  {}: {}", row.label, row.value)?;
                }
                let Some(choice) = prompt(reader, out, "[c]reate, [b]ack or [q]uit", "")? else {
                    ctl.close();
                    return Ok(None);
                };
                match choice.trim().to_lowercase().as_str() {
                    "c" | "create" | "r" | "retry" => {
                        ctl.submit()?;
                        writeln!(out, "Creating connection...")?;
                        while ctl.session().submitting() && ctl.pump().await {}
                        flush_notices(&mut ctl, out)?;
                        if let Some(id) = ctl.host().completed() {
                            return Ok(Some(id.to_string()));
                        }
                    },
                    "b" | "back" => ctl.back()?,
                    "q" | "quit" => {
                        ctl.close();
                        return Ok(None);
                    },
                    other => debug!(input = other, "unrecognised review command"),
                }
            },
        }
    }
}

/// Answer that clears a value instead of keeping it.
pub const CLEAR_ANSWER: &str = "-";

/// What the user typed at a prompt.
#[derive(Debug, PartialEq, Eq)]
enum Answer {
    Keep,
    Clear,
    Set(String),
}

impl Answer {
    fn parse(line: String) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            Self::Keep
        } else if trimmed == CLEAR_ANSWER {
            Self::Clear
        } else {
            Self::Set(line)
        }
    }
}

/// Prompt for the name and every field. Returns `false` on end of input.
fn configure<R: BufRead, W: Write>(
    ctl: &mut WizardController<TerminalHost>,
    reader: &mut R,
    out: &mut W,
) -> Result<bool> {
    let current = ctl.session().draft().name.clone();
    if !current.is_empty() || !ctl.session().draft().field_values().values().all(String::is_empty)
    {
        writeln!(out, "Press Enter to keep a value, or type {CLEAR_ANSWER} to clear it.")?;
    }
    let Some(name) = prompt(reader, out, "Connection name", &current)? else {
        return Ok(false);
    };
    match Answer::parse(name) {
        Answer::Keep => {},
        Answer::Clear => ctl.set_name("")?,
        Answer::Set(name) => ctl.set_name(name)?,
    }

    for view in ctl.form() {
        if let Some(hint) = &view.hint {
            writeln!(out, "  {hint}")?;
        }
        let sensitive = ctl
            .session()
            .schema()
            .and_then(|schema| schema.field(&view.name))
            .is_some_and(|field| ctl.policy().is_sensitive(field));
        let (label, shown) = if view.value.is_empty() {
            (format!("{} ({})", view.label, view.placeholder), String::new())
        } else if sensitive {
            (view.label.clone(), mask_value(&view.value))
        } else {
            (view.label.clone(), view.value.clone())
        };
        let Some(value) = prompt(reader, out, &label, &shown)? else {
            return Ok(false);
        };
        match Answer::parse(value) {
            Answer::Keep => {},
            Answer::Clear => ctl.set_field(&view.name, "")?,
            Answer::Set(value) => ctl.set_field(&view.name, value)?,
        }
    }
    Ok(true)
}

/// Print `label [current]: ` and read one line. `None` on end of input.
fn prompt<R: BufRead, W: Write>(
    reader: &mut R,
    out: &mut W,
    label: &str,
    current: &str,
) -> Result<Option<String>> {
    if current.is_empty() {
        write!(out, "{label}: ")?;
    } else {
        write!(out, "{label} [{current}]: ")?;
    }
    out.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn flush_notices<W: Write>(ctl: &mut WizardController<TerminalHost>, out: &mut W) -> Result<()> {
    for notice in ctl.host_mut().take_notices() {
        let marker = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
        };
        writeln!(out, "{marker}: {}: {}", notice.title, notice.message)?;
    }
    Ok(())
}

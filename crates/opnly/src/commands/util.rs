//! Shared helpers for command handlers.

use std::future::Future;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use serde::Deserialize;

use opnly_core::{Controller, ToggleOutcome};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Pass the login gate, if one is set. Returns the verified password.
///
/// Uses `--password` / `OPNLY_PASSWORD` when given, otherwise prompts.
pub fn unlock(
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<Option<SecretString>, CliError> {
    let gate = controller.login_gate();
    if !gate.is_enforced()? {
        return Ok(None);
    }

    let password = match global.password {
        Some(ref pw) => SecretString::from(pw.clone()),
        None => prompt_secret("Login password").map_err(|e| match e {
            CliError::InputRequired { .. } => CliError::LoginRequired,
            other => other,
        })?,
    };

    if gate.verify(&password)? {
        tracing::debug!("login gate passed");
        Ok(Some(password))
    } else {
        Err(CliError::WrongPassword)
    }
}

/// Read a secret from the terminal without echo.
pub fn prompt_secret(label: &str) -> Result<SecretString, CliError> {
    if !io::stdin().is_terminal() {
        return Err(CliError::InputRequired { what: label.into() });
    }
    let value = rpassword::prompt_password(format!("{label}: "))?;
    Ok(SecretString::from(value))
}

/// Read a line of text from the terminal.
pub fn prompt_text(label: &str, default: Option<&str>) -> Result<String, CliError> {
    if !io::stdin().is_terminal() {
        return Err(CliError::InputRequired { what: label.into() });
    }
    let mut input = dialoguer::Input::<String>::new().with_prompt(label);
    if let Some(default) = default {
        input = input.default(default.to_owned());
    }
    input.interact_text().map_err(prompt_err)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

fn prompt_err(e: dialoguer::Error) -> CliError {
    CliError::Io(io::Error::other(e))
}

/// Run `fut` behind a spinner on stderr when it is a terminal.
pub async fn with_spinner<F, T>(message: &str, quiet: bool, fut: F) -> T
where
    F: Future<Output = T>,
{
    let spinner = (!quiet && io::stderr().is_terminal()).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner());
        pb.set_message(message.to_owned());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });
    let out = fut.await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    out
}

/// Print a completed toggle: the status line in table mode, the outcome
/// itself otherwise.
pub fn print_outcome(outcome: &ToggleOutcome, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(
        &global.output,
        outcome,
        |o| o.status_line().to_owned(),
        |o| o.state.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Resolve a rule argument (uuid or bookmark name) to a uuid.
///
/// An argument matching no bookmark is taken as a uuid as-is.
pub fn resolve_rule(controller: &Controller, input: &str) -> Result<String, CliError> {
    let bookmarks = controller.bookmarks().list()?;
    if bookmarks.iter().any(|b| b.uuid == input) {
        return Ok(input.to_owned());
    }
    let mut named = bookmarks.iter().filter(|b| b.name == input);
    match (named.next(), named.next()) {
        (Some(only), None) => Ok(only.uuid.clone()),
        (Some(_), Some(_)) => Err(CliError::Validation {
            field: "rule".into(),
            reason: format!("several bookmarks are named '{input}'; use the uuid"),
        }),
        (None, _) => Ok(input.to_owned()),
    }
}

/// Resolve an alias argument (uuid or name) to a uuid via the alias search.
pub async fn resolve_alias(controller: &Controller, input: &str) -> Result<String, CliError> {
    let aliases = controller.aliases().await?;
    Ok(aliases
        .iter()
        .find(|a| a.uuid == input || a.name == input)
        .map_or_else(|| input.to_owned(), |a| a.uuid.clone()))
}

#[derive(Debug, Deserialize)]
pub struct BookmarkEntry {
    pub name: String,
    pub uuid: String,
}

/// Read a JSON array of `{ "name", "uuid" }` objects.
pub fn read_bookmark_file(path: &Path) -> Result<Vec<BookmarkEntry>, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "file".into(),
        reason: format!("expected a JSON array of {{\"name\", \"uuid\"}} objects: {e}"),
    })
}

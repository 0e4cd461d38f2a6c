//! First-run setup and login password handlers.

use secrecy::{ExposeSecret, SecretString};

use opnly_core::{Controller, PasswordUpdate};

use crate::cli::{GlobalOpts, PasswdArgs, SetupArgs};
use crate::error::CliError;

use super::util;

const DEFAULT_PORT: u16 = 443;

/// Store connection details. Re-running setup on a protected install
/// requires the login password.
pub async fn handle(
    controller: &Controller,
    args: SetupArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let existing = controller.credentials().get()?;
    if existing.is_some() {
        util::unlock(controller, global)?;
    }

    let host = match args.host {
        Some(host) => host,
        None => util::prompt_text("Firewall host", existing.as_ref().map(|c| c.host.as_str()))?,
    };
    let port = args
        .port
        .unwrap_or_else(|| existing.as_ref().map_or(DEFAULT_PORT, |c| c.port));
    let key = match args.key {
        Some(key) => key,
        None => util::prompt_text("API key", existing.as_ref().map(|c| c.key.as_str()))?,
    };
    let secret = match (args.secret, existing.as_ref()) {
        (Some(secret), _) => SecretString::from(secret),
        (None, Some(creds)) => SecretString::from(creds.secret.expose_secret().to_owned()),
        (None, None) => util::prompt_secret("API secret")?,
    };

    let password = if args.clear_password {
        PasswordUpdate::Clear
    } else {
        match args.login_password {
            Some(pw) if pw.is_empty() => {
                return Err(CliError::Validation {
                    field: "login-password".into(),
                    reason: "must not be empty; use --clear-password to remove it".into(),
                });
            }
            Some(pw) => PasswordUpdate::Set(SecretString::from(pw)),
            None => PasswordUpdate::Unchanged,
        }
    };

    controller.save_credentials(&key, &secret, &host, port, &password)?;
    if !global.quiet {
        eprintln!("Saved connection to {}:{port}", host.trim());
    }

    if args.skip_probe {
        return Ok(());
    }
    util::with_spinner("Contacting firewall", global.quiet, controller.probe()).await?;
    if !global.quiet {
        eprintln!("Firewall reachable");
    }
    Ok(())
}

/// Set, change or remove the login password.
///
/// `login` is the password that already passed the gate, if one is set.
pub fn passwd(
    controller: &Controller,
    args: PasswdArgs,
    login: Option<&SecretString>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let creds = controller
        .credentials()
        .get()?
        .ok_or(CliError::NotConfigured)?;

    if args.clear {
        controller.save_credentials(
            &creds.key,
            &creds.secret,
            &creds.host,
            creds.port,
            &PasswordUpdate::Clear,
        )?;
        if !global.quiet {
            eprintln!("Login password removed");
        }
        return Ok(());
    }

    let (new, confirm) = match args.new_password {
        Some(pw) => {
            let confirm = args.confirm.unwrap_or_else(|| pw.clone());
            (SecretString::from(pw), SecretString::from(confirm))
        }
        None => (
            util::prompt_secret("New password")?,
            util::prompt_secret("Repeat new password")?,
        ),
    };

    controller
        .login_gate()
        .change_password(login, &new, &confirm)?;
    if !global.quiet {
        eprintln!("Login password updated");
    }
    Ok(())
}

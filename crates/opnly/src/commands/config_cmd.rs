//! Config subcommand handlers.

use std::fmt::Write;

use opnly_core::{ApiCredentials, Database};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Config file and settings commands. Secrets are masked; nothing here
/// prompts or contacts the firewall.
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => {
            let path = opnly_config::config_path();
            if path.exists() && !force {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists (use --force to replace it)", path.display()),
                });
            }
            let settings = opnly_config::load_settings()?;
            let path = opnly_config::save_settings(&settings)?;
            if !global.quiet {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&opnly_config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let settings = opnly_config::load_settings()?;
            let db_path = global
                .database
                .clone()
                .unwrap_or_else(|| settings.database_path());

            // Only read an existing database; `config show` must not create one.
            let stored = if db_path.exists() {
                Database::open(&db_path)?.credentials().get()?
            } else {
                None
            };

            let mut out = toml::to_string_pretty(&settings)
                .map_err(|e| CliError::Config(e.into()))?;
            let _ = writeln!(out);
            let _ = writeln!(out, "# database: {}", db_path.display());
            out.push_str(&format_connection(stored.as_ref()));
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }
    }
}

fn format_connection(creds: Option<&ApiCredentials>) -> String {
    let mut out = String::new();
    match creds {
        Some(c) => {
            let _ = writeln!(out, "# firewall: {}:{}", c.host, c.port);
            let _ = writeln!(out, "# api key: {}", mask(&c.key));
            let _ = writeln!(
                out,
                "# login password: {}",
                if c.password_hash.is_some() { "set" } else { "not set" }
            );
        }
        None => {
            let _ = writeln!(out, "# firewall: not configured (run `opnly setup`)");
        }
    }
    out
}

/// Keep the last four characters of a key.
fn mask(key: &str) -> String {
    let count = key.chars().count();
    if count <= 4 {
        return "****".into();
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("****{tail}")
}

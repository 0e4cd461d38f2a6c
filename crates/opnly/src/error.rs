//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use opnly_config::ConfigError;
use opnly_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const NOT_APPLIED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the firewall at {url}")]
    #[diagnostic(
        code(opnly::connection_failed),
        help(
            "{reason}\n\
             Check the address with: opnly config show\n\
             Self-signed certificates are accepted unless `insecure = false`."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Invalid firewall address {endpoint}")]
    #[diagnostic(
        code(opnly::invalid_address),
        help("{reason}\nRun: opnly setup --host <HOST> --port <PORT>")
    )]
    InvalidAddress { endpoint: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(opnly::timeout),
        help("Raise get_timeout_secs / post_timeout_secs in the config file or check the firewall.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("The firewall rejected the API key or secret")]
    #[diagnostic(
        code(opnly::auth_failed),
        help(
            "Create a key under System > Access > Users on the firewall,\n\
             then run: opnly setup --key <KEY>"
        )
    )]
    AuthFailed,

    #[error("Login password required")]
    #[diagnostic(
        code(opnly::login_required),
        help("Pass --password or set OPNLY_PASSWORD when running non-interactively.")
    )]
    LoginRequired,

    #[error("Wrong login password")]
    #[diagnostic(code(opnly::wrong_password))]
    WrongPassword,

    #[error("No firewall configured")]
    #[diagnostic(
        code(opnly::not_configured),
        help("Run: opnly setup --host <HOST> --key <KEY>")
    )]
    NotConfigured,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(opnly::not_found),
        help("Run: opnly {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Remote ───────────────────────────────────────────────────────
    #[error("Firewall returned HTTP {status}")]
    #[diagnostic(code(opnly::remote_error), help("{message}"))]
    RemoteError { status: u16, message: String },

    #[error("{operation} failed")]
    #[diagnostic(code(opnly::change_failed), help("{message}"))]
    ChangeFailed { operation: String, message: String },

    #[error("{operation} was staged but not applied")]
    #[diagnostic(
        code(opnly::not_applied),
        help(
            "{message}\n\
             The change is on the firewall but not active yet. Apply it from the\n\
             web interface or run the command again."
        )
    )]
    NotApplied { operation: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(opnly::validation))]
    Validation { field: String, reason: String },

    #[error("{what} is required")]
    #[diagnostic(
        code(opnly::input_required),
        help("Pass it as a flag when running non-interactively.")
    )]
    InputRequired { what: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(opnly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Local ────────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(opnly::config))]
    Config(#[from] ConfigError),

    #[error("{0}")]
    #[diagnostic(code(opnly::storage))]
    Storage(String),

    #[error("{0}")]
    #[diagnostic(code(opnly::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(opnly::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed | Self::LoginRequired | Self::WrongPassword => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::NotApplied { .. } => exit_code::NOT_APPLIED,
            Self::InvalidAddress { .. }
            | Self::Validation { .. }
            | Self::InputRequired { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailure { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::InvalidEndpoint { endpoint, reason } => {
                Self::InvalidAddress { endpoint, reason }
            }
            CoreError::Unauthorized => Self::AuthFailed,
            CoreError::RemoteError { status, message } => Self::RemoteError { status, message },

            CoreError::RuleNotFound { uuid } => Self::NotFound {
                resource_type: "rule".into(),
                identifier: uuid,
                list_command: "rules remote".into(),
            },
            CoreError::NotFound { entity, identifier } => Self::NotFound {
                list_command: list_command_for(&entity),
                resource_type: entity,
                identifier,
            },

            CoreError::ValidationError { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::MutationFailed { operation, message } => {
                Self::ChangeFailed { operation, message }
            }
            CoreError::CommitFailed { operation, message } => {
                Self::NotApplied { operation, message }
            }

            CoreError::NotConfigured => Self::NotConfigured,
            CoreError::Storage(message) => Self::Storage(message),
            CoreError::ControllerStopped => Self::Internal(CoreError::ControllerStopped.to_string()),
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

fn list_command_for(entity: &str) -> String {
    match entity {
        "Alias" => "aliases list".into(),
        "WireGuard configuration" => "vpn status".into(),
        _ => "--help".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_failure_has_its_own_exit_code() {
        let err: CliError = CoreError::CommitFailed {
            operation: "Disable rule".into(),
            message: "apply returned failed".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::NOT_APPLIED);

        let err: CliError = CoreError::MutationFailed {
            operation: "Disable rule".into(),
            message: "failed".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn transport_classes_map_to_distinct_codes() {
        let cases = [
            (
                CoreError::ConnectionFailure {
                    url: "https://fw".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::Timeout { timeout_secs: 5 }, exit_code::TIMEOUT),
            (CoreError::Unauthorized, exit_code::AUTH),
            (
                CoreError::RuleNotFound { uuid: "u".into() },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::ValidationError {
                    message: "bad".into(),
                },
                exit_code::USAGE,
            ),
        ];
        for (core, code) in cases {
            let rendered = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), code, "{rendered}");
        }
    }
}

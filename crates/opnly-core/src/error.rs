// ── Core error types ──
//
// User-facing errors from opnly-core. Consumers never see reqwest or
// rusqlite types: the `From` impls below translate lower-layer failures
// into this taxonomy. Every variant is recoverable; callers turn it into a
// `Notice` and carry on.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the firewall at {url}: {reason}")]
    ConnectionFailure { url: String, reason: String },

    #[error("Firewall request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Invalid firewall address {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("API key or secret rejected by the firewall")]
    Unauthorized,

    #[error("Firewall returned HTTP {status}: {message}")]
    RemoteError { status: u16, message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Rule not found on the firewall: {uuid}")]
    RuleNotFound { uuid: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("{message}")]
    ValidationError { message: String },

    // ── Two-phase mutation errors ────────────────────────────────────
    /// The first phase (toggle / set) did not take effect.
    #[error("{operation} failed: {message}")]
    MutationFailed { operation: String, message: String },

    /// The first phase succeeded but the commit did not. The change is
    /// staged on the appliance but not active.
    #[error("{operation} was staged but not applied: {message}")]
    CommitFailed { operation: String, message: String },

    // ── Local state ──────────────────────────────────────────────────
    #[error("No firewall credentials configured")]
    NotConfigured,

    #[error("Controller has been shut down")]
    ControllerStopped,

    #[error("Local database error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    /// Whether the failure left a staged, uncommitted change on the
    /// appliance.
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::CommitFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<opnly_api::Error> for CoreError {
    fn from(err: opnly_api::Error) -> Self {
        match err {
            opnly_api::Error::ConnectionFailure { url, reason } => {
                CoreError::ConnectionFailure { url, reason }
            }
            opnly_api::Error::Timeout { timeout_secs, .. } => CoreError::Timeout { timeout_secs },
            opnly_api::Error::InvalidEndpoint { endpoint, reason } => {
                CoreError::InvalidEndpoint { endpoint, reason }
            }
            opnly_api::Error::Tls(reason) => CoreError::ConnectionFailure {
                url: String::new(),
                reason: format!("TLS error: {reason}"),
            },
            opnly_api::Error::Unauthorized => CoreError::Unauthorized,
            opnly_api::Error::Remote { status, body } => CoreError::RemoteError {
                status,
                message: body,
            },
            opnly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("unexpected response from firewall: {message}"))
            }
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

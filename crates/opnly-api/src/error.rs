use thiserror::Error;

/// Top-level error type for the `opnly-api` crate.
///
/// Every request failure is classified into one of these variants before it
/// leaves the client. `opnly-core` maps them into user-facing diagnostics.
/// None of them is fatal: callers report and carry on.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Host unreachable, connection refused, reset mid-request.
    #[error("Cannot reach {url}: {reason}")]
    ConnectionFailure { url: String, reason: String },

    /// Request exceeded its per-method timeout.
    #[error("Request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// Malformed base URL, unsupported scheme, or an endpoint that cannot
    /// be expressed as a URL.
    #[error("Invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// TLS setup failed (unreadable or invalid CA certificate).
    #[error("TLS error: {0}")]
    Tls(String),

    // ── HTTP status ─────────────────────────────────────────────────
    /// HTTP 401: the key/secret pair was rejected.
    #[error("API key or secret rejected by the firewall (HTTP 401)")]
    Unauthorized,

    /// Any other non-2xx response.
    #[error("Firewall returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Classify a `reqwest` failure for the request that produced it.
    pub(crate) fn from_reqwest(err: &reqwest::Error, url: &str, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_owned(),
                timeout_secs,
            }
        } else if err.is_builder() {
            Self::InvalidEndpoint {
                endpoint: url.to_owned(),
                reason: err.to_string(),
            }
        } else {
            Self::ConnectionFailure {
                url: url.to_owned(),
                reason: err.to_string(),
            }
        }
    }
}

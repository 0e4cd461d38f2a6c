// Shared transport configuration for building reqwest::Client instances.
//
// The firewall API uses two timeouts (short reads, longer writes), so the
// client is built without a global timeout and each request sets its own.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// Default GET timeout.
pub const DEFAULT_GET_TIMEOUT: Duration = Duration::from_secs(5);

/// Default POST timeout.
pub const DEFAULT_POST_TIMEOUT: Duration = Duration::from_secs(10);

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate. The appliance ships a self-signed
    /// certificate, so this is the default.
    #[default]
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub get_timeout: Duration,
    pub post_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::default(),
            get_timeout: DEFAULT_GET_TIMEOUT,
            post_timeout: DEFAULT_POST_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.get_timeout)
            .user_agent(concat!("opnly/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_appliance_expectations() {
        let config = TransportConfig::default();
        assert_eq!(config.get_timeout, Duration::from_secs(5));
        assert_eq!(config.post_timeout, Duration::from_secs(10));
        assert!(matches!(config.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn missing_ca_file_is_a_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/opnly-ca.pem")),
            ..TransportConfig::default()
        };
        assert!(matches!(config.build_client(), Err(Error::Tls(_))));
    }
}

// ── Runtime controller settings ──
//
// How the controller talks to the appliance. Connection parameters come
// from the credential store; these are only the tuning knobs. The CLI
// builds a `ControllerSettings` from its config file and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use opnly_api::transport::{TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Default, since appliances ship self-signed
    /// certificates.
    #[default]
    DangerAcceptInvalid,
}

/// Tuning for a [`Controller`](crate::Controller).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub tls: TlsVerification,
    pub get_timeout: Duration,
    pub post_timeout: Duration,
    /// Interval of the VPN connection-info poll.
    pub poll_interval: Duration,
    /// Concurrent rule fetches during reconciliation.
    pub fetch_concurrency: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            tls: TlsVerification::default(),
            get_timeout: opnly_api::transport::DEFAULT_GET_TIMEOUT,
            post_timeout: opnly_api::transport::DEFAULT_POST_TIMEOUT,
            poll_interval: Duration::from_secs(2),
            fetch_concurrency: 8,
        }
    }
}

impl ControllerSettings {
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            get_timeout: self.get_timeout,
            post_timeout: self.post_timeout,
        }
    }
}

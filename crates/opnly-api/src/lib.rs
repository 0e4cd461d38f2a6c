//! HTTP client for the OPNsense-style firewall REST API.
//!
//! [`FirewallClient`] wraps `reqwest` with Basic auth, per-method timeouts
//! and error classification. Endpoint groups are split into modules by
//! API area; all of them are inherent methods on the client.
//!
//! Remote booleans are normalized into [`RuleState`] as responses are
//! parsed, so callers never see the appliance's mixed encodings.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

mod alias;
mod diagnostics;
mod filter;
mod system;
mod wireguard;

pub use client::FirewallClient;
pub use error::Error;
pub use models::{
    ActionStatus, Alias, AliasSummary, ArpEntry, NetworkAlias, RemoteRule, RuleDetail, RuleState,
};
pub use transport::{TlsMode, TransportConfig};

//! Business logic for opnly.
//!
//! Sits between [`opnly_api`] and the presentation layer: the local SQLite
//! stores (credentials and rule bookmarks), the login gate, rule
//! reconciliation, two-phase toggles, alias editing, the ARP table and the
//! VPN status poll. [`Controller`] ties them together.

pub mod alias;
pub mod arp;
pub mod auth;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod poll;
pub mod reconcile;
pub mod store;
pub mod toggle;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::LoginGate;
pub use command::{Command, CommandResult};
pub use config::{ControllerSettings, TlsVerification};
pub use controller::Controller;
pub use error::CoreError;
pub use poll::{PollUpdate, StatusPoll};
pub use store::{
    ApiCredentials, BookmarkStore, CredentialStore, Database, PasswordUpdate, RuleBookmark,
    UNCHANGED_PASSWORD,
};

pub use model::{
    Alias, AliasSummary, ArpEntry, FlushReport, NetworkAlias, Notice, NoticeLevel,
    OperationKind, ReconcileFailure, RemoteRule, RuleListing, RuleState, RuleView,
    ToggleOutcome,
};

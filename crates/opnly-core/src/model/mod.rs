// ── Domain model ──
//
// Types handed to consumers. Remote shapes (rules, aliases, ARP rows) are
// re-exported from opnly-api where their wire form already is the domain
// form; everything here is built by the core.

mod notice;
mod outcome;
mod rule;

pub use notice::{Notice, NoticeLevel};
pub use outcome::{FlushReport, OperationKind, ToggleOutcome};
pub use rule::{ReconcileFailure, RuleListing, RuleView};

pub use opnly_api::models::{Alias, AliasSummary, ArpEntry, NetworkAlias, RemoteRule, RuleState};

// ── Command API ──
//
// Every remote mutation flows through one `Command` enum and is executed
// by the controller's single command processor, one at a time.

use crate::error::CoreError;
use crate::model::{Alias, FlushReport, ToggleOutcome};

/// A command envelope sent through the command channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All state-changing operations against the appliance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ── Filter rules ─────────────────────────────────────────────────
    ToggleRule { uuid: String },

    // ── WireGuard ────────────────────────────────────────────────────
    SetVpn { enabled: bool },
    ToggleVpn,

    // ── Aliases ──────────────────────────────────────────────────────
    AddAliasEntry { uuid: String, entry: String },
    RemoveAliasEntry { uuid: String, entry: String },

    // ── System ───────────────────────────────────────────────────────
    FlushArp,
    Reboot,
}

/// Result of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Toggled(ToggleOutcome),
    Alias(Alias),
    Flushed(FlushReport),
}

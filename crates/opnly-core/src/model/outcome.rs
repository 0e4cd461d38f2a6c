use serde::Serialize;

use super::{ArpEntry, RuleState};

/// Which state-changing operation produced an outcome.
///
/// Attached by the caller that issued the request, so the status line never
/// depends on the URL that was hit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OperationKind {
    EnableRule,
    DisableRule,
    EnableVpn,
    DisableVpn,
    Reboot,
}

impl OperationKind {
    pub fn for_rule(enable: bool) -> Self {
        if enable { Self::EnableRule } else { Self::DisableRule }
    }

    pub fn for_vpn(enable: bool) -> Self {
        if enable { Self::EnableVpn } else { Self::DisableVpn }
    }

    /// User-facing confirmation.
    pub fn status_line(self) -> &'static str {
        match self {
            Self::EnableRule => "Rule has been enabled",
            Self::DisableRule => "Rule has been disabled",
            Self::EnableVpn => "VPN On!",
            Self::DisableVpn => "VPN Off!",
            Self::Reboot => "Rebooting Please wait",
        }
    }

    /// Short name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::EnableRule => "Enable rule",
            Self::DisableRule => "Disable rule",
            Self::EnableVpn => "Enable VPN",
            Self::DisableVpn => "Disable VPN",
            Self::Reboot => "Reboot",
        }
    }
}

/// A completed state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub kind: OperationKind,
    /// State after the change. `Unknown` for a reboot.
    pub state: RuleState,
    /// The rule that changed, for rule toggles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

impl ToggleOutcome {
    pub fn status_line(&self) -> &'static str {
        self.kind.status_line()
    }
}

/// Result of flushing and re-reading the ARP table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    /// Addresses the appliance reported as deleted.
    pub flushed: Vec<String>,
    /// The table as read right after the flush.
    pub entries: Vec<ArpEntry>,
}

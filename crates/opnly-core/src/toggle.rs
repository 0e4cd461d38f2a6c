// ── Two-phase state changes ──
//
// The appliance stages a change with one call and activates it with a
// second (`toggleRule` + `apply`, `general/set` + `reconfigure`). A failed
// first phase is `MutationFailed` and nothing is committed; a failed
// second phase is `CommitFailed` and is never retried here.

use tracing::{info, warn};

use opnly_api::{ActionStatus, FirewallClient};

use crate::error::CoreError;
use crate::model::{OperationKind, RuleState, ToggleOutcome};

/// Flip a filter rule's enabled flag and apply it.
///
/// A rule that is `Disabled`, or whose flag is unreadable, gets enabled.
pub async fn toggle_rule(client: &FirewallClient, uuid: &str) -> Result<ToggleOutcome, CoreError> {
    let current = client
        .get_rule(uuid)
        .await?
        .ok_or_else(|| CoreError::RuleNotFound {
            uuid: uuid.to_owned(),
        })?;

    let enable = current.state != RuleState::Enabled;
    let kind = OperationKind::for_rule(enable);

    stage(kind, client.toggle_rule(uuid, enable).await)?;
    commit(kind, client.apply_filter().await)?;

    info!(uuid, %kind, "rule state changed");
    Ok(ToggleOutcome {
        kind,
        state: RuleState::from_enabled(enable),
        uuid: Some(uuid.to_owned()),
    })
}

/// Whether the WireGuard service is enabled.
pub async fn vpn_status(client: &FirewallClient) -> Result<RuleState, CoreError> {
    client
        .wireguard_status()
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "WireGuard configuration".into(),
            identifier: "general".into(),
        })
}

/// Enable or disable WireGuard and reconfigure the service.
pub async fn set_vpn(client: &FirewallClient, enable: bool) -> Result<ToggleOutcome, CoreError> {
    let kind = OperationKind::for_vpn(enable);

    stage(kind, client.wireguard_set(enable).await)?;
    commit(kind, client.wireguard_reconfigure().await)?;

    info!(%kind, "VPN state changed");
    Ok(ToggleOutcome {
        kind,
        state: RuleState::from_enabled(enable),
        uuid: None,
    })
}

/// Flip the WireGuard enabled flag.
pub async fn toggle_vpn(client: &FirewallClient) -> Result<ToggleOutcome, CoreError> {
    let current = vpn_status(client).await?;
    set_vpn(client, current != RuleState::Enabled).await
}

/// Reboot the appliance. Single phase.
pub async fn reboot(client: &FirewallClient) -> Result<ToggleOutcome, CoreError> {
    let kind = OperationKind::Reboot;
    stage(kind, client.reboot().await)?;
    info!("reboot requested");
    Ok(ToggleOutcome {
        kind,
        state: RuleState::Unknown,
        uuid: None,
    })
}

/// Check the first phase. Any failure here means nothing changed remotely.
fn stage(
    kind: OperationKind,
    result: Result<ActionStatus, opnly_api::Error>,
) -> Result<(), CoreError> {
    let message = match result {
        Ok(status) if !status.is_failure() => return Ok(()),
        Ok(status) => status.summary(),
        Err(e) => CoreError::from(e).to_string(),
    };
    Err(CoreError::MutationFailed {
        operation: kind.label().into(),
        message,
    })
}

/// Check the commit phase. A failure leaves a staged change behind.
fn commit(
    kind: OperationKind,
    result: Result<ActionStatus, opnly_api::Error>,
) -> Result<(), CoreError> {
    let message = match result {
        Ok(status) if !status.is_failure() => return Ok(()),
        Ok(status) => status.summary(),
        Err(e) => CoreError::from(e).to_string(),
    };
    warn!(%kind, %message, "change staged but not applied");
    Err(CoreError::CommitFailed {
        operation: kind.label().into(),
        message,
    })
}

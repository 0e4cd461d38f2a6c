// ── ARP table ──
//
// Stateless reads. No retries: a failure goes back to the caller.

use tracing::info;

use opnly_api::FirewallClient;

use crate::error::CoreError;
use crate::model::{ArpEntry, FlushReport};

/// Current ARP table.
pub async fn arp_table(client: &FirewallClient) -> Result<Vec<ArpEntry>, CoreError> {
    Ok(client.get_arp().await?)
}

/// Flush the table, then read it again.
pub async fn flush_and_reload(client: &FirewallClient) -> Result<FlushReport, CoreError> {
    let flushed = client.flush_arp().await?;
    info!(count = flushed.len(), "flushed ARP table");
    let entries = client.get_arp().await?;
    Ok(FlushReport { flushed, entries })
}

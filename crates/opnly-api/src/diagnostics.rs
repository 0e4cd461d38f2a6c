// Interface diagnostics endpoints (ARP table)

use serde_json::Value;
use tracing::debug;

use crate::client::FirewallClient;
use crate::error::Error;
use crate::models::{ArpEntry, parse_flushed_addresses};

impl FirewallClient {
    /// Current ARP table.
    ///
    /// `GET /api/diagnostics/interface/getArp`
    pub async fn get_arp(&self) -> Result<Vec<ArpEntry>, Error> {
        let url = self.endpoint("diagnostics/interface/getArp", &[])?;
        let body = self.get_json(url).await?;

        // Older firmware answers a bare array, newer wraps it in `rows`.
        let rows = match body {
            Value::Array(_) => body,
            Value::Object(mut map) => map.remove("rows").unwrap_or(Value::Array(Vec::new())),
            _ => Value::Array(Vec::new()),
        };

        let entries: Vec<ArpEntry> =
            serde_json::from_value(rows.clone()).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: rows.to_string(),
            })?;
        debug!(count = entries.len(), "fetched ARP table");
        Ok(entries)
    }

    /// Flush the ARP table. Returns the addresses the appliance removed.
    ///
    /// `POST /api/diagnostics/interface/flushArp`
    pub async fn flush_arp(&self) -> Result<Vec<String>, Error> {
        let url = self.endpoint("diagnostics/interface/flushArp", &[])?;
        let body = self.post_text(url).await?;
        Ok(parse_flushed_addresses(&body))
    }
}

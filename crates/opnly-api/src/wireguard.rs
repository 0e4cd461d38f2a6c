// WireGuard service endpoints

use serde_json::Value;

use crate::client::FirewallClient;
use crate::error::Error;
use crate::models::{ActionStatus, RuleState, wireguard_general_payload};

impl FirewallClient {
    /// Whether the WireGuard service is enabled. `None` when the appliance
    /// answers without a `general` section (plugin not installed).
    ///
    /// `GET /api/wireguard/general/get`
    pub async fn wireguard_status(&self) -> Result<Option<RuleState>, Error> {
        let url = self.endpoint("wireguard/general/get", &[])?;
        let body = self.get_json(url).await?;
        Ok(body
            .get("general")
            .filter(|g| g.is_object())
            .map(|g| RuleState::from_json(g.get("enabled"))))
    }

    /// Stage the WireGuard enabled flag. Takes effect after
    /// [`wireguard_reconfigure`](Self::wireguard_reconfigure).
    ///
    /// `POST /api/wireguard/general/set`
    pub async fn wireguard_set(&self, enabled: bool) -> Result<ActionStatus, Error> {
        let url = self.endpoint("wireguard/general/set", &[])?;
        let payload = wireguard_general_payload(enabled);
        let body = self.post_json(url, Some(&payload)).await?;
        Ok(ActionStatus::from_json(&body))
    }

    /// Restart WireGuard with the saved configuration.
    ///
    /// `POST /api/wireguard/service/reconfigure`
    pub async fn wireguard_reconfigure(&self) -> Result<ActionStatus, Error> {
        let url = self.endpoint("wireguard/service/reconfigure", &[])?;
        let body = self.post_json(url, None).await?;
        Ok(ActionStatus::from_json(&body))
    }

    /// Connection info as printed by `wg show`.
    ///
    /// `POST /api/wireguard/service/showconf`
    pub async fn wireguard_showconf(&self) -> Result<String, Error> {
        let url = self.endpoint("wireguard/service/showconf", &[])?;
        let body = self.post_json(url, None).await?;
        Ok(match body {
            Value::Null => String::new(),
            Value::String(text) => text,
            Value::Object(ref map) => match map.get("response") {
                Some(Value::String(text)) => text.clone(),
                _ => serde_json::to_string_pretty(&body).unwrap_or_default(),
            },
            other => other.to_string(),
        })
    }
}

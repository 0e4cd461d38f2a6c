// Firewall filter rule endpoints
//
// Rule search, detail, toggle and the apply (commit) step that makes a
// staged toggle take effect.

use tracing::debug;

use crate::client::FirewallClient;
use crate::error::Error;
use crate::models::{ActionStatus, RemoteRule, RuleDetail, SearchPage};

impl FirewallClient {
    /// List every filter rule on the appliance.
    ///
    /// `GET /api/firewall/filter/searchRule`
    pub async fn search_rules(&self) -> Result<Vec<RemoteRule>, Error> {
        let url = self.endpoint("firewall/filter/searchRule", &[])?;
        let body = self.get_json(url).await?;
        let page: SearchPage<RemoteRule> =
            serde_json::from_value(body.clone()).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.to_string(),
            })?;
        debug!(count = page.rows.len(), "fetched filter rules");
        Ok(page.rows)
    }

    /// Fetch one rule. `None` when the appliance has no rule with that uuid.
    ///
    /// `GET /api/firewall/filter/getRule/{uuid}`
    pub async fn get_rule(&self, uuid: &str) -> Result<Option<RuleDetail>, Error> {
        let url = self.endpoint("firewall/filter/getRule", &[uuid])?;
        let body = self.get_json(url).await?;
        Ok(RuleDetail::from_response(&body))
    }

    /// Stage a rule's enabled flag. Takes effect after [`apply_filter`].
    ///
    /// `POST /api/firewall/filter/toggleRule/{uuid}/{0|1}`
    ///
    /// [`apply_filter`]: Self::apply_filter
    pub async fn toggle_rule(&self, uuid: &str, enable: bool) -> Result<ActionStatus, Error> {
        let flag = if enable { "1" } else { "0" };
        let url = self.endpoint("firewall/filter/toggleRule", &[uuid, flag])?;
        let body = self.post_json(url, None).await?;
        Ok(ActionStatus::from_json(&body))
    }

    /// Commit staged filter changes.
    ///
    /// `POST /api/firewall/filter/apply`
    pub async fn apply_filter(&self) -> Result<ActionStatus, Error> {
        let url = self.endpoint("firewall/filter/apply", &[])?;
        let body = self.post_json(url, None).await?;
        Ok(ActionStatus::from_json(&body))
    }
}

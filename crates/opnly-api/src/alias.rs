// Firewall alias endpoints
//
// The appliance has no incremental append: `setItem` replaces the whole
// alias, so writes always send the full definition read by `getItem`.

use tracing::debug;

use crate::client::FirewallClient;
use crate::error::Error;
use crate::models::{ActionStatus, Alias, AliasSummary, NetworkAlias, SearchPage};

impl FirewallClient {
    /// `GET /api/firewall/alias/searchItem`
    pub async fn search_aliases(&self) -> Result<Vec<AliasSummary>, Error> {
        let url = self.endpoint("firewall/alias/searchItem", &[])?;
        let body = self.get_json(url).await?;
        let page: SearchPage<AliasSummary> =
            serde_json::from_value(body.clone()).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.to_string(),
            })?;
        debug!(count = page.rows.len(), "fetched aliases");
        Ok(page.rows)
    }

    /// Aliases usable as network sources or destinations.
    ///
    /// `GET /api/firewall/alias/listNetworkAliases`
    pub async fn list_network_aliases(&self) -> Result<Vec<NetworkAlias>, Error> {
        let url = self.endpoint("firewall/alias/listNetworkAliases", &[])?;
        let body = self.get_json(url).await?;
        Ok(NetworkAlias::list_from_response(&body))
    }

    /// Full alias definition. `None` for an unknown uuid.
    ///
    /// `GET /api/firewall/alias/getItem/{uuid}`
    pub async fn get_alias(&self, uuid: &str) -> Result<Option<Alias>, Error> {
        let url = self.endpoint("firewall/alias/getItem", &[uuid])?;
        let body = self.get_json(url).await?;
        Ok(Alias::from_item(uuid, &body))
    }

    /// Replace an alias with `alias`.
    ///
    /// `POST /api/firewall/alias/setItem/{uuid}`
    pub async fn set_alias(&self, alias: &Alias) -> Result<ActionStatus, Error> {
        let url = self.endpoint("firewall/alias/setItem", &[&alias.uuid])?;
        let payload = alias.to_payload();
        let body = self.post_json(url, Some(&payload)).await?;
        Ok(ActionStatus::from_json(&body))
    }
}

// System-level endpoints

use crate::client::FirewallClient;
use crate::error::Error;
use crate::models::ActionStatus;

impl FirewallClient {
    /// Check that the appliance is reachable and accepts the credentials.
    ///
    /// `POST /api/core/menu/search`
    pub async fn probe(&self) -> Result<(), Error> {
        let url = self.endpoint("core/menu/search", &[])?;
        self.post_json(url, None).await?;
        Ok(())
    }

    /// `POST /api/core/system/reboot/`
    pub async fn reboot(&self) -> Result<ActionStatus, Error> {
        let url = self.endpoint("core/system/reboot/", &[])?;
        let body = self.post_json(url, None).await?;
        Ok(ActionStatus::from_json(&body))
    }
}

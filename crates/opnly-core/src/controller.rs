// ── Controller ──
//
// Facade over the local stores and the remote client. Reads go straight
// to the appliance; mutations are queued on a bounded channel and run one
// at a time by a single processor task, which serializes alias edits and
// two-phase toggles within the process.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use opnly_api::FirewallClient;

use crate::alias;
use crate::arp;
use crate::auth::LoginGate;
use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::ControllerSettings;
use crate::error::CoreError;
use crate::model::{
    Alias, AliasSummary, ArpEntry, FlushReport, NetworkAlias, ReconcileFailure, RemoteRule,
    RuleListing, RuleState, RuleView, ToggleOutcome,
};
use crate::poll::StatusPoll;
use crate::reconcile;
use crate::store::{
    ApiCredentials, BookmarkStore, CredentialStore, Database, PasswordUpdate, RuleBookmark,
};
use crate::toggle;

const COMMAND_CHANNEL_SIZE: usize = 16;

/// Entry point for consumers. Cheaply cloneable.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    settings: ControllerSettings,
    credentials: CredentialStore,
    bookmarks: BookmarkStore,
    /// Built from the stored credentials; swapped when they change.
    client: ArcSwapOption<FirewallClient>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a controller over `db`. No network traffic happens here.
    ///
    /// Stored credentials that cannot form a valid client are logged and
    /// treated as absent, so setup can overwrite them.
    pub fn new(db: &Database, settings: ControllerSettings) -> Result<Self, CoreError> {
        let credentials = db.credentials();
        let client = match credentials.get()? {
            Some(ref creds) => match build_client(creds, &settings) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    warn!(error = %e, "stored credentials are unusable");
                    None
                }
            },
            None => None,
        };

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Ok(Self {
            inner: Arc::new(ControllerInner {
                settings,
                credentials,
                bookmarks: db.bookmarks(),
                client: ArcSwapOption::new(client),
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.inner.settings
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.inner.bookmarks
    }

    pub fn login_gate(&self) -> LoginGate {
        LoginGate::new(self.inner.credentials.clone())
    }

    /// Whether a usable client is loaded.
    pub fn is_configured(&self) -> bool {
        self.inner.client.load().is_some()
    }

    /// The current client, or `NotConfigured`.
    pub fn client(&self) -> Result<Arc<FirewallClient>, CoreError> {
        self.inner.client.load_full().ok_or(CoreError::NotConfigured)
    }

    /// Validate and store credentials, then switch to a client built from
    /// them.
    pub fn save_credentials(
        &self,
        key: &str,
        secret: &SecretString,
        host: &str,
        port: u16,
        password: &PasswordUpdate,
    ) -> Result<(), CoreError> {
        // Reject an unusable address before anything is written.
        if !host.trim().is_empty() && port != 0 {
            FirewallClient::base_url_for(host, port)?;
        }
        self.inner
            .credentials
            .save(key, secret, host, port, password)?;

        let stored = self
            .inner
            .credentials
            .get()?
            .ok_or_else(|| CoreError::Internal("credentials vanished after save".into()))?;
        let client = build_client(&stored, &self.inner.settings)?;
        self.inner.client.store(Some(Arc::new(client)));
        debug!("firewall client rebuilt from new credentials");
        Ok(())
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the command processor. Idempotent; [`execute`](Self::execute)
    /// calls it on first use.
    pub async fn start(&self) {
        let Some(rx) = self.inner.command_rx.lock().await.take() else {
            return;
        };
        let ctrl = self.clone();
        self.inner
            .task_handles
            .lock()
            .await
            .push(tokio::spawn(command_processor_task(ctrl, rx)));
        debug!("command processor started");
    }

    /// Stop background tasks and wait for them to exit. Queued commands
    /// that have not started are answered with `ControllerStopped`.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("controller stopped");
    }

    /// Queue a command and wait for its result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ControllerStopped);
        }
        self.start().await;

        let (tx, rx) = tokio::sync::oneshot::channel();
        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ControllerStopped)?;

        rx.await.map_err(|_| CoreError::ControllerStopped)?
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Check that the appliance is reachable with the stored credentials.
    pub async fn probe(&self) -> Result<(), CoreError> {
        self.client()?.probe().await?;
        info!("firewall reachable");
        Ok(())
    }

    /// Every bookmark with its live state, in bookmark order.
    ///
    /// Without credentials every row is `Unknown` and the failure is
    /// `NotConfigured`.
    pub async fn list_rules(&self) -> Result<RuleListing, CoreError> {
        let bookmarks = self.inner.bookmarks.list()?;
        match self.client() {
            Ok(client) => Ok(reconcile::reconcile(
                &client,
                bookmarks,
                self.inner.settings.fetch_concurrency,
            )
            .await),
            Err(e) => Ok(unreachable_listing(bookmarks, e)),
        }
    }

    /// All filter rules on the appliance, bookmarked or not.
    pub async fn remote_rules(&self) -> Result<Vec<RemoteRule>, CoreError> {
        Ok(self.client()?.search_rules().await?)
    }

    pub async fn vpn_status(&self) -> Result<RuleState, CoreError> {
        let client = self.client()?;
        toggle::vpn_status(&client).await
    }

    /// WireGuard connection info, fetched once.
    pub async fn vpn_info(&self) -> Result<String, CoreError> {
        Ok(self.client()?.wireguard_showconf().await?)
    }

    /// Start polling the WireGuard connection info.
    pub fn watch_vpn(&self) -> Result<StatusPoll, CoreError> {
        StatusPoll::spawn(self.client()?, self.inner.settings.poll_interval)
    }

    pub async fn aliases(&self) -> Result<Vec<AliasSummary>, CoreError> {
        Ok(self.client()?.search_aliases().await?)
    }

    pub async fn network_aliases(&self) -> Result<Vec<NetworkAlias>, CoreError> {
        Ok(self.client()?.list_network_aliases().await?)
    }

    pub async fn alias(&self, uuid: &str) -> Result<Alias, CoreError> {
        let client = self.client()?;
        alias::load(&client, uuid).await
    }

    pub async fn arp_table(&self) -> Result<Vec<ArpEntry>, CoreError> {
        let client = self.client()?;
        arp::arp_table(&client).await
    }

    // ── Mutations (queued) ───────────────────────────────────────────

    pub async fn toggle_rule(&self, uuid: &str) -> Result<ToggleOutcome, CoreError> {
        let result = self
            .execute(Command::ToggleRule {
                uuid: uuid.to_owned(),
            })
            .await?;
        expect_toggled(result)
    }

    pub async fn set_vpn(&self, enabled: bool) -> Result<ToggleOutcome, CoreError> {
        expect_toggled(self.execute(Command::SetVpn { enabled }).await?)
    }

    pub async fn toggle_vpn(&self) -> Result<ToggleOutcome, CoreError> {
        expect_toggled(self.execute(Command::ToggleVpn).await?)
    }

    pub async fn reboot(&self) -> Result<ToggleOutcome, CoreError> {
        expect_toggled(self.execute(Command::Reboot).await?)
    }

    pub async fn add_alias_entry(&self, uuid: &str, entry: &str) -> Result<Alias, CoreError> {
        let result = self
            .execute(Command::AddAliasEntry {
                uuid: uuid.to_owned(),
                entry: entry.to_owned(),
            })
            .await?;
        expect_alias(result)
    }

    pub async fn remove_alias_entry(&self, uuid: &str, entry: &str) -> Result<Alias, CoreError> {
        let result = self
            .execute(Command::RemoveAliasEntry {
                uuid: uuid.to_owned(),
                entry: entry.to_owned(),
            })
            .await?;
        expect_alias(result)
    }

    pub async fn flush_arp(&self) -> Result<FlushReport, CoreError> {
        match self.execute(Command::FlushArp).await? {
            CommandResult::Flushed(report) => Ok(report),
            other => Err(unexpected(&other)),
        }
    }
}

fn build_client(
    creds: &ApiCredentials,
    settings: &ControllerSettings,
) -> Result<FirewallClient, CoreError> {
    let base_url = FirewallClient::base_url_for(&creds.host, creds.port)?;
    let secret = SecretString::from(creds.secret.expose_secret().to_owned());
    Ok(FirewallClient::new(
        base_url,
        creds.key.clone(),
        secret,
        &settings.transport(),
    )?)
}

fn unreachable_listing(bookmarks: Vec<RuleBookmark>, err: CoreError) -> RuleListing {
    let fetched_at = chrono::Utc::now();
    let failed = bookmarks.len();
    let rows = bookmarks
        .into_iter()
        .map(|bookmark| RuleView {
            bookmark,
            state: RuleState::Unknown,
            fetched_at,
        })
        .collect();
    RuleListing {
        rows,
        failure: (failed > 0).then_some(ReconcileFailure { first: err, failed }),
    }
}

fn expect_toggled(result: CommandResult) -> Result<ToggleOutcome, CoreError> {
    match result {
        CommandResult::Toggled(outcome) => Ok(outcome),
        other => Err(unexpected(&other)),
    }
}

fn expect_alias(result: CommandResult) -> Result<Alias, CoreError> {
    match result {
        CommandResult::Alias(alias) => Ok(alias),
        other => Err(unexpected(&other)),
    }
}

fn unexpected(result: &CommandResult) -> CoreError {
    CoreError::Internal(format!("unexpected command result: {result:?}"))
}

// ── Background tasks ─────────────────────────────────────────────────

/// Run queued commands one at a time until cancelled.
async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let client = controller.client()?;
    debug!(?cmd, "executing command");

    match cmd {
        Command::ToggleRule { uuid } => toggle::toggle_rule(&client, &uuid)
            .await
            .map(CommandResult::Toggled),
        Command::SetVpn { enabled } => toggle::set_vpn(&client, enabled)
            .await
            .map(CommandResult::Toggled),
        Command::ToggleVpn => toggle::toggle_vpn(&client)
            .await
            .map(CommandResult::Toggled),
        Command::AddAliasEntry { uuid, entry } => alias::add_entry(&client, &uuid, &entry)
            .await
            .map(CommandResult::Alias),
        Command::RemoveAliasEntry { uuid, entry } => alias::remove_entry(&client, &uuid, &entry)
            .await
            .map(CommandResult::Alias),
        Command::FlushArp => arp::flush_and_reload(&client)
            .await
            .map(CommandResult::Flushed),
        Command::Reboot => toggle::reboot(&client).await.map(CommandResult::Toggled),
    }
}

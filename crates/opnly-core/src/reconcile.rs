// ── Rule reconciliation ──
//
// Merges the local bookmarks with the live enabled state of each rule.
// Fetches run concurrently but results keep bookmark order, and the
// listing is only returned once every fetch has finished.

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use opnly_api::FirewallClient;

use crate::error::CoreError;
use crate::model::{ReconcileFailure, RuleListing, RuleState, RuleView};
use crate::store::RuleBookmark;

type Fetched = (RuleBookmark, Result<RuleState, CoreError>, DateTime<Utc>);

/// Fetch the live state of every bookmark.
///
/// Never fails as a whole: a bookmark whose fetch fails is listed as
/// `Unknown`, and the failures are summarized once in
/// [`RuleListing::failure`].
pub async fn reconcile(
    client: &FirewallClient,
    bookmarks: Vec<RuleBookmark>,
    concurrency: usize,
) -> RuleListing {
    let total = bookmarks.len();

    let fetched: Vec<Fetched> = stream::iter(bookmarks)
        .map(|bookmark| async move {
            let state = fetch_state(client, &bookmark.uuid).await;
            (bookmark, state, Utc::now())
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut failure: Option<ReconcileFailure> = None;
    let rows = fetched
        .into_iter()
        .map(|(bookmark, result, fetched_at)| {
            let state = result.unwrap_or_else(|err| {
                match failure {
                    Some(ref mut f) => f.failed += 1,
                    None => {
                        failure = Some(ReconcileFailure {
                            first: err,
                            failed: 1,
                        });
                    }
                }
                RuleState::Unknown
            });
            RuleView {
                bookmark,
                state,
                fetched_at,
            }
        })
        .collect();

    if let Some(ref f) = failure {
        warn!(
            failed = f.failed,
            total,
            error = %f.first,
            "could not fetch the state of some bookmarked rules"
        );
    } else {
        debug!(total, "reconciled bookmarked rules");
    }

    RuleListing { rows, failure }
}

async fn fetch_state(client: &FirewallClient, uuid: &str) -> Result<RuleState, CoreError> {
    let detail = client.get_rule(uuid).await?;
    Ok(detail.map_or(RuleState::Unknown, |d| d.state))
}

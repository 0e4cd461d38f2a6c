use chrono::{DateTime, Utc};
use serde::Serialize;

use super::RuleState;
use crate::error::CoreError;
use crate::store::RuleBookmark;

/// One bookmark merged with the rule's live state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleView {
    #[serde(flatten)]
    pub bookmark: RuleBookmark,
    pub state: RuleState,
    /// When the state was fetched. Set for every row, including failed
    /// fetches.
    pub fetched_at: DateTime<Utc>,
}

/// Summary of the fetches that failed during one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileFailure {
    /// The first error encountered, in bookmark order.
    pub first: CoreError,
    /// How many bookmarks could not be fetched.
    pub failed: usize,
}

/// Result of reconciling every bookmark with the appliance.
///
/// Always holds one row per bookmark in store order; failed fetches show
/// up as `Unknown` rows plus a single [`ReconcileFailure`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleListing {
    pub rows: Vec<RuleView>,
    pub failure: Option<ReconcileFailure>,
}

impl RuleListing {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

use serde::Serialize;

use super::ToggleOutcome;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-facing notification for an outcome or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub text: String,
    pub level: NoticeLevel,
}

impl From<&ToggleOutcome> for Notice {
    fn from(outcome: &ToggleOutcome) -> Self {
        Self {
            title: "Success".into(),
            text: outcome.status_line().into(),
            level: NoticeLevel::Info,
        }
    }
}

impl From<&CoreError> for Notice {
    fn from(err: &CoreError) -> Self {
        let (title, level) = match err {
            CoreError::ConnectionFailure { .. } => ("Connection failed", NoticeLevel::Error),
            CoreError::Timeout { .. } => ("Request timed out", NoticeLevel::Error),
            CoreError::InvalidEndpoint { .. } => ("Invalid firewall address", NoticeLevel::Error),
            CoreError::Unauthorized => ("Access denied", NoticeLevel::Error),
            CoreError::RemoteError { .. } => ("Firewall error", NoticeLevel::Error),
            CoreError::RuleNotFound { .. } | CoreError::NotFound { .. } => {
                ("Not found", NoticeLevel::Warning)
            }
            CoreError::ValidationError { .. } => ("Invalid input", NoticeLevel::Warning),
            CoreError::MutationFailed { .. } => ("Change failed", NoticeLevel::Error),
            // Remote state already changed.
            CoreError::CommitFailed { .. } => ("Change not applied", NoticeLevel::Warning),
            CoreError::NotConfigured => ("Setup required", NoticeLevel::Info),
            CoreError::ControllerStopped | CoreError::Storage(_) | CoreError::Internal(_) => {
                ("Error", NoticeLevel::Error)
            }
        };

        let mut text = err.to_string();
        if err.is_partial() {
            text.push_str(". The change is staged on the firewall but not active yet.");
        }

        Self {
            title: title.into(),
            text,
            level,
        }
    }
}

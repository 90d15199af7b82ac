pub mod sanitize;
pub mod store;
pub mod autosave;

pub use autosave::{Autosaver, DraftSink};
pub use sanitize::{sanitize_draft, sanitize_form};
pub use store::DraftStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ReportFormData;

/// An unsaved in-progress report, held per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    pub user_id: String,
    /// Wizard step the user was on, 1..=4.
    pub step: u8,
    pub data: ReportFormData,
    pub saved_at: DateTime<Utc>,
}

impl ReportDraft {
    pub fn new(user_id: &str, step: u8, data: ReportFormData) -> Self {
        Self {
            user_id: user_id.to_string(),
            step: step.clamp(1, 4),
            data,
            saved_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.saved_at > ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_step() {
        assert_eq!(ReportDraft::new("u", 0, ReportFormData::default()).step, 1);
        assert_eq!(ReportDraft::new("u", 9, ReportFormData::default()).step, 4);
    }

    #[test]
    fn test_expiry_boundary() {
        let mut draft = ReportDraft::new("u", 1, ReportFormData::default());
        let now = Utc::now();
        let ttl = chrono::Duration::hours(24);
        draft.saved_at = now - chrono::Duration::hours(24);
        assert!(!draft.is_expired(now, ttl));
        draft.saved_at = now - chrono::Duration::hours(24) - chrono::Duration::seconds(1);
        assert!(draft.is_expired(now, ttl));
    }
}

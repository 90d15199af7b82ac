use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use data_encoding::HEXLOWER;
use tracing::{debug, info, warn};

use crate::errors::RoofdeskError;
use super::{sanitize_draft, ReportDraft};

const KEY_PREFIX: &str = "report_draft_";

/// Keeps the encoded file name under common 255-byte name limits.
const MAX_USER_ID_BYTES: usize = 100;

/// File-backed draft storage, one JSON document per user.
#[derive(Debug, Clone)]
pub struct DraftStore {
    dir: PathBuf,
    ttl: chrono::Duration,
}

impl DraftStore {
    pub fn new(dir: impl Into<PathBuf>, ttl: chrono::Duration) -> Self {
        Self { dir: dir.into(), ttl }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Storage path for `user_id`. The id is hex-encoded, so distinct ids
    /// never share a file and no id can name a path outside the directory.
    pub fn path_for(&self, user_id: &str) -> Result<PathBuf, RoofdeskError> {
        if user_id.is_empty() || user_id.len() > MAX_USER_ID_BYTES {
            return Err(RoofdeskError::BadRequest(format!("Unusable user id for draft: {user_id:?}")));
        }
        let key = HEXLOWER.encode(user_id.as_bytes());
        Ok(self.dir.join(format!("{KEY_PREFIX}{key}.json")))
    }

    pub async fn save(&self, draft: &ReportDraft) -> Result<(), RoofdeskError> {
        let path = self.path_for(&draft.user_id)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write then rename so a reader never sees half a document
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec(draft)?;
        tokio::fs::write(&tmp, &body).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(user_id = %draft.user_id, step = draft.step, bytes = body.len(), "Draft saved");
        Ok(())
    }

    pub async fn load(&self, user_id: &str) -> Result<Option<ReportDraft>, RoofdeskError> {
        self.load_at(user_id, Utc::now()).await
    }

    /// Load the draft for `user_id` as of `now`. Expired or unreadable
    /// drafts are removed and reported as absent.
    pub async fn load_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<ReportDraft>, RoofdeskError> {
        let path = self.path_for(user_id)?;
        let content = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let draft = serde_json::from_slice::<serde_json::Value>(&content)
            .ok()
            .and_then(sanitize_draft);

        let Some(draft) = draft else {
            warn!(user_id, path = %path.display(), "Discarding unreadable draft");
            self.remove(user_id).await?;
            return Ok(None);
        };

        if draft.user_id != user_id {
            warn!(user_id, stored = %draft.user_id, "Draft belongs to another user, ignoring");
            return Ok(None);
        }

        if draft.is_expired(now, self.ttl) {
            info!(user_id, saved_at = %draft.saved_at, "Draft expired, removing");
            self.remove(user_id).await?;
            return Ok(None);
        }

        Ok(Some(draft))
    }

    /// Remove the stored draft. Returns whether one existed.
    pub async fn remove(&self, user_id: &str) -> Result<bool, RoofdeskError> {
        let path = self.path_for(user_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::api::scope::Caller;
use crate::api::AppState;
use crate::errors::RoofdeskError;
use crate::storage::{issue_image_key, snapshot_key, ImageKind, StoredObject};
use super::reports::load_report;

fn image_kind(headers: &HeaderMap) -> Result<ImageKind, RoofdeskError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    ImageKind::from_content_type(content_type)
}

fn check_size(state: &AppState, body: &Bytes) -> Result<(), RoofdeskError> {
    if body.is_empty() {
        return Err(RoofdeskError::BadRequest("Empty upload".into()));
    }
    let limit = state.config.storage.max_upload_bytes;
    if body.len() > limit {
        return Err(RoofdeskError::BadRequest(format!("Upload exceeds the {} byte limit", limit)));
    }
    Ok(())
}

/// Store a photo and append its key to the issue's image list.
pub async fn upload_issue_image(
    State(state): State<AppState>,
    caller: Caller,
    Path((report_id, issue_id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<StoredObject>), RoofdeskError> {
    let kind = image_kind(&headers)?;
    check_size(&state, &body)?;

    let mut report = load_report(&state, &caller, &report_id)?;
    if report.issue_mut(&issue_id).is_none() {
        return Err(RoofdeskError::NotFound(format!("issue {}", issue_id)));
    }

    let key = issue_image_key(&caller.branch_id, &report_id, &issue_id, kind)?;
    let stored = state.objects.put(&key, &body, kind.content_type()).await?;

    if let Some(issue) = report.issue_mut(&issue_id) {
        issue.images.push(stored.key.clone());
    }
    report.last_edited = Utc::now();
    state.db.save_report(&report)?;

    info!(report_id = %report_id, issue_id = %issue_id, key = %stored.key, size = stored.size, "Issue image stored");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Store the map snapshot of the roof outline, replacing any previous one.
pub async fn upload_snapshot(
    State(state): State<AppState>,
    caller: Caller,
    Path(report_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<StoredObject>), RoofdeskError> {
    let kind = image_kind(&headers)?;
    check_size(&state, &body)?;

    let mut report = load_report(&state, &caller, &report_id)?;
    let key = snapshot_key(&caller.branch_id, &report_id, kind)?;
    let stored = state.objects.put(&key, &body, kind.content_type()).await?;

    if let Some(previous) = report.roof_snapshot.replace(stored.key.clone()) {
        if let Err(e) = state.objects.delete(&previous).await {
            warn!(key = %previous, error = %e, "Failed to delete previous snapshot");
        }
    }
    report.last_edited = Utc::now();
    state.db.save_report(&report)?;

    info!(report_id = %report_id, key = %stored.key, "Roof snapshot stored");
    Ok((StatusCode::CREATED, Json(stored)))
}

use axum::extract::rejection::JsonRejection;
use axum::body::Bytes;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::api::errors::bad_json;
use crate::api::models::{DraftRequest, DraftSaveResponse, SubmitDraftRequest};
use crate::api::scope::Caller;
use crate::api::AppState;
use crate::drafts::ReportDraft;
use crate::errors::RoofdeskError;
use crate::models::{Report, ReportStatus};
use super::reports::persist_new_report;

fn draft_from_request(caller: &Caller, req: DraftRequest) -> ReportDraft {
    ReportDraft::new(&caller.user_id, req.step, req.data)
}

pub async fn load_draft(State(state): State<AppState>, caller: Caller) -> Result<Json<Value>, RoofdeskError> {
    let draft = state.drafts.load(&caller.user_id).await?;
    Ok(Json(json!({ "draft": draft })))
}

/// Debounced save: the draft is written once the caller stops sending changes.
pub async fn save_draft(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<DraftRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DraftSaveResponse>), RoofdeskError> {
    let Json(req) = payload.map_err(bad_json)?;
    let draft = draft_from_request(&caller, req);
    state.autosaver_for(&caller.user_id).schedule(draft);

    Ok((
        StatusCode::ACCEPTED,
        Json(DraftSaveResponse {
            scheduled: true,
            debounce_ms: state.config.drafts.autosave_debounce_ms,
        }),
    ))
}

pub async fn flush_draft(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<DraftRequest>, JsonRejection>,
) -> Result<Json<Value>, RoofdeskError> {
    let Json(req) = payload.map_err(bad_json)?;
    let draft = draft_from_request(&caller, req);
    let saved = state.autosaver_for(&caller.user_id).flush(&draft).await?;
    Ok(Json(json!({ "saved": saved, "savedAt": draft.saved_at })))
}

pub async fn discard_draft(State(state): State<AppState>, caller: Caller) -> Result<Json<Value>, RoofdeskError> {
    state.release_autosaver(&caller.user_id).await;
    let discarded = state.drafts.remove(&caller.user_id).await?;
    Ok(Json(json!({ "discarded": discarded })))
}

/// Turn the caller's draft into a report and discard the draft.
pub async fn submit_draft(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<(StatusCode, Json<Report>), RoofdeskError> {
    // An empty body submits the stored draft as completed
    let req: SubmitDraftRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SubmitDraftRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| RoofdeskError::BadRequest(format!("Invalid submit body: {e}")))?
    };

    let form = match req.data {
        Some(data) => data,
        None => {
            state
                .drafts
                .load(&caller.user_id)
                .await?
                .ok_or_else(|| RoofdeskError::NotFound("No draft to submit".into()))?
                .data
        }
    };

    let status = match req.status.unwrap_or(ReportStatus::Completed) {
        s @ (ReportStatus::Draft | ReportStatus::Completed) => s,
        other => {
            return Err(RoofdeskError::BadRequest(format!(
                "A submitted draft can only become draft or completed, not {}",
                other
            )))
        }
    };

    let report = persist_new_report(&state, &caller, form, status)?;

    state.release_autosaver(&caller.user_id).await;
    state.drafts.remove(&caller.user_id).await?;
    info!(report_id = %report.id, user_id = %caller.user_id, "Draft submitted");

    Ok((StatusCode::CREATED, Json(report)))
}

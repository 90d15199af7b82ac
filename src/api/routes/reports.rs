use axum::extract::rejection::JsonRejection;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::api::errors::bad_json;
use crate::api::models::{CreateReportRequest, ExportQuery, ListReportsQuery, StatusUpdateRequest};
use crate::api::scope::Caller;
use crate::api::AppState;
use crate::db::ReportFilter;
use crate::errors::RoofdeskError;
use crate::models::{Report, ReportFormData, ReportStatus};
use crate::reporting::{export_report as render_export, ExportFormat};
use crate::validation::{validate_step, WizardStep};

pub(crate) fn load_report(state: &AppState, caller: &Caller, id: &str) -> Result<Report, RoofdeskError> {
    state
        .db
        .get_report(&caller.branch_id, id)?
        .ok_or_else(|| RoofdeskError::NotFound(format!("report {}", id)))
}

/// Validate a full form and persist it as a new report.
pub(crate) fn persist_new_report(
    state: &AppState,
    caller: &Caller,
    form: ReportFormData,
    status: ReportStatus,
) -> Result<Report, RoofdeskError> {
    validate_step(WizardStep::Review, &form).into_result()?;
    let report = form.into_report(&caller.branch_id, &caller.user_id, status, Utc::now())?;
    state.db.insert_report(&report)?;
    info!(report_id = %report.id, branch_id = %caller.branch_id, status = %report.status, "Report created");
    state.notifier.report_status_changed(&report);
    Ok(report)
}

pub async fn list_reports(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<Value>, RoofdeskError> {
    let status = query
        .status
        .as_deref()
        .map(|s| s.parse::<ReportStatus>().map_err(RoofdeskError::BadRequest))
        .transpose()?;

    let filter = ReportFilter {
        status,
        include_archived: query.include_archived.unwrap_or(false),
        limit: query.limit.unwrap_or(50).min(200),
        offset: query.offset.unwrap_or(0),
    };
    let reports = state.db.list_reports(&caller.branch_id, &filter)?;
    let total = state.db.count_reports(&caller.branch_id, &filter)?;
    Ok(Json(json!({
        "reports": reports,
        "total": total,
        "limit": filter.limit,
        "offset": filter.offset,
    })))
}

pub async fn create_report(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<CreateReportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Report>), RoofdeskError> {
    let Json(req) = payload.map_err(bad_json)?;
    let report = persist_new_report(&state, &caller, req.form, req.status.unwrap_or_default())?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn get_report(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Report>, RoofdeskError> {
    load_report(&state, &caller, &id).map(Json)
}

pub async fn update_report(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<ReportFormData>, JsonRejection>,
) -> Result<Json<Report>, RoofdeskError> {
    let Json(form) = payload.map_err(bad_json)?;
    validate_step(WizardStep::Review, &form).into_result()?;

    let mut report = load_report(&state, &caller, &id)?;
    report.apply_form(form, Utc::now())?;
    state.db.save_report(&report)?;
    info!(report_id = %id, "Report updated");
    Ok(Json(report))
}

pub async fn set_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Json<Report>, RoofdeskError> {
    let Json(req) = payload.map_err(bad_json)?;
    let report = state
        .db
        .set_report_status(&caller.branch_id, &id, req.status, Utc::now())?
        .ok_or_else(|| RoofdeskError::NotFound(format!("report {}", id)))?;

    info!(report_id = %id, status = %report.status, "Report status changed");
    state.notifier.report_status_changed(&report);
    Ok(Json(report))
}

pub async fn archive_report(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Report>, RoofdeskError> {
    let report = state
        .db
        .archive_report(&caller.branch_id, &id, Utc::now())?
        .ok_or_else(|| RoofdeskError::NotFound(format!("report {}", id)))?;
    info!(report_id = %id, "Report archived");
    Ok(Json(report))
}

pub async fn export_report(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, RoofdeskError> {
    let format: ExportFormat = query.format.as_deref().unwrap_or("html").parse()?;
    let report = load_report(&state, &caller, &id)?;
    let branch = state.db.get_branch(&caller.branch_id)?;

    let body = render_export(&report, branch.as_ref(), format, &state.config.offers.currency);
    let disposition = format!("inline; filename=\"report-{}.{}\"", report.id, format.extension());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

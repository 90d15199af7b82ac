use axum::extract::rejection::JsonRejection;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::api::errors::bad_json;
use crate::api::models::RespondRequest;
use crate::api::scope::Caller;
use crate::api::AppState;
use crate::errors::RoofdeskError;
use crate::models::Offer;
use crate::offers;

pub async fn create_offer(
    State(state): State<AppState>,
    caller: Caller,
    Path(report_id): Path<String>,
) -> Result<(StatusCode, Json<Offer>), RoofdeskError> {
    let offer = offers::create_offer(
        &state.db,
        &state.notifier,
        &caller.branch_id,
        &report_id,
        &state.config.offers,
        Utc::now(),
    )?;
    Ok((StatusCode::CREATED, Json(offer)))
}

pub async fn get_offer(
    State(state): State<AppState>,
    caller: Caller,
    Path(report_id): Path<String>,
) -> Result<Json<Offer>, RoofdeskError> {
    let offer = state
        .db
        .get_offer_for_report(&caller.branch_id, &report_id)?
        .ok_or_else(|| RoofdeskError::NotFound(format!("offer for report {}", report_id)))?;
    Ok(Json(offers::with_effective_status(offer, Utc::now().date_naive())))
}

pub async fn respond(
    State(state): State<AppState>,
    caller: Caller,
    Path(offer_id): Path<String>,
    payload: Result<Json<RespondRequest>, JsonRejection>,
) -> Result<Json<Offer>, RoofdeskError> {
    let Json(req) = payload.map_err(bad_json)?;
    let offer = offers::respond_to_offer(
        &state.db,
        &state.notifier,
        &caller.branch_id,
        &offer_id,
        req.decision,
        Utc::now(),
    )?;
    Ok(Json(offer))
}

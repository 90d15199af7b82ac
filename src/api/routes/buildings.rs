use axum::extract::rejection::JsonRejection;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::api::errors::bad_json;
use crate::api::models::ListBuildingsQuery;
use crate::api::scope::Caller;
use crate::api::AppState;
use crate::errors::RoofdeskError;
use crate::models::{Building, BuildingInput};

pub async fn list_buildings(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListBuildingsQuery>,
) -> Result<Json<Value>, RoofdeskError> {
    let buildings = state.db.list_buildings(&caller.branch_id, query.customer_id.as_deref())?;
    Ok(Json(json!({ "buildings": buildings, "total": buildings.len() })))
}

pub async fn create_building(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<BuildingInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Building>), RoofdeskError> {
    let Json(input) = payload.map_err(bad_json)?;
    let building = state.db.create_building(&caller.branch_id, &input, Utc::now())?;
    Ok((StatusCode::CREATED, Json(building)))
}

pub async fn get_building(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Building>, RoofdeskError> {
    state
        .db
        .get_building(&caller.branch_id, &id)?
        .map(Json)
        .ok_or_else(|| RoofdeskError::NotFound(format!("building {}", id)))
}

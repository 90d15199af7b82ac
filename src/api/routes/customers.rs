use axum::extract::rejection::JsonRejection;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::api::errors::bad_json;
use crate::api::scope::Caller;
use crate::api::AppState;
use crate::errors::RoofdeskError;
use crate::models::{Customer, CustomerInput};

pub async fn list_customers(State(state): State<AppState>, caller: Caller) -> Result<Json<Value>, RoofdeskError> {
    let customers = state.db.list_customers(&caller.branch_id)?;
    Ok(Json(json!({ "customers": customers, "total": customers.len() })))
}

pub async fn create_customer(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Customer>), RoofdeskError> {
    let Json(input) = payload.map_err(bad_json)?;
    let customer = state.db.create_customer(&caller.branch_id, &input, Utc::now())?;
    info!(customer_id = %customer.id, branch_id = %caller.branch_id, "Customer created");
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get_customer(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Customer>, RoofdeskError> {
    state
        .db
        .get_customer(&caller.branch_id, &id)?
        .map(Json)
        .ok_or_else(|| RoofdeskError::NotFound(format!("customer {}", id)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<Json<Customer>, RoofdeskError> {
    let Json(input) = payload.map_err(bad_json)?;
    state
        .db
        .update_customer(&caller.branch_id, &id, &input)?
        .map(Json)
        .ok_or_else(|| RoofdeskError::NotFound(format!("customer {}", id)))
}

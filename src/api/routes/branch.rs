use axum::{extract::State, Json};
use chrono::Utc;

use crate::api::errors::bad_json;
use crate::api::models::BranchUpdateRequest;
use crate::api::scope::Caller;
use crate::api::AppState;
use crate::errors::RoofdeskError;
use crate::models::Branch;
use axum::extract::rejection::JsonRejection;

pub async fn get_branch(State(state): State<AppState>, caller: Caller) -> Result<Json<Branch>, RoofdeskError> {
    state
        .db
        .get_branch(&caller.branch_id)?
        .map(Json)
        .ok_or_else(|| RoofdeskError::NotFound(format!("branch {}", caller.branch_id)))
}

pub async fn update_branch(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<BranchUpdateRequest>, JsonRejection>,
) -> Result<Json<Branch>, RoofdeskError> {
    let Json(req) = payload.map_err(bad_json)?;
    if req.name.trim().is_empty() {
        let mut errors = crate::errors::FieldErrors::new();
        errors.insert("name".into(), "Branch name is required".into());
        return Err(RoofdeskError::Validation(errors));
    }

    state.db.upsert_branch(&Branch {
        id: caller.branch_id.clone(),
        name: req.name.trim().to_string(),
        address: req.address,
        email: req.email,
        created_at: Utc::now(),
    })?;

    get_branch(State(state), caller).await
}

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::api::models::{ReverseQuery, SearchQuery};
use crate::api::scope::Caller;
use crate::api::AppState;
use crate::errors::RoofdeskError;
use crate::models::LatLng;

/// Suggestions for the caller's current address input. A request overtaken
/// by a newer one from the same user answers with `superseded: true`.
pub async fn search(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<SearchQuery>,
) -> Json<Value> {
    let lookup = state.lookup_for(&caller.user_id);
    match lookup.on_input(&query.q).await {
        Some(suggestions) => {
            state.release_lookup(&caller.user_id, &lookup);
            Json(json!({ "suggestions": suggestions, "superseded": false }))
        }
        None => Json(json!({ "suggestions": [], "superseded": true })),
    }
}

/// Nearest address for a map click. Lookup failures read as no address.
pub async fn reverse(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<ReverseQuery>,
) -> Result<Json<Value>, RoofdeskError> {
    let point = LatLng::new(query.lat, query.lon);
    if !point.is_valid() {
        return Err(RoofdeskError::BadRequest("Coordinates out of range".into()));
    }

    let address = match state.geocoder.reverse(point).await {
        Ok(address) => address,
        Err(e) => {
            debug!(error = %e, "Reverse geocoding failed");
            None
        }
    };
    Ok(Json(json!({ "address": address })))
}

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};

use crate::api::errors::bad_json;
use crate::api::scope::Caller;
use crate::api::AppState;
use crate::errors::RoofdeskError;
use crate::models::{NotificationPreferences, PreferencesPatch};

pub async fn get_preferences(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<NotificationPreferences>, RoofdeskError> {
    Ok(Json(state.db.get_preferences(&caller.user_id)?))
}

pub async fn update_preferences(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<PreferencesPatch>, JsonRejection>,
) -> Result<Json<NotificationPreferences>, RoofdeskError> {
    let Json(patch) = payload.map_err(bad_json)?;
    let mut prefs = state.db.get_preferences(&caller.user_id)?;
    prefs.apply(&patch);
    state.db.save_preferences(&prefs)?;
    Ok(Json(prefs))
}

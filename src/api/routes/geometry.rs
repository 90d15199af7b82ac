use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::api::errors::bad_json;
use crate::api::models::AreaRequest;
use crate::api::scope::Caller;
use crate::errors::RoofdeskError;
use crate::geometry::RoofMeasurement;

pub async fn measure(
    _caller: Caller,
    payload: Result<Json<AreaRequest>, JsonRejection>,
) -> Result<Json<RoofMeasurement>, RoofdeskError> {
    let Json(req) = payload.map_err(bad_json)?;
    if let Some(index) = req.points.iter().position(|p| !p.is_valid()) {
        return Err(RoofdeskError::BadRequest(format!("Point {} is outside valid coordinates", index)));
    }
    Ok(Json(RoofMeasurement::of(&req.points)))
}

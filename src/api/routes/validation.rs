use axum::extract::rejection::JsonRejection;
use axum::{extract::Path, Json};
use serde_json::{json, Value};

use crate::api::errors::bad_json;
use crate::errors::RoofdeskError;
use crate::models::ReportFormData;
use crate::validation::{validate_step, WizardStep};

/// Check form data against one wizard step. Always 200; the verdict is in the body.
pub async fn validate(
    Path(step): Path<u8>,
    payload: Result<Json<ReportFormData>, JsonRejection>,
) -> Result<Json<Value>, RoofdeskError> {
    let step = WizardStep::from_number(step)
        .ok_or_else(|| RoofdeskError::BadRequest(format!("Unknown wizard step {}", step)))?;
    let Json(form) = payload.map_err(bad_json)?;

    let report = validate_step(step, &form);
    Ok(Json(json!({
        "step": step.number(),
        "valid": report.is_valid(),
        "errors": report.errors,
        "warnings": report.warnings,
    })))
}

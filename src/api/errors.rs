use axum::extract::rejection::JsonRejection;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::error;

use crate::errors::{Locale, RoofdeskError};

impl IntoResponse for RoofdeskError {
    fn into_response(self) -> axum::response::Response {
        let classification = self.classify();
        let kind = classification.kind.as_str();

        if let RoofdeskError::Validation(errors) = &self {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": self.to_string(), "kind": kind, "errors": errors })),
            )
                .into_response();
        }

        let status = match &self {
            RoofdeskError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RoofdeskError::NotFound(_) => StatusCode::NOT_FOUND,
            RoofdeskError::Authentication(_) => StatusCode::UNAUTHORIZED,
            RoofdeskError::Permission(_) => StatusCode::FORBIDDEN,
            RoofdeskError::Network(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error_type = classification.error_type, error = %self, "Request failed");
        }

        let message = if classification.user_facing {
            self.to_string()
        } else {
            self.user_message(Locale::En).text.to_string()
        };
        (status, Json(json!({ "error": message, "kind": kind }))).into_response()
    }
}

/// Body that failed to parse as the expected JSON shape.
pub fn bad_json(rejection: JsonRejection) -> RoofdeskError {
    RoofdeskError::BadRequest(rejection.body_text())
}

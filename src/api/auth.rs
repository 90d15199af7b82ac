use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::errors::RoofdeskError;
use super::AppState;

/// Require `Authorization: Bearer <token>` when a token is configured.
pub async fn api_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RoofdeskError> {
    if let Some(expected) = &state.api_token {
        let auth_header = request
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) if token == expected => {}
            Some(_) => return Err(RoofdeskError::Authentication("Invalid API token".into())),
            None => return Err(RoofdeskError::Authentication("Missing Authorization header".into())),
        }
    }

    Ok(next.run(request).await)
}

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::errors::RoofdeskError;

pub const BRANCH_HEADER: &str = "x-branch-id";
pub const USER_HEADER: &str = "x-user-id";

/// Tenant and user of the request, taken from the scoping headers.
#[derive(Debug, Clone)]
pub struct Caller {
    pub branch_id: String,
    pub user_id: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = RoofdeskError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let branch_id = header(BRANCH_HEADER)
            .ok_or_else(|| RoofdeskError::BadRequest("Missing X-Branch-Id header".into()))?;
        let user_id = header(USER_HEADER)
            .ok_or_else(|| RoofdeskError::BadRequest("Missing X-User-Id header".into()))?;

        Ok(Caller { branch_id, user_id })
    }
}

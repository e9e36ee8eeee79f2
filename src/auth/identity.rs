//! Actor identity extraction.
//!
//! Authentication and session handling live outside this service; the
//! upstream gateway resolves the session and forwards the actor's id and
//! role in trusted headers. The transition engine takes both as given.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::roles::Role;
use crate::error::{ApiError, ErrorCode};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// The acting administrator, as supplied by the identity boundary.
#[derive(Debug, Clone)]
pub struct ActorIdentity {
    pub id: String,
    pub role: Role,
}

impl<S> FromRequestParts<S> for ActorIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let id = header_value(parts, ACTOR_ID_HEADER)?
            .ok_or_else(|| ApiError::Unauthorized(format!("{} header missing", ACTOR_ID_HEADER)))?;

        let role = header_value(parts, ACTOR_ROLE_HEADER)?
            .ok_or_else(|| {
                ApiError::Unauthorized(format!("{} header missing", ACTOR_ROLE_HEADER))
            })?
            .parse::<Role>()
            .map_err(|e| ApiError::with_code(ErrorCode::ActorInvalid, e.to_string()))?;

        Ok(ActorIdentity { id, role })
    }
}

fn header_value(parts: &Parts, name: &str) -> crate::error::Result<Option<String>> {
    match parts.headers.get(name) {
        None => Ok(None),
        Some(value) => {
            let value = value.to_str().map_err(|_| {
                ApiError::with_code(
                    ErrorCode::ActorInvalid,
                    format!("{} header is not valid UTF-8", name),
                )
            })?;
            if value.is_empty() {
                return Ok(None);
            }
            Ok(Some(value.to_string()))
        }
    }
}

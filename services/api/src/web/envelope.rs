//! services/api/src/web/envelope.rs
//!
//! The JSON failure envelope shared by every handler and the auth middleware.
//! Success envelopes are per-endpoint structs in `rest.rs`; failures all look
//! like `{"success": false, "error": "..."}` with an appropriate status code.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use promptdesk_core::ports::PortError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
}

/// A handler-level failure carrying the status code and the human-readable
/// message that goes into the envelope.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub error: String,
}

impl ApiFailure {
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "Authentication required. Please sign in to continue.".to_string(),
        }
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: error.into(),
        }
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: error.into(),
        }
    }
}

impl From<PortError> for ApiFailure {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(msg) => Self::not_found(msg),
            PortError::Misconfigured(msg) => Self::bad_request(msg),
            PortError::Upstream(msg) => Self::internal(msg),
            PortError::Unexpected(msg) => Self::internal(msg),
        }
    }
}

/// Request-body extractor that turns axum's plain-text JSON rejection (a 422
/// for a malformed or out-of-schema body) into a 400 failure envelope, so
/// validation errors look like every other error the API returns.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiFailure;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiFailure::bad_request(rejection.body_text()))?;
        Ok(Self(value))
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(FailureBody {
                success: false,
                error: self.error,
            }),
        )
            .into_response()
    }
}

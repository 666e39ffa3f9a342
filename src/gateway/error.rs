use std::time::Duration;

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::matching::MatchError;

use super::NAMECHEF_STATUS_HEADER;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("name matching failed: {0}")]
    MatchFailed(#[from] MatchError),

    #[error("recipe generation failed: {0}")]
    GenerationFailed(String),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::MatchFailed(MatchError::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
            GatewayError::MatchFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::GenerationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the status header.
    pub fn status_label(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::MatchFailed(MatchError::InvalidInput { .. }) => "invalid_request",
            GatewayError::MatchFailed(_) => "match_error",
            GatewayError::GenerationFailed(_) => "generation_error",
            GatewayError::Timeout(_) => "timeout",
            GatewayError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let mut headers = HeaderMap::new();
        headers.insert(
            NAMECHEF_STATUS_HEADER,
            HeaderValue::from_static(self.status_label()),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}

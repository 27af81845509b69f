use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use depot_derive::api_model;
use std::borrow::Cow;

#[api_model]
/// Body of every failed API call.
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable reason, safe to show to end users
    pub error: String,
}

/// A status code plus a client-safe message.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    message: Cow<'static, str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self { status, message: message.into() }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse { success: false, error: self.message.into_owned() };
        (self.status, Json(body)).into_response()
    }
}

//! HTTP Error Handling
//!
//! 应用层错误到 HTML 错误页的映射，状态码按错误类别区分。
//! 日志在 into_response 里统一记录。

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use super::pages;
use crate::application::ApplicationError;

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    TooEarly(String),
    BadGateway(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(error = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::NotFound(msg) => {
                tracing::warn!(error = %msg, "Attempt not found");
                (StatusCode::NOT_FOUND, msg)
            }
            ApiError::TooEarly(msg) => {
                tracing::warn!(error = %msg, "Resend throttled");
                (StatusCode::TOO_MANY_REQUESTS, msg)
            }
            ApiError::BadGateway(msg) => {
                tracing::error!(error = %msg, "Upstream failure");
                (StatusCode::BAD_GATEWAY, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Html(pages::error_page(&message))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::UnknownAttempt(_) => {
                Self::NotFound("登录流程不存在或已过期，请从头开始".to_string())
            }
            ApplicationError::ValidationError(msg) => Self::BadRequest(msg),
            ApplicationError::InvalidState(msg) => Self::BadRequest(msg),
            ApplicationError::CodeRejected(msg) => Self::BadRequest(msg),
            ApplicationError::ResendNotReady(_) => Self::TooEarly(err.to_string()),
            ApplicationError::GatewayUnavailable(msg) => Self::BadGateway(msg),
            ApplicationError::ExternalServiceError(msg) => Self::BadGateway(msg),
            ApplicationError::InternalError(msg) => Self::Internal(msg),
        }
    }
}

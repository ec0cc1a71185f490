//! 应用层错误定义
//!
//! 统一的命令处理错误类型

use thiserror::Error;

use crate::application::ports::{AttemptError, AuthGatewayError};
use crate::domain::login::LoginFlowError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// attempt id 未知或已被清理
    #[error("Login attempt not found: {0}")]
    UnknownAttempt(String),

    /// 输入校验错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 阶段机不允许该操作
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 验证码 / 密码被拒绝
    #[error("{0}")]
    CodeRejected(String),

    /// 重发仍在冷却期
    #[error("重发冷却中，请 {0} 秒后再试")]
    ResendNotReady(i64),

    /// 无法连接外部平台
    #[error("Telegram unreachable: {0}")]
    GatewayUnavailable(String),

    /// 外部平台拒绝 / SDK 报错
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<LoginFlowError> for ApplicationError {
    fn from(err: LoginFlowError) -> Self {
        match err {
            LoginFlowError::InvalidPhone(_) => Self::ValidationError(err.to_string()),
            LoginFlowError::ResendNotReady(secs) => Self::ResendNotReady(secs),
            LoginFlowError::WrongStage(_) => Self::InvalidState(err.to_string()),
        }
    }
}

impl From<AttemptError> for ApplicationError {
    fn from(err: AttemptError) -> Self {
        match err {
            AttemptError::NotFound(id) => Self::UnknownAttempt(id),
            AttemptError::AlreadyExists(_) => Self::InternalError(err.to_string()),
        }
    }
}

impl From<AuthGatewayError> for ApplicationError {
    fn from(err: AuthGatewayError) -> Self {
        match err {
            AuthGatewayError::Connect(msg) => Self::GatewayUnavailable(msg),
            AuthGatewayError::InvalidCode => Self::CodeRejected("验证码错误或已过期".to_string()),
            AuthGatewayError::InvalidPassword(msg) => Self::CodeRejected(msg),
            AuthGatewayError::NoPendingAuth(id) => Self::UnknownAttempt(id),
            AuthGatewayError::Rejected(msg) => Self::ExternalServiceError(msg),
            AuthGatewayError::Sdk(msg) => Self::ExternalServiceError(msg),
        }
    }
}

//! Login Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoginFlowError {
    #[error("无效的手机号: {0}（需要 +380… 这样的国际格式）")]
    InvalidPhone(String),

    #[error("重发冷却中，请 {0} 秒后再试")]
    ResendNotReady(i64),

    #[error("当前登录阶段不允许该操作: {0}")]
    WrongStage(&'static str),
}

//! Login Context - 登录限界上下文
//!
//! 职责:
//! - 手机号校验
//! - 登录尝试的阶段机（验证码 → 2FA 密码 / QR 等待）
//! - 重发冷却与 QR 过期规则

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::{LoginAttempt, LoginStage};
pub use errors::LoginFlowError;
pub use value_objects::PhoneNumber;

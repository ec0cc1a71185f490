//! Domain Layer - 领域层
//!
//! 只有一个限界上下文:
//! - Login Context: 登录尝试编排

pub mod login;

pub use login::{LoginAttempt, LoginFlowError, LoginStage, PhoneNumber};

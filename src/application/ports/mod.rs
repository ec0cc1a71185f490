//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod attempt_store;
mod auth_gateway;

pub use attempt_store::{AttemptError, AttemptStorePort};
pub use auth_gateway::{
    AuthGatewayError, AuthGatewayPort, PhoneCodeSent, PhoneSignInOutcome, QrIssued, QrPollOutcome,
    SignedIn,
};

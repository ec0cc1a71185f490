//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（AuthGateway、AttemptStore）
//! - commands: 登录流程命令及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{
    // Phone flow
    CheckPasswordCommand,
    CheckPasswordResponse,
    CompleteSignInCommand,
    CompleteSignInResponse,
    LoginPolicy,
    ResendCodeCommand,
    ResendCodeResponse,
    StartPhoneLoginCommand,
    StartPhoneLoginResponse,
    // QR flow
    PollQrLoginCommand,
    PollQrLoginResponse,
    StartQrLoginCommand,
    StartQrLoginResponse,
    // Handlers
    handlers::{
        CheckPasswordHandler, CompleteSignInHandler, PollQrLoginHandler, ResendCodeHandler,
        StartPhoneLoginHandler, StartQrLoginHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    AttemptError, AttemptStorePort, AuthGatewayError, AuthGatewayPort, PhoneCodeSent,
    PhoneSignInOutcome, QrIssued, QrPollOutcome, SignedIn,
};

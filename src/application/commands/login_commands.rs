//! Login Commands - 登录流程命令
//!
//! 与路由一一对应：/send /resend /signin /password /qr /qr/check

use chrono::{DateTime, Utc};

use crate::domain::login::PhoneNumber;

/// 登录编排策略（来自配置）
#[derive(Debug, Clone)]
pub struct LoginPolicy {
    /// 平台未报告重发超时时使用的默认冷却（秒）
    pub resend_cooldown_secs: i64,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self {
            resend_cooldown_secs: 60,
        }
    }
}

/// 开始手机验证码登录
#[derive(Debug, Clone)]
pub struct StartPhoneLoginCommand {
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct StartPhoneLoginResponse {
    pub attempt_id: String,
    pub phone: PhoneNumber,
    /// 多少秒后允许重发
    pub resend_after_secs: i64,
}

/// 请求重发验证码
#[derive(Debug, Clone)]
pub struct ResendCodeCommand {
    pub attempt_id: String,
}

#[derive(Debug, Clone)]
pub struct ResendCodeResponse {
    pub attempt_id: String,
    pub phone: PhoneNumber,
    pub resend_after_secs: i64,
}

/// 提交验证码
#[derive(Debug, Clone)]
pub struct CompleteSignInCommand {
    pub attempt_id: String,
    pub code: String,
}

/// 验证码提交结果：直接完成，或进入 2FA
#[derive(Debug, Clone)]
pub enum CompleteSignInResponse {
    Done { session_string: String },
    PasswordNeeded {
        attempt_id: String,
        hint: Option<String>,
    },
}

/// 提交 2FA 云密码
#[derive(Debug, Clone)]
pub struct CheckPasswordCommand {
    pub attempt_id: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct CheckPasswordResponse {
    pub session_string: String,
}

/// 开始 QR 登录
#[derive(Debug, Clone)]
pub struct StartQrLoginCommand;

#[derive(Debug, Clone)]
pub struct StartQrLoginResponse {
    pub attempt_id: String,
    pub login_url: String,
    pub expires_at: DateTime<Utc>,
}

/// 轮询 QR 确认状态
#[derive(Debug, Clone)]
pub struct PollQrLoginCommand {
    pub attempt_id: String,
}

#[derive(Debug, Clone)]
pub enum PollQrLoginResponse {
    Pending,
    /// 平台换发了新 token，携带新的扫码 URL
    Refreshed {
        login_url: String,
        expires_at: DateTime<Utc>,
    },
    Approved { session_string: String },
}

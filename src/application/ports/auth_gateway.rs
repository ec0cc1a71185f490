//! Auth Gateway Port - Telegram 登录握手抽象
//!
//! Web 层只依赖这里定义的窄接口，SDK 的响应形态（TL 类型、token 结构）
//! 不会泄漏出去。具体实现在 infrastructure/telegram 层：
//! 生产环境走 grammers，测试走内存 mock。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// 网关错误
#[derive(Debug, Error)]
pub enum AuthGatewayError {
    /// 建立到平台的传输会话失败（网络 / 超时）
    #[error("Cannot reach Telegram: {0}")]
    Connect(String),

    /// 验证码错误或已过期
    #[error("The confirmation code was rejected")]
    InvalidCode,

    /// 2FA 云密码错误；服务端的 SRP 挑战已失效，需要重新走流程
    #[error("The two-factor password was rejected: {0}")]
    InvalidPassword(String),

    /// 该 attempt 没有进行中的 SDK 句柄
    #[error("No login in flight for attempt {0}")]
    NoPendingAuth(String),

    /// 平台拒绝了本次操作（FLOOD_WAIT、code 过期、签名未注册等）
    #[error("Telegram rejected the request: {0}")]
    Rejected(String),

    /// 其他 SDK 错误
    #[error("Telegram SDK error: {0}")]
    Sdk(String),
}

/// send-code 结果
#[derive(Debug, Clone)]
pub struct PhoneCodeSent {
    /// 平台报告的重发超时（秒）；SDK 不暴露时为 None，由配置默认值兜底
    pub timeout_secs: Option<u32>,
}

/// 登录完成，凭据已序列化
#[derive(Debug, Clone)]
pub struct SignedIn {
    /// 可重连的会话凭据字符串（序列化会话的 base64）
    pub session_string: String,
}

/// 验证码提交的两种去向
#[derive(Debug, Clone)]
pub enum PhoneSignInOutcome {
    SignedIn(SignedIn),
    /// 账号开启了两步验证
    PasswordRequired { hint: Option<String> },
}

/// QR token 导出结果
#[derive(Debug, Clone)]
pub struct QrIssued {
    /// 扫码内容，`tg://login?token=…`
    pub login_url: String,
    pub expires_at: DateTime<Utc>,
}

/// QR 轮询的三种去向
#[derive(Debug, Clone)]
pub enum QrPollOutcome {
    /// 尚未被任何已登录设备确认
    Pending,
    /// 平台已换发新 token，旧 QR 失效，需要重新渲染
    Refreshed(QrIssued),
    SignedIn(SignedIn),
}

/// Auth Gateway Port
///
/// 每个方法都以 attempt id 为键操作网关内部保存的 SDK 句柄；
/// 同一 attempt 的并发调用退化为 `NoPendingAuth`，不会交错执行。
#[async_trait]
pub trait AuthGatewayPort: Send + Sync {
    /// 建立连接并请求给手机号发送验证码
    async fn begin_phone_auth(
        &self,
        attempt_id: &str,
        phone: &str,
    ) -> Result<PhoneCodeSent, AuthGatewayError>;

    /// 请求重发验证码（投递渠道由平台决定）
    async fn resend_phone_code(&self, attempt_id: &str) -> Result<PhoneCodeSent, AuthGatewayError>;

    /// 用收到的验证码完成登录
    async fn complete_phone_auth(
        &self,
        attempt_id: &str,
        code: &str,
    ) -> Result<PhoneSignInOutcome, AuthGatewayError>;

    /// 完成 2FA 云密码校验
    async fn complete_password_auth(
        &self,
        attempt_id: &str,
        password: &str,
    ) -> Result<SignedIn, AuthGatewayError>;

    /// 建立连接并导出 QR 登录 token
    async fn begin_qr_auth(&self, attempt_id: &str) -> Result<QrIssued, AuthGatewayError>;

    /// 轮询 QR 确认状态
    async fn poll_qr_auth(&self, attempt_id: &str) -> Result<QrPollOutcome, AuthGatewayError>;

    /// 丢弃 attempt 对应的 SDK 句柄（成功、放弃或过期清理时调用）
    async fn abort(&self, attempt_id: &str);
}

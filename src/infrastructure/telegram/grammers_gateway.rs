//! Grammers Gateway - 基于 grammers SDK 的生产实现
//!
//! 传输加密、MTProto 编解码、授权密钥交换、会话序列化全部由
//! grammers 完成，这里只做登录握手的编排：
//! - 手机验证码流程走 SDK 的高层 API（`request_login_code` /
//!   `sign_in` / `check_password`，PHONE_MIGRATE 由 SDK 内部处理）
//! - QR 流程走 raw API（`auth.exportLoginToken` / `auth.importLoginToken`）
//!
//! 每个 attempt 在这里持有自己的客户端连接和中间 token；操作期间
//! 句柄被整体取出，结束后放回，同一 attempt 的并发请求因此拿不到
//! 句柄而得到 `NoPendingAuth`。

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use dashmap::DashMap;
use grammers_client::grammers_tl_types as tl;
use grammers_client::session::Session;
use grammers_client::types::{LoginToken, PasswordToken};
use grammers_client::{Client, Config, InitParams, SignInError};

use crate::application::ports::{
    AuthGatewayError, AuthGatewayPort, PhoneCodeSent, PhoneSignInOutcome, QrIssued, QrPollOutcome,
    SignedIn,
};

/// Grammers 网关配置
#[derive(Clone)]
pub struct GrammersGatewayConfig {
    /// my.telegram.org 申请的 api_id
    pub api_id: i32,
    /// my.telegram.org 申请的 api_hash
    pub api_hash: String,
    /// 单次 SDK 调用超时（秒）
    pub request_timeout_secs: u64,
}

/// attempt 对应的 SDK 侧状态
struct PendingAuth {
    client: Client,
    phone: Option<String>,
    login_token: Option<LoginToken>,
    password_token: Option<PasswordToken>,
    /// 最近一次导出的 QR token 原始字节，用于判断平台是否已换发
    qr_token: Option<Vec<u8>>,
}

impl PendingAuth {
    fn new(client: Client) -> Self {
        Self {
            client,
            phone: None,
            login_token: None,
            password_token: None,
            qr_token: None,
        }
    }
}

/// QR token 导出的两种结果
enum QrExport {
    Issued(QrIssued),
    Signed(SignedIn),
}

/// Grammers Gateway
pub struct GrammersGateway {
    config: GrammersGatewayConfig,
    pending: DashMap<String, PendingAuth>,
}

impl GrammersGateway {
    pub fn new(config: GrammersGatewayConfig) -> Self {
        Self {
            config,
            pending: DashMap::new(),
        }
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    fn take_pending(&self, attempt_id: &str) -> Result<PendingAuth, AuthGatewayError> {
        self.pending
            .remove(attempt_id)
            .map(|(_, p)| p)
            .ok_or_else(|| AuthGatewayError::NoPendingAuth(attempt_id.to_string()))
    }

    /// 建立全新的传输会话
    async fn connect(&self) -> Result<Client, AuthGatewayError> {
        let fut = Client::connect(Config {
            session: Session::new(),
            api_id: self.config.api_id,
            api_hash: self.config.api_hash.clone(),
            params: InitParams::default(),
        });
        match tokio::time::timeout(self.request_timeout(), fut).await {
            Ok(Ok(client)) => Ok(client),
            Ok(Err(e)) => Err(AuthGatewayError::Connect(e.to_string())),
            Err(_) => Err(AuthGatewayError::Connect("connection timed out".to_string())),
        }
    }

    /// 已授权连接的会话凭据字符串
    fn session_string(client: &Client) -> String {
        STANDARD.encode(client.session().save())
    }

    /// 在 attempt 的连接上请求发送验证码
    async fn request_code(
        &self,
        client: &Client,
        phone: &str,
    ) -> Result<LoginToken, AuthGatewayError> {
        let fut = client.request_login_code(phone);
        match tokio::time::timeout(self.request_timeout(), fut).await {
            Ok(Ok(token)) => Ok(token),
            Ok(Err(e)) => Err(AuthGatewayError::Rejected(e.to_string())),
            Err(_) => Err(AuthGatewayError::Connect(
                "send-code request timed out".to_string(),
            )),
        }
    }

    /// 导出（或刷新）QR 登录 token
    async fn export_qr_token(&self, p: &mut PendingAuth) -> Result<QrExport, AuthGatewayError> {
        let req = tl::functions::auth::ExportLoginToken {
            api_id: self.config.api_id,
            api_hash: self.config.api_hash.clone(),
            except_ids: Vec::new(),
        };

        let result = match tokio::time::timeout(self.request_timeout(), p.client.invoke(&req)).await
        {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => return Err(AuthGatewayError::Rejected(e.to_string())),
            Err(_) => {
                return Err(AuthGatewayError::Connect(
                    "QR token export timed out".to_string(),
                ))
            }
        };

        match result {
            tl::enums::auth::LoginToken::Token(t) => {
                let login_url = format!("tg://login?token={}", URL_SAFE_NO_PAD.encode(&t.token));
                let expires_at = qr_expiry(t.expires);
                p.qr_token = Some(t.token);
                Ok(QrExport::Issued(QrIssued {
                    login_url,
                    expires_at,
                }))
            }
            tl::enums::auth::LoginToken::Success(s) => {
                self.finish_qr_authorization(&p.client, s.authorization)
                    .map(QrExport::Signed)
            }
            tl::enums::auth::LoginToken::MigrateTo(m) => {
                self.import_migrated_token(&p.client, m.token)
                    .await
                    .map(QrExport::Signed)
            }
        }
    }

    /// 扫码账号在另一个 DC 时，尝试在当前连接上导入迁移 token。
    /// 跨 DC 导入可能被拒绝，此时提示用户改走验证码流程。
    async fn import_migrated_token(
        &self,
        client: &Client,
        token: Vec<u8>,
    ) -> Result<SignedIn, AuthGatewayError> {
        let req = tl::functions::auth::ImportLoginToken { token };
        match tokio::time::timeout(self.request_timeout(), client.invoke(&req)).await {
            Ok(Ok(result)) => {
                let authorization = imported_authorization(result)?;
                self.finish_qr_authorization(client, authorization)
            }
            Ok(Err(e)) => Err(AuthGatewayError::Rejected(format!(
                "该账号在另一个数据中心，导入登录 token 失败（请改用验证码登录）: {e}"
            ))),
            Err(_) => Err(AuthGatewayError::Connect(
                "QR token import timed out".to_string(),
            )),
        }
    }

    fn finish_qr_authorization(
        &self,
        client: &Client,
        authorization: tl::enums::auth::Authorization,
    ) -> Result<SignedIn, AuthGatewayError> {
        match authorization {
            tl::enums::auth::Authorization::Authorization(_) => Ok(SignedIn {
                session_string: Self::session_string(client),
            }),
            tl::enums::auth::Authorization::SignUpRequired(_) => Err(AuthGatewayError::Rejected(
                "该账号尚未注册，请先在官方客户端完成注册".to_string(),
            )),
        }
    }
}

/// auth.importLoginToken 的返回类型仍是 auth.LoginToken；
/// 只有 Success 变体才携带授权，Token / MigrateTo 表示当前连接
/// 完不成导入
fn imported_authorization(
    result: tl::enums::auth::LoginToken,
) -> Result<tl::enums::auth::Authorization, AuthGatewayError> {
    match result {
        tl::enums::auth::LoginToken::Success(s) => Ok(s.authorization),
        tl::enums::auth::LoginToken::Token(_) | tl::enums::auth::LoginToken::MigrateTo(_) => {
            Err(AuthGatewayError::Rejected(
                "该账号在另一个数据中心，当前连接无法完成登录（请改用验证码登录）".to_string(),
            ))
        }
    }
}

/// 平台给出的过期时刻；时间戳异常时退到 30 秒后
fn qr_expiry(expires: i32) -> DateTime<Utc> {
    Utc.timestamp_opt(i64::from(expires), 0)
        .single()
        .unwrap_or_else(|| Utc::now() + chrono::Duration::seconds(30))
}

#[async_trait]
impl AuthGatewayPort for GrammersGateway {
    async fn begin_phone_auth(
        &self,
        attempt_id: &str,
        phone: &str,
    ) -> Result<PhoneCodeSent, AuthGatewayError> {
        let client = self.connect().await?;
        let token = self.request_code(&client, phone).await?;

        let mut pending = PendingAuth::new(client);
        pending.phone = Some(phone.to_string());
        pending.login_token = Some(token);
        self.pending.insert(attempt_id.to_string(), pending);

        tracing::debug!(attempt_id = %attempt_id, "grammers: login code requested");
        // 高层 API 不暴露 sentCode.timeout，冷却交给配置默认值
        Ok(PhoneCodeSent { timeout_secs: None })
    }

    async fn resend_phone_code(&self, attempt_id: &str) -> Result<PhoneCodeSent, AuthGatewayError> {
        let mut pending = self.take_pending(attempt_id)?;
        let phone = match pending.phone.clone() {
            Some(p) => p,
            None => {
                self.pending.insert(attempt_id.to_string(), pending);
                return Err(AuthGatewayError::NoPendingAuth(attempt_id.to_string()));
            }
        };

        // SDK 不暴露 auth.resendCode（code hash 对调用方不可见），
        // 在已连接的句柄上重新发起 send-code 请求即等价于请求重投递，
        // 投递渠道（应用内 / SMS / 电话）由平台自行决定。
        let result = self.request_code(&pending.client, &phone).await;
        match result {
            Ok(token) => {
                pending.login_token = Some(token);
                self.pending.insert(attempt_id.to_string(), pending);
                tracing::debug!(attempt_id = %attempt_id, "grammers: login code re-requested");
                Ok(PhoneCodeSent { timeout_secs: None })
            }
            Err(e) => {
                self.pending.insert(attempt_id.to_string(), pending);
                Err(e)
            }
        }
    }

    async fn complete_phone_auth(
        &self,
        attempt_id: &str,
        code: &str,
    ) -> Result<PhoneSignInOutcome, AuthGatewayError> {
        let mut pending = self.take_pending(attempt_id)?;
        let token = match pending.login_token.take() {
            Some(t) => t,
            None => {
                self.pending.insert(attempt_id.to_string(), pending);
                return Err(AuthGatewayError::NoPendingAuth(attempt_id.to_string()));
            }
        };

        let result =
            match tokio::time::timeout(self.request_timeout(), pending.client.sign_in(&token, code))
                .await
            {
                Ok(r) => r,
                Err(_) => {
                    pending.login_token = Some(token);
                    self.pending.insert(attempt_id.to_string(), pending);
                    return Err(AuthGatewayError::Connect("sign-in timed out".to_string()));
                }
            };

        match result {
            Ok(_user) => {
                let session_string = Self::session_string(&pending.client);
                tracing::debug!(attempt_id = %attempt_id, "grammers: phone sign-in ok");
                Ok(PhoneSignInOutcome::SignedIn(SignedIn { session_string }))
            }
            Err(SignInError::InvalidCode) => {
                // code hash 仍有效，允许用户换个码重试
                pending.login_token = Some(token);
                self.pending.insert(attempt_id.to_string(), pending);
                Err(AuthGatewayError::InvalidCode)
            }
            Err(SignInError::PasswordRequired(password_token)) => {
                let hint = password_token.hint().map(|h| h.to_string());
                pending.password_token = Some(password_token);
                self.pending.insert(attempt_id.to_string(), pending);
                tracing::debug!(attempt_id = %attempt_id, "grammers: 2FA required");
                Ok(PhoneSignInOutcome::PasswordRequired { hint })
            }
            Err(e) => {
                pending.login_token = Some(token);
                self.pending.insert(attempt_id.to_string(), pending);
                Err(AuthGatewayError::Rejected(e.to_string()))
            }
        }
    }

    async fn complete_password_auth(
        &self,
        attempt_id: &str,
        password: &str,
    ) -> Result<SignedIn, AuthGatewayError> {
        let mut pending = self.take_pending(attempt_id)?;
        let password_token = pending
            .password_token
            .take()
            .ok_or_else(|| AuthGatewayError::NoPendingAuth(attempt_id.to_string()))?;

        // SRP 挑战一次有效，失败后不放回句柄，流程只能重来
        let result = tokio::time::timeout(
            self.request_timeout(),
            pending.client.check_password(password_token, password),
        )
        .await;

        match result {
            Ok(Ok(_user)) => {
                let session_string = Self::session_string(&pending.client);
                tracing::debug!(attempt_id = %attempt_id, "grammers: 2FA sign-in ok");
                Ok(SignedIn { session_string })
            }
            Ok(Err(e)) => Err(AuthGatewayError::InvalidPassword(e.to_string())),
            Err(_) => Err(AuthGatewayError::Connect(
                "password check timed out".to_string(),
            )),
        }
    }

    async fn begin_qr_auth(&self, attempt_id: &str) -> Result<QrIssued, AuthGatewayError> {
        let mut pending = PendingAuth::new(self.connect().await?);

        match self.export_qr_token(&mut pending).await {
            Ok(QrExport::Issued(issued)) => {
                self.pending.insert(attempt_id.to_string(), pending);
                tracing::debug!(attempt_id = %attempt_id, "grammers: QR token exported");
                Ok(issued)
            }
            Ok(QrExport::Signed(_)) => Err(AuthGatewayError::Sdk(
                "unexpected authorization on fresh QR export".to_string(),
            )),
            Err(e) => Err(e),
        }
    }

    async fn poll_qr_auth(&self, attempt_id: &str) -> Result<QrPollOutcome, AuthGatewayError> {
        let mut pending = self.take_pending(attempt_id)?;
        let previous = pending.qr_token.clone();

        match self.export_qr_token(&mut pending).await {
            Ok(QrExport::Signed(signed_in)) => {
                // 登录完成，句柄不再放回
                Ok(QrPollOutcome::SignedIn(signed_in))
            }
            Ok(QrExport::Issued(issued)) => {
                let refreshed = previous.as_deref() != pending.qr_token.as_deref();
                self.pending.insert(attempt_id.to_string(), pending);
                if refreshed {
                    Ok(QrPollOutcome::Refreshed(issued))
                } else {
                    Ok(QrPollOutcome::Pending)
                }
            }
            Err(e) => {
                self.pending.insert(attempt_id.to_string(), pending);
                Err(e)
            }
        }
    }

    async fn abort(&self, attempt_id: &str) {
        if self.pending.remove(attempt_id).is_some() {
            tracing::debug!(attempt_id = %attempt_id, "grammers: pending auth dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_token_result_rejected_without_authorization() {
        // 导入后平台又发了一个普通 token：没有授权可用
        let token = tl::enums::auth::LoginToken::Token(tl::types::auth::LoginToken {
            expires: 0,
            token: vec![1, 2, 3],
        });
        assert!(matches!(
            imported_authorization(token),
            Err(AuthGatewayError::Rejected(_))
        ));

        // 再次要求迁移：当前连接同样完不成登录
        let migrate =
            tl::enums::auth::LoginToken::MigrateTo(tl::types::auth::LoginTokenMigrateTo {
                dc_id: 2,
                token: vec![1, 2, 3],
            });
        assert!(matches!(
            imported_authorization(migrate),
            Err(AuthGatewayError::Rejected(_))
        ));
    }

    #[test]
    fn qr_expiry_uses_platform_timestamp() {
        assert_eq!(qr_expiry(1_700_000_000).timestamp(), 1_700_000_000);
    }
}

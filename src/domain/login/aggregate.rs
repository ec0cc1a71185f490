//! Login Context - 登录尝试聚合
//!
//! 每个浏览器发起的登录是一条独立的 LoginAttempt，以 UUID 标识，
//! 取代原型中「全进程一个全局上下文」的做法。SDK 侧的句柄
//! （客户端连接、code hash、QR token）由网关按同一 id 保存，
//! 这里只保留流程编排所需的阶段信息。

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::{LoginFlowError, PhoneNumber};

/// 登录流程所处阶段
#[derive(Debug, Clone)]
pub enum LoginStage {
    /// 验证码已发出，等待用户输入
    AwaitingCode {
        phone: PhoneNumber,
        /// 早于该时刻的重发请求会被拒绝
        resend_at: DateTime<Utc>,
    },
    /// 验证码正确但账号开了两步验证，等待云密码
    AwaitingPassword {
        phone: PhoneNumber,
        hint: Option<String>,
    },
    /// QR 登录 token 已导出，等待扫码确认
    QrPending { expires_at: DateTime<Utc> },
}

/// 一次登录尝试
#[derive(Debug, Clone)]
pub struct LoginAttempt {
    pub id: String,
    pub stage: LoginStage,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl LoginAttempt {
    /// 开始手机验证码流程
    ///
    /// `cooldown_secs` 为重发冷却：平台在 send-code 响应里给出的
    /// 超时优先，没有时用配置默认值。
    pub fn new_phone(phone: PhoneNumber, cooldown_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            stage: LoginStage::AwaitingCode {
                phone,
                resend_at: now + Duration::seconds(cooldown_secs),
            },
            created_at: now,
            last_activity: now,
        }
    }

    /// 开始 QR 流程
    pub fn new_qr(expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            stage: LoginStage::QrPending { expires_at },
            created_at: now,
            last_activity: now,
        }
    }

    /// 当前等待验证码的手机号；其他阶段报 WrongStage
    pub fn phone_awaiting_code(&self) -> Result<&PhoneNumber, LoginFlowError> {
        match &self.stage {
            LoginStage::AwaitingCode { phone, .. } => Ok(phone),
            _ => Err(LoginFlowError::WrongStage("等待验证码")),
        }
    }

    /// 重发冷却校验
    pub fn ensure_resend_ready(&self, now: DateTime<Utc>) -> Result<(), LoginFlowError> {
        match &self.stage {
            LoginStage::AwaitingCode { resend_at, .. } => {
                if now < *resend_at {
                    Err(LoginFlowError::ResendNotReady(
                        (*resend_at - now).num_seconds().max(1),
                    ))
                } else {
                    Ok(())
                }
            }
            _ => Err(LoginFlowError::WrongStage("等待验证码")),
        }
    }

    /// 重发成功后重置冷却
    pub fn mark_resent(&mut self, cooldown_secs: i64) -> Result<(), LoginFlowError> {
        let now = Utc::now();
        match &mut self.stage {
            LoginStage::AwaitingCode { resend_at, .. } => {
                *resend_at = now + Duration::seconds(cooldown_secs);
                self.last_activity = now;
                Ok(())
            }
            _ => Err(LoginFlowError::WrongStage("等待验证码")),
        }
    }

    /// 验证码通过但需要 2FA，进入等待密码阶段
    pub fn require_password(&mut self, hint: Option<String>) -> Result<(), LoginFlowError> {
        let now = Utc::now();
        match &self.stage {
            LoginStage::AwaitingCode { phone, .. } => {
                self.stage = LoginStage::AwaitingPassword {
                    phone: phone.clone(),
                    hint,
                };
                self.last_activity = now;
                Ok(())
            }
            _ => Err(LoginFlowError::WrongStage("等待验证码")),
        }
    }

    /// 是否处于等待密码阶段
    pub fn is_awaiting_password(&self) -> bool {
        matches!(self.stage, LoginStage::AwaitingPassword { .. })
    }

    /// 是否为 QR 流程
    pub fn is_qr(&self) -> bool {
        matches!(self.stage, LoginStage::QrPending { .. })
    }

    /// QR token 刷新后更新过期时刻
    pub fn refresh_qr(&mut self, expires_at: DateTime<Utc>) -> Result<(), LoginFlowError> {
        match &mut self.stage {
            LoginStage::QrPending {
                expires_at: current,
            } => {
                *current = expires_at;
                self.last_activity = Utc::now();
                Ok(())
            }
            _ => Err(LoginFlowError::WrongStage("QR 登录")),
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone() -> PhoneNumber {
        PhoneNumber::new("+380501234567").unwrap()
    }

    #[test]
    fn test_resend_rejected_before_cooldown() {
        let attempt = LoginAttempt::new_phone(phone(), 60);
        let err = attempt.ensure_resend_ready(Utc::now()).unwrap_err();
        assert!(matches!(err, LoginFlowError::ResendNotReady(_)));
    }

    #[test]
    fn test_resend_allowed_after_cooldown() {
        let attempt = LoginAttempt::new_phone(phone(), 0);
        assert!(attempt
            .ensure_resend_ready(Utc::now() + Duration::seconds(1))
            .is_ok());
    }

    #[test]
    fn test_mark_resent_resets_cooldown() {
        let mut attempt = LoginAttempt::new_phone(phone(), 0);
        attempt.mark_resent(60).unwrap();
        let err = attempt.ensure_resend_ready(Utc::now()).unwrap_err();
        assert!(matches!(err, LoginFlowError::ResendNotReady(_)));
    }

    #[test]
    fn test_password_transition() {
        let mut attempt = LoginAttempt::new_phone(phone(), 60);
        attempt.require_password(Some("hint".into())).unwrap();
        assert!(attempt.is_awaiting_password());
        // 已进入密码阶段，不能再重发验证码
        assert!(attempt.ensure_resend_ready(Utc::now()).is_err());
    }

    #[test]
    fn test_qr_stage_rejects_phone_operations() {
        let attempt = LoginAttempt::new_qr(Utc::now() + Duration::seconds(30));
        assert!(attempt.is_qr());
        assert!(attempt.phone_awaiting_code().is_err());
    }

    #[test]
    fn test_refresh_qr_updates_expiry() {
        let mut attempt = LoginAttempt::new_qr(Utc::now());
        let later = Utc::now() + Duration::seconds(30);
        attempt.refresh_qr(later).unwrap();
        match attempt.stage {
            LoginStage::QrPending { expires_at } => assert_eq!(expires_at, later),
            _ => panic!("expected QrPending"),
        }
    }
}

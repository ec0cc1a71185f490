//! Phone Login Command Handlers - 手机验证码流程

use std::sync::Arc;

use chrono::Utc;

use crate::application::commands::login_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AttemptStorePort, AuthGatewayPort, PhoneSignInOutcome,
};
use crate::domain::login::{LoginAttempt, PhoneNumber};

/// StartPhoneLogin Handler - 校验手机号、登记 attempt、发码
pub struct StartPhoneLoginHandler {
    store: Arc<dyn AttemptStorePort>,
    gateway: Arc<dyn AuthGatewayPort>,
    policy: LoginPolicy,
}

impl StartPhoneLoginHandler {
    pub fn new(
        store: Arc<dyn AttemptStorePort>,
        gateway: Arc<dyn AuthGatewayPort>,
        policy: LoginPolicy,
    ) -> Self {
        Self {
            store,
            gateway,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartPhoneLoginCommand,
    ) -> Result<StartPhoneLoginResponse, ApplicationError> {
        let phone = PhoneNumber::new(cmd.phone)?;

        let mut attempt = LoginAttempt::new_phone(phone.clone(), self.policy.resend_cooldown_secs);
        let attempt_id = attempt.id.clone();

        let sent = self
            .gateway
            .begin_phone_auth(&attempt_id, phone.as_str())
            .await?;

        // 平台报告的重发超时优先于配置默认值
        let resend_after_secs = sent
            .timeout_secs
            .map(i64::from)
            .unwrap_or(self.policy.resend_cooldown_secs);
        if sent.timeout_secs.is_some() {
            attempt.mark_resent(resend_after_secs)?;
        }

        if let Err(e) = self.store.insert(attempt) {
            self.gateway.abort(&attempt_id).await;
            return Err(e.into());
        }

        tracing::info!(
            attempt_id = %attempt_id,
            phone = %phone.masked(),
            resend_after_secs,
            "Login code requested"
        );

        Ok(StartPhoneLoginResponse {
            attempt_id,
            phone,
            resend_after_secs,
        })
    }
}

/// ResendCode Handler - 冷却校验后请求重发
pub struct ResendCodeHandler {
    store: Arc<dyn AttemptStorePort>,
    gateway: Arc<dyn AuthGatewayPort>,
    policy: LoginPolicy,
}

impl ResendCodeHandler {
    pub fn new(
        store: Arc<dyn AttemptStorePort>,
        gateway: Arc<dyn AuthGatewayPort>,
        policy: LoginPolicy,
    ) -> Self {
        Self {
            store,
            gateway,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: ResendCodeCommand,
    ) -> Result<ResendCodeResponse, ApplicationError> {
        let mut attempt = self.store.get(&cmd.attempt_id)?;
        attempt.ensure_resend_ready(Utc::now())?;
        let phone = attempt.phone_awaiting_code()?.clone();

        let sent = self.gateway.resend_phone_code(&cmd.attempt_id).await?;

        let resend_after_secs = sent
            .timeout_secs
            .map(i64::from)
            .unwrap_or(self.policy.resend_cooldown_secs);
        attempt.mark_resent(resend_after_secs)?;
        self.store.set_stage(&cmd.attempt_id, attempt.stage)?;

        tracing::info!(
            attempt_id = %cmd.attempt_id,
            phone = %phone.masked(),
            "Login code re-requested"
        );

        Ok(ResendCodeResponse {
            attempt_id: cmd.attempt_id,
            phone,
            resend_after_secs,
        })
    }
}

/// CompleteSignIn Handler - 提交验证码，成功则丢弃 attempt
pub struct CompleteSignInHandler {
    store: Arc<dyn AttemptStorePort>,
    gateway: Arc<dyn AuthGatewayPort>,
}

impl CompleteSignInHandler {
    pub fn new(store: Arc<dyn AttemptStorePort>, gateway: Arc<dyn AuthGatewayPort>) -> Self {
        Self { store, gateway }
    }

    pub async fn handle(
        &self,
        cmd: CompleteSignInCommand,
    ) -> Result<CompleteSignInResponse, ApplicationError> {
        let mut attempt = self.store.get(&cmd.attempt_id)?;
        attempt.phone_awaiting_code()?;

        let code = cmd.code.trim();
        if code.is_empty() {
            return Err(ApplicationError::validation("验证码不能为空"));
        }

        match self
            .gateway
            .complete_phone_auth(&cmd.attempt_id, code)
            .await?
        {
            PhoneSignInOutcome::SignedIn(signed_in) => {
                // 成功后状态全部丢弃，会话字符串是唯一输出
                let _ = self.store.remove(&cmd.attempt_id);
                tracing::info!(attempt_id = %cmd.attempt_id, "Phone sign-in completed");
                Ok(CompleteSignInResponse::Done {
                    session_string: signed_in.session_string,
                })
            }
            PhoneSignInOutcome::PasswordRequired { hint } => {
                attempt.require_password(hint.clone())?;
                self.store.set_stage(&cmd.attempt_id, attempt.stage)?;
                tracing::info!(attempt_id = %cmd.attempt_id, "2FA password required");
                Ok(CompleteSignInResponse::PasswordNeeded {
                    attempt_id: cmd.attempt_id,
                    hint,
                })
            }
        }
    }
}

/// CheckPassword Handler - 2FA 云密码校验
///
/// 失败时 SRP 挑战已被消耗，attempt 一并丢弃，用户需从头再来。
pub struct CheckPasswordHandler {
    store: Arc<dyn AttemptStorePort>,
    gateway: Arc<dyn AuthGatewayPort>,
}

impl CheckPasswordHandler {
    pub fn new(store: Arc<dyn AttemptStorePort>, gateway: Arc<dyn AuthGatewayPort>) -> Self {
        Self { store, gateway }
    }

    pub async fn handle(
        &self,
        cmd: CheckPasswordCommand,
    ) -> Result<CheckPasswordResponse, ApplicationError> {
        let attempt = self.store.get(&cmd.attempt_id)?;
        if !attempt.is_awaiting_password() {
            return Err(ApplicationError::invalid_state(
                "该登录尝试不在等待 2FA 密码阶段",
            ));
        }

        match self
            .gateway
            .complete_password_auth(&cmd.attempt_id, &cmd.password)
            .await
        {
            Ok(signed_in) => {
                let _ = self.store.remove(&cmd.attempt_id);
                tracing::info!(attempt_id = %cmd.attempt_id, "2FA sign-in completed");
                Ok(CheckPasswordResponse {
                    session_string: signed_in.session_string,
                })
            }
            Err(e) => {
                let _ = self.store.remove(&cmd.attempt_id);
                self.gateway.abort(&cmd.attempt_id).await;
                tracing::warn!(attempt_id = %cmd.attempt_id, error = %e, "2FA check failed");
                Err(e.into())
            }
        }
    }
}

//! QR Login Command Handlers - 扫码登录流程

use std::sync::Arc;

use crate::application::commands::login_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{AttemptStorePort, AuthGatewayPort, QrPollOutcome};
use crate::domain::login::LoginAttempt;

/// StartQrLogin Handler - 导出 QR token 并登记 attempt
pub struct StartQrLoginHandler {
    store: Arc<dyn AttemptStorePort>,
    gateway: Arc<dyn AuthGatewayPort>,
}

impl StartQrLoginHandler {
    pub fn new(store: Arc<dyn AttemptStorePort>, gateway: Arc<dyn AuthGatewayPort>) -> Self {
        Self { store, gateway }
    }

    pub async fn handle(
        &self,
        _cmd: StartQrLoginCommand,
    ) -> Result<StartQrLoginResponse, ApplicationError> {
        let mut attempt = LoginAttempt::new_qr(chrono::Utc::now());
        let attempt_id = attempt.id.clone();

        let issued = self.gateway.begin_qr_auth(&attempt_id).await?;
        attempt.refresh_qr(issued.expires_at)?;

        if let Err(e) = self.store.insert(attempt) {
            self.gateway.abort(&attempt_id).await;
            return Err(e.into());
        }

        tracing::info!(
            attempt_id = %attempt_id,
            expires_at = %issued.expires_at,
            "QR login token issued"
        );

        Ok(StartQrLoginResponse {
            attempt_id,
            login_url: issued.login_url,
            expires_at: issued.expires_at,
        })
    }
}

/// PollQrLogin Handler - 轮询确认；token 过期时换发新的
pub struct PollQrLoginHandler {
    store: Arc<dyn AttemptStorePort>,
    gateway: Arc<dyn AuthGatewayPort>,
}

impl PollQrLoginHandler {
    pub fn new(store: Arc<dyn AttemptStorePort>, gateway: Arc<dyn AuthGatewayPort>) -> Self {
        Self { store, gateway }
    }

    pub async fn handle(
        &self,
        cmd: PollQrLoginCommand,
    ) -> Result<PollQrLoginResponse, ApplicationError> {
        let mut attempt = self.store.get(&cmd.attempt_id)?;
        if !attempt.is_qr() {
            return Err(ApplicationError::invalid_state("该登录尝试不是 QR 流程"));
        }

        match self.gateway.poll_qr_auth(&cmd.attempt_id).await? {
            QrPollOutcome::Pending => {
                self.store.touch(&cmd.attempt_id);
                Ok(PollQrLoginResponse::Pending)
            }
            QrPollOutcome::Refreshed(issued) => {
                attempt.refresh_qr(issued.expires_at)?;
                self.store.set_stage(&cmd.attempt_id, attempt.stage)?;
                tracing::debug!(
                    attempt_id = %cmd.attempt_id,
                    expires_at = %issued.expires_at,
                    "QR login token refreshed"
                );
                Ok(PollQrLoginResponse::Refreshed {
                    login_url: issued.login_url,
                    expires_at: issued.expires_at,
                })
            }
            QrPollOutcome::SignedIn(signed_in) => {
                let _ = self.store.remove(&cmd.attempt_id);
                tracing::info!(attempt_id = %cmd.attempt_id, "QR sign-in completed");
                Ok(PollQrLoginResponse::Approved {
                    session_string: signed_in.session_string,
                })
            }
        }
    }
}

//! Mock Gateway - 测试用的认证网关实现
//!
//! 不触网，行为完全由配置决定，便于在路由测试里走通全部登录路径。

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;

use crate::application::ports::{
    AuthGatewayError, AuthGatewayPort, PhoneCodeSent, PhoneSignInOutcome, QrIssued, QrPollOutcome,
    SignedIn,
};

/// Mock 网关配置
#[derive(Clone)]
pub struct MockGatewayConfig {
    /// 被接受的验证码
    pub accepted_code: String,
    /// 配置后进入两步验证，只有该口令被接受
    pub password: Option<String>,
    /// 第几次轮询返回登录成功
    pub qr_approve_after_polls: u32,
    /// 在该次轮询时换发一次 QR token
    pub qr_refresh_at_poll: Option<u32>,
    /// 发码响应携带的冷却提示
    pub timeout_secs: Option<u32>,
}

impl Default for MockGatewayConfig {
    fn default() -> Self {
        Self {
            accepted_code: "12345".to_string(),
            password: None,
            qr_approve_after_polls: 3,
            qr_refresh_at_poll: None,
            timeout_secs: None,
        }
    }
}

enum MockPending {
    Phone { awaiting_password: bool },
    Qr { polls: u32, token_serial: u32 },
}

/// Mock 网关
#[derive(Default)]
pub struct MockAuthGateway {
    config: MockGatewayConfig,
    pending: DashMap<String, MockPending>,
}

impl MockAuthGateway {
    pub fn new(config: MockGatewayConfig) -> Self {
        Self {
            config,
            pending: DashMap::new(),
        }
    }

    fn session_for(attempt_id: &str) -> SignedIn {
        SignedIn {
            session_string: format!("mock-session-{attempt_id}"),
        }
    }

    fn qr_issue(attempt_id: &str, token_serial: u32) -> QrIssued {
        QrIssued {
            login_url: format!("tg://login?token=mock-{attempt_id}-{token_serial}"),
            expires_at: Utc::now() + Duration::seconds(30),
        }
    }
}

#[async_trait]
impl AuthGatewayPort for MockAuthGateway {
    async fn begin_phone_auth(
        &self,
        attempt_id: &str,
        _phone: &str,
    ) -> Result<PhoneCodeSent, AuthGatewayError> {
        self.pending.insert(
            attempt_id.to_string(),
            MockPending::Phone {
                awaiting_password: false,
            },
        );
        Ok(PhoneCodeSent {
            timeout_secs: self.config.timeout_secs,
        })
    }

    async fn resend_phone_code(&self, attempt_id: &str) -> Result<PhoneCodeSent, AuthGatewayError> {
        if !self.pending.contains_key(attempt_id) {
            return Err(AuthGatewayError::NoPendingAuth(attempt_id.to_string()));
        }
        Ok(PhoneCodeSent {
            timeout_secs: self.config.timeout_secs,
        })
    }

    async fn complete_phone_auth(
        &self,
        attempt_id: &str,
        code: &str,
    ) -> Result<PhoneSignInOutcome, AuthGatewayError> {
        if !self.pending.contains_key(attempt_id) {
            return Err(AuthGatewayError::NoPendingAuth(attempt_id.to_string()));
        }
        if code != self.config.accepted_code {
            return Err(AuthGatewayError::InvalidCode);
        }
        if self.config.password.is_some() {
            self.pending.insert(
                attempt_id.to_string(),
                MockPending::Phone {
                    awaiting_password: true,
                },
            );
            return Ok(PhoneSignInOutcome::PasswordRequired {
                hint: Some("mock hint".to_string()),
            });
        }
        self.pending.remove(attempt_id);
        Ok(PhoneSignInOutcome::SignedIn(Self::session_for(attempt_id)))
    }

    async fn complete_password_auth(
        &self,
        attempt_id: &str,
        password: &str,
    ) -> Result<SignedIn, AuthGatewayError> {
        let awaiting = matches!(
            self.pending.get(attempt_id).as_deref(),
            Some(MockPending::Phone {
                awaiting_password: true
            })
        );
        if !awaiting {
            return Err(AuthGatewayError::NoPendingAuth(attempt_id.to_string()));
        }
        // 口令校验一次有效
        self.pending.remove(attempt_id);
        match &self.config.password {
            Some(expected) if expected == password => Ok(Self::session_for(attempt_id)),
            _ => Err(AuthGatewayError::InvalidPassword(
                "wrong password".to_string(),
            )),
        }
    }

    async fn begin_qr_auth(&self, attempt_id: &str) -> Result<QrIssued, AuthGatewayError> {
        self.pending.insert(
            attempt_id.to_string(),
            MockPending::Qr {
                polls: 0,
                token_serial: 0,
            },
        );
        Ok(Self::qr_issue(attempt_id, 0))
    }

    async fn poll_qr_auth(&self, attempt_id: &str) -> Result<QrPollOutcome, AuthGatewayError> {
        let mut entry = self
            .pending
            .get_mut(attempt_id)
            .ok_or_else(|| AuthGatewayError::NoPendingAuth(attempt_id.to_string()))?;
        let (polls, serial) = match &mut *entry {
            MockPending::Qr {
                polls,
                token_serial,
            } => {
                *polls += 1;
                (*polls, token_serial)
            }
            MockPending::Phone { .. } => {
                return Err(AuthGatewayError::NoPendingAuth(attempt_id.to_string()))
            }
        };

        if polls >= self.config.qr_approve_after_polls {
            drop(entry);
            self.pending.remove(attempt_id);
            return Ok(QrPollOutcome::SignedIn(Self::session_for(attempt_id)));
        }
        if Some(polls) == self.config.qr_refresh_at_poll {
            *serial += 1;
            let issued = Self::qr_issue(attempt_id, *serial);
            return Ok(QrPollOutcome::Refreshed(issued));
        }
        Ok(QrPollOutcome::Pending)
    }

    async fn abort(&self, attempt_id: &str) {
        self.pending.remove(attempt_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_configured_code() {
        let gw = MockAuthGateway::default();
        gw.begin_phone_auth("a1", "+8613800138000").await.unwrap();
        let outcome = gw.complete_phone_auth("a1", "12345").await.unwrap();
        match outcome {
            PhoneSignInOutcome::SignedIn(s) => {
                assert_eq!(s.session_string, "mock-session-a1");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        // 登录完成后挂起状态被清除
        assert!(matches!(
            gw.complete_phone_auth("a1", "12345").await,
            Err(AuthGatewayError::NoPendingAuth(_))
        ));
    }

    #[tokio::test]
    async fn rejects_wrong_code() {
        let gw = MockAuthGateway::default();
        gw.begin_phone_auth("a1", "+8613800138000").await.unwrap();
        assert!(matches!(
            gw.complete_phone_auth("a1", "00000").await,
            Err(AuthGatewayError::InvalidCode)
        ));
        // 错码不消耗挂起状态
        assert!(gw.complete_phone_auth("a1", "12345").await.is_ok());
    }

    #[tokio::test]
    async fn password_round_trip() {
        let gw = MockAuthGateway::new(MockGatewayConfig {
            password: Some("hunter2".to_string()),
            ..Default::default()
        });
        gw.begin_phone_auth("a1", "+8613800138000").await.unwrap();
        let outcome = gw.complete_phone_auth("a1", "12345").await.unwrap();
        assert!(matches!(
            outcome,
            PhoneSignInOutcome::PasswordRequired { .. }
        ));
        let signed = gw.complete_password_auth("a1", "hunter2").await.unwrap();
        assert_eq!(signed.session_string, "mock-session-a1");
    }

    #[tokio::test]
    async fn qr_poll_sequence() {
        let gw = MockAuthGateway::new(MockGatewayConfig {
            qr_approve_after_polls: 3,
            qr_refresh_at_poll: Some(2),
            ..Default::default()
        });
        let issued = gw.begin_qr_auth("a1").await.unwrap();
        assert!(issued.login_url.starts_with("tg://login?token="));

        assert!(matches!(
            gw.poll_qr_auth("a1").await.unwrap(),
            QrPollOutcome::Pending
        ));
        assert!(matches!(
            gw.poll_qr_auth("a1").await.unwrap(),
            QrPollOutcome::Refreshed(_)
        ));
        assert!(matches!(
            gw.poll_qr_auth("a1").await.unwrap(),
            QrPollOutcome::SignedIn(_)
        ));
    }
}

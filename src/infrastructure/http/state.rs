//! Application State
//!
//! 路由共享的应用状态：端口 + 各 Command Handler

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CheckPasswordHandler, CompleteSignInHandler, PollQrLoginHandler, ResendCodeHandler,
    StartPhoneLoginHandler, StartQrLoginHandler,
    // Ports
    AttemptStorePort, AuthGatewayPort, LoginPolicy,
};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub attempt_store: Arc<dyn AttemptStorePort>,
    pub auth_gateway: Arc<dyn AuthGatewayPort>,

    // ========== Command Handlers ==========
    pub start_phone_login_handler: StartPhoneLoginHandler,
    pub resend_code_handler: ResendCodeHandler,
    pub complete_sign_in_handler: CompleteSignInHandler,
    pub check_password_handler: CheckPasswordHandler,
    pub start_qr_login_handler: StartQrLoginHandler,
    pub poll_qr_login_handler: PollQrLoginHandler,

    /// QR 页面轮询间隔（秒），注入到页面脚本
    pub qr_poll_interval_secs: u64,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        attempt_store: Arc<dyn AttemptStorePort>,
        auth_gateway: Arc<dyn AuthGatewayPort>,
        policy: LoginPolicy,
        qr_poll_interval_secs: u64,
    ) -> Self {
        Self {
            attempt_store: attempt_store.clone(),
            auth_gateway: auth_gateway.clone(),

            start_phone_login_handler: StartPhoneLoginHandler::new(
                attempt_store.clone(),
                auth_gateway.clone(),
                policy.clone(),
            ),
            resend_code_handler: ResendCodeHandler::new(
                attempt_store.clone(),
                auth_gateway.clone(),
                policy,
            ),
            complete_sign_in_handler: CompleteSignInHandler::new(
                attempt_store.clone(),
                auth_gateway.clone(),
            ),
            check_password_handler: CheckPasswordHandler::new(
                attempt_store.clone(),
                auth_gateway.clone(),
            ),
            start_qr_login_handler: StartQrLoginHandler::new(
                attempt_store.clone(),
                auth_gateway.clone(),
            ),
            poll_qr_login_handler: PollQrLoginHandler::new(attempt_store, auth_gateway),

            qr_poll_interval_secs,
        }
    }
}

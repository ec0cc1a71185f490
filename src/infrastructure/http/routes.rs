//! HTTP Routes
//!
//! 路由定义：
//! - /            GET   首页（手机号表单 + QR 入口）
//! - /send        POST  请求发送验证码
//! - /resend      POST  请求重发验证码
//! - /signin      POST  提交验证码
//! - /password    POST  提交 2FA 云密码
//! - /qr          GET   开始 QR 登录并渲染二维码
//! - /qr/check    GET   轮询 QR 确认状态（JSON）
//! - /api/ping    GET   健康检查

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/send", post(handlers::send_code))
        .route("/resend", post(handlers::resend_code))
        .route("/signin", post(handlers::sign_in))
        .route("/password", post(handlers::check_password))
        .route("/qr", get(handlers::qr_login))
        .route("/qr/check", get(handlers::qr_check))
        .route("/api/ping", get(handlers::ping))
}

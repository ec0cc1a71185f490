//! Phone Login Handlers - 手机验证码流程路由
//!
//! /send → /resend(可选) → /signin → /password(账号开启 2FA 时)
//! attempt id 通过表单隐藏字段在步骤间传递。

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::Form;
use serde::Deserialize;

use crate::application::{
    CheckPasswordCommand, CompleteSignInCommand, CompleteSignInResponse, ResendCodeCommand,
    StartPhoneLoginCommand,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::pages;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendCodeForm {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendForm {
    pub attempt: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub attempt: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    pub attempt: String,
    pub password: String,
}

/// POST /send - 请求发送验证码
pub async fn send_code(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SendCodeForm>,
) -> Result<Html<String>, ApiError> {
    let resp = state
        .start_phone_login_handler
        .handle(StartPhoneLoginCommand { phone: form.phone })
        .await?;

    let hint = format!(
        "约 {} 秒后如果仍未收到验证码，可请求重发。",
        resp.resend_after_secs
    );
    Ok(Html(pages::code_sent_page(
        &resp.attempt_id,
        &resp.phone.masked(),
        Some(&hint),
    )))
}

/// POST /resend - 请求重发验证码
pub async fn resend_code(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ResendForm>,
) -> Result<Html<String>, ApiError> {
    let resp = state
        .resend_code_handler
        .handle(ResendCodeCommand {
            attempt_id: form.attempt,
        })
        .await?;

    Ok(Html(pages::code_sent_page(
        &resp.attempt_id,
        &resp.phone.masked(),
        Some("已重新请求发送验证码，注意查收 Telegram / SMS / 来电。"),
    )))
}

/// POST /signin - 提交验证码
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignInForm>,
) -> Result<Html<String>, ApiError> {
    let resp = state
        .complete_sign_in_handler
        .handle(CompleteSignInCommand {
            attempt_id: form.attempt,
            code: form.code,
        })
        .await?;

    match resp {
        CompleteSignInResponse::Done { session_string } => {
            Ok(Html(pages::session_page(&session_string)))
        }
        CompleteSignInResponse::PasswordNeeded { attempt_id, hint } => {
            Ok(Html(pages::password_page(&attempt_id, hint.as_deref())))
        }
    }
}

/// POST /password - 提交 2FA 云密码
pub async fn check_password(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PasswordForm>,
) -> Result<Html<String>, ApiError> {
    let resp = state
        .check_password_handler
        .handle(CheckPasswordCommand {
            attempt_id: form.attempt,
            password: form.password,
        })
        .await?;

    Ok(Html(pages::session_page(&resp.session_string)))
}

//! QR Login Handlers - 扫码登录路由
//!
//! GET /qr 渲染二维码页面，页面脚本轮询 GET /qr/check。
//! 轮询端点总是返回 200 + JSON，错误作为一种状态下发给脚本。

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::{PollQrLoginCommand, PollQrLoginResponse, StartQrLoginCommand};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::pages;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QrCheckQuery {
    pub attempt: String,
}

/// QR 轮询响应
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QrCheckResponse {
    /// 尚未确认，继续轮询
    Pending,
    /// token 已换发，携带重新渲染的二维码
    Refreshed { qr_svg: String, login_url: String },
    /// 登录完成
    Approved { session: String },
    /// 流程终止，脚本应停止轮询并展示原因
    Error { message: String },
}

/// GET /qr - 开始 QR 登录并渲染二维码页面
pub async fn qr_login(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let resp = state
        .start_qr_login_handler
        .handle(StartQrLoginCommand)
        .await?;

    let svg = render_qr_svg(&resp.login_url)
        .map_err(|e| ApiError::Internal(format!("QR encode failed: {e}")))?;

    Ok(Html(pages::qr_page(
        &resp.attempt_id,
        &svg,
        state.qr_poll_interval_secs,
    )))
}

/// GET /qr/check - 轮询 QR 确认状态
pub async fn qr_check(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QrCheckQuery>,
) -> Json<QrCheckResponse> {
    let result = state
        .poll_qr_login_handler
        .handle(PollQrLoginCommand {
            attempt_id: query.attempt,
        })
        .await;

    let response = match result {
        Ok(PollQrLoginResponse::Pending) => QrCheckResponse::Pending,
        Ok(PollQrLoginResponse::Refreshed { login_url, .. }) => match render_qr_svg(&login_url) {
            Ok(qr_svg) => QrCheckResponse::Refreshed { qr_svg, login_url },
            Err(e) => QrCheckResponse::Error {
                message: format!("QR encode failed: {e}"),
            },
        },
        Ok(PollQrLoginResponse::Approved { session_string }) => QrCheckResponse::Approved {
            session: session_string,
        },
        Err(e) => QrCheckResponse::Error {
            message: e.to_string(),
        },
    };

    Json(response)
}

/// 扫码 URL 渲染为内联 SVG
fn render_qr_svg(login_url: &str) -> Result<String, qrcode::types::QrError> {
    let code = qrcode::QrCode::new(login_url.as_bytes())?;
    Ok(code
        .render::<qrcode::render::svg::Color>()
        .min_dimensions(240, 240)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_qr_svg_produces_svg_markup() {
        let svg = render_qr_svg("tg://login?token=abc").unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn qr_check_response_serializes_with_status_tag() {
        let json = serde_json::to_string(&QrCheckResponse::Pending).unwrap();
        assert_eq!(json, r#"{"status":"pending"}"#);

        let json = serde_json::to_string(&QrCheckResponse::Approved {
            session: "s".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"approved","session":"s"}"#);
    }
}

//! 登录流程黑盒测试
//!
//! 用 mock 网关搭完整路由，通过 tower 的 oneshot 驱动整个
//! 验证码 / 2FA / QR 流程，不触网。

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use telesession::application::{AttemptStorePort, AuthGatewayPort, LoginPolicy};
use telesession::infrastructure::http::{create_routes, AppState};
use telesession::infrastructure::memory::InMemoryAttemptStore;
use telesession::infrastructure::telegram::{MockAuthGateway, MockGatewayConfig};

fn build_app(gateway_config: MockGatewayConfig, policy: LoginPolicy) -> Router {
    let store: Arc<dyn AttemptStorePort> = InMemoryAttemptStore::new().arc();
    let gateway: Arc<dyn AuthGatewayPort> = Arc::new(MockAuthGateway::new(gateway_config));
    let state = AppState::new(store, gateway, policy, 2);
    create_routes().with_state(Arc::new(state))
}

fn default_app() -> Router {
    build_app(MockGatewayConfig::default(), LoginPolicy::default())
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// 从页面里取出隐藏字段携带的 attempt id
fn extract_attempt(html: &str) -> String {
    let marker = r#"name="attempt" value=""#;
    let start = html.find(marker).expect("attempt field missing") + marker.len();
    let end = html[start..].find('"').unwrap() + start;
    html[start..end].to_string()
}

/// QR 页面脚本里的 attempt id
fn extract_qr_attempt(html: &str) -> String {
    let marker = r#"const attempt = ""#;
    let start = html.find(marker).expect("attempt binding missing") + marker.len();
    let end = html[start..].find('"').unwrap() + start;
    html[start..end].to_string()
}

#[tokio::test]
async fn index_links_both_login_paths() {
    let app = default_app();

    let response = app.oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains(r#"action="/send""#));
    assert!(html.contains(r#"href="/qr""#));
}

#[tokio::test]
async fn ping_reports_ok() {
    let app = default_app();

    let response = app.oneshot(get_request("/api/ping")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn full_phone_login_flow() {
    let app = default_app();

    // 第一步：发码，得到带 attempt 隐藏字段的验证码表单
    let response = app
        .clone()
        .oneshot(form_request("/send", "phone=%2B8613800138000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains(r#"action="/signin""#));
    let attempt = extract_attempt(&html);

    // 第二步：提交正确验证码，得到会话凭据
    let response = app
        .clone()
        .oneshot(form_request(
            "/signin",
            &format!("attempt={attempt}&code=12345"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("TELEGRAM_STRING_SESSION"));
    assert!(html.contains(&format!("mock-session-{attempt}")));

    // 完成后 attempt 已清理，重放提交得到 404
    let response = app
        .oneshot(form_request(
            "/signin",
            &format!("attempt={attempt}&code=12345"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_phone_is_rejected() {
    let app = default_app();

    let response = app
        .oneshot(form_request("/send", "phone=12345"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let html = body_string(response).await;
    assert!(html.contains(r#"<a href="/">"#));
}

#[tokio::test]
async fn wrong_code_keeps_attempt_alive() {
    let app = default_app();

    let response = app
        .clone()
        .oneshot(form_request("/send", "phone=%2B8613800138000"))
        .await
        .unwrap();
    let attempt = extract_attempt(&body_string(response).await);

    // 错码得到错误页
    let response = app
        .clone()
        .oneshot(form_request(
            "/signin",
            &format!("attempt={attempt}&code=00000"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 同一 attempt 可以换正确的码重试
    let response = app
        .oneshot(form_request(
            "/signin",
            &format!("attempt={attempt}&code=12345"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("TELEGRAM_STRING_SESSION"));
}

#[tokio::test]
async fn resend_throttled_before_cooldown() {
    // 默认冷却 60 秒
    let app = default_app();

    let response = app
        .clone()
        .oneshot(form_request("/send", "phone=%2B8613800138000"))
        .await
        .unwrap();
    let attempt = extract_attempt(&body_string(response).await);

    let response = app
        .oneshot(form_request("/resend", &format!("attempt={attempt}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn resend_allowed_after_cooldown() {
    // 冷却 0 秒，立即允许重发
    let app = build_app(
        MockGatewayConfig::default(),
        LoginPolicy {
            resend_cooldown_secs: 0,
        },
    );

    let response = app
        .clone()
        .oneshot(form_request("/send", "phone=%2B8613800138000"))
        .await
        .unwrap();
    let attempt = extract_attempt(&body_string(response).await);

    let response = app
        .oneshot(form_request("/resend", &format!("attempt={attempt}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("重新请求发送"));
    // 重发后仍允许继续提交验证码
    assert_eq!(extract_attempt(&html), attempt);
}

#[tokio::test]
async fn unknown_attempt_returns_not_found() {
    let app = default_app();

    let response = app
        .oneshot(form_request("/signin", "attempt=no-such-id&code=12345"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn two_factor_flow() {
    let app = build_app(
        MockGatewayConfig {
            password: Some("hunter2".to_string()),
            ..Default::default()
        },
        LoginPolicy::default(),
    );

    let response = app
        .clone()
        .oneshot(form_request("/send", "phone=%2B8613800138000"))
        .await
        .unwrap();
    let attempt = extract_attempt(&body_string(response).await);

    // 正确的验证码进入密码页
    let response = app
        .clone()
        .oneshot(form_request(
            "/signin",
            &format!("attempt={attempt}&code=12345"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains(r#"action="/password""#));
    assert!(html.contains("mock hint"));
    assert_eq!(extract_attempt(&html), attempt);

    // 正确的密码得到会话凭据
    let response = app
        .oneshot(form_request(
            "/password",
            &format!("attempt={attempt}&password=hunter2"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("TELEGRAM_STRING_SESSION"));
}

#[tokio::test]
async fn wrong_password_aborts_attempt() {
    let app = build_app(
        MockGatewayConfig {
            password: Some("hunter2".to_string()),
            ..Default::default()
        },
        LoginPolicy::default(),
    );

    let response = app
        .clone()
        .oneshot(form_request("/send", "phone=%2B8613800138000"))
        .await
        .unwrap();
    let attempt = extract_attempt(&body_string(response).await);

    app.clone()
        .oneshot(form_request(
            "/signin",
            &format!("attempt={attempt}&code=12345"),
        ))
        .await
        .unwrap();

    // 错误密码：挑战已消耗，attempt 被丢弃
    let response = app
        .clone()
        .oneshot(form_request(
            "/password",
            &format!("attempt={attempt}&password=nope"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 重试同一 attempt 只能重新开始
    let response = app
        .oneshot(form_request(
            "/password",
            &format!("attempt={attempt}&password=hunter2"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn qr_flow_polls_to_approval() {
    let app = build_app(
        MockGatewayConfig {
            qr_approve_after_polls: 2,
            ..Default::default()
        },
        LoginPolicy::default(),
    );

    // QR 页面带内联二维码和轮询脚本
    let response = app.clone().oneshot(get_request("/qr")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("<svg"));
    let attempt = extract_qr_attempt(&html);

    // 第一次轮询：pending
    let response = app
        .clone()
        .oneshot(get_request(&format!("/qr/check?attempt={attempt}")))
        .await
        .unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "pending");

    // 第二次轮询：approved，带会话凭据
    let response = app
        .clone()
        .oneshot(get_request(&format!("/qr/check?attempt={attempt}")))
        .await
        .unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "approved");
    assert_eq!(json["session"], format!("mock-session-{attempt}"));

    // 完成后 attempt 已清理，继续轮询得到 error 状态
    let response = app
        .oneshot(get_request(&format!("/qr/check?attempt={attempt}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "error");
}

#[tokio::test]
async fn phone_operations_rejected_for_qr_attempt() {
    let app = default_app();

    let response = app.clone().oneshot(get_request("/qr")).await.unwrap();
    let attempt = extract_qr_attempt(&body_string(response).await);

    // QR attempt 上提交验证码：阶段机拒绝
    let response = app
        .clone()
        .oneshot(form_request(
            "/signin",
            &format!("attempt={attempt}&code=12345"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains(r#"<a href="/">"#));

    // 重发同理
    let response = app
        .oneshot(form_request("/resend", &format!("attempt={attempt}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn qr_poll_rejected_for_phone_attempt() {
    let app = default_app();

    let response = app
        .clone()
        .oneshot(form_request("/send", "phone=%2B8613800138000"))
        .await
        .unwrap();
    let attempt = extract_attempt(&body_string(response).await);

    // 手机流程的 attempt 不能走 QR 轮询，脚本收到 error 状态
    let response = app
        .oneshot(get_request(&format!("/qr/check?attempt={attempt}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "error");
}

#[tokio::test]
async fn qr_refresh_reissues_code() {
    let app = build_app(
        MockGatewayConfig {
            qr_approve_after_polls: 10,
            qr_refresh_at_poll: Some(1),
            ..Default::default()
        },
        LoginPolicy::default(),
    );

    let response = app.clone().oneshot(get_request("/qr")).await.unwrap();
    let attempt = extract_qr_attempt(&body_string(response).await);

    // 第一次轮询正好碰上 token 换发，响应携带新二维码
    let response = app
        .oneshot(get_request(&format!("/qr/check?attempt={attempt}")))
        .await
        .unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "refreshed");
    assert!(json["qr_svg"].as_str().unwrap().contains("<svg"));
    assert!(json["login_url"]
        .as_str()
        .unwrap()
        .starts_with("tg://login?token="));
}

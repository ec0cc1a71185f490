//! Index Handler - 首页

use axum::response::Html;

use crate::infrastructure::http::pages;

/// 首页：手机号表单 + QR 登录入口
pub async fn index() -> Html<String> {
    Html(pages::index_page())
}

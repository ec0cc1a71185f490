//! HTTP Layer - 服务端渲染页面 + QR 轮询 JSON 端点

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::{HttpServer, ServerConfig};
pub use state::AppState;

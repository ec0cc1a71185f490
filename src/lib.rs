//! Telesession - Telegram 会话凭据生成服务
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Login Context: 登录尝试阶段机与手机号值对象
//!
//! 应用层 (application/):
//! - Ports: 端口定义（AuthGateway, AttemptStore）
//! - Commands: 登录流程命令处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: 服务端渲染页面 + QR 轮询 JSON 端点
//! - Memory: AttemptStore 内存实现
//! - Telegram: grammers 网关 + 测试用 mock 网关

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};

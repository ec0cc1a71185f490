//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

/// 应用主配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// Telegram API 凭据
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// 登录流程配置
    #[serde(default)]
    pub login: LoginConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            telegram: TelegramConfig::default(),
            login: LoginConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Telegram API 凭据（my.telegram.org 申请）
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// api_id
    #[serde(default)]
    pub api_id: i32,

    /// api_hash
    #[serde(default)]
    pub api_hash: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_id: 0,
            api_hash: String::new(),
        }
    }
}

/// 登录流程配置
#[derive(Debug, Clone, Deserialize)]
pub struct LoginConfig {
    /// 验证码重发冷却（秒），平台未报告超时时生效
    #[serde(default = "default_resend_cooldown")]
    pub resend_cooldown_secs: i64,

    /// attempt 空闲多久后被清理（秒）
    #[serde(default = "default_attempt_ttl")]
    pub attempt_ttl_secs: i64,

    /// 过期清理的扫描间隔（秒）
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// 单次 SDK 调用超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// QR 页面的轮询间隔（秒）
    #[serde(default = "default_qr_poll_interval")]
    pub qr_poll_interval_secs: u64,
}

fn default_resend_cooldown() -> i64 {
    60
}

fn default_attempt_ttl() -> i64 {
    600
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    30
}

fn default_qr_poll_interval() -> u64 {
    2
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            resend_cooldown_secs: default_resend_cooldown(),
            attempt_ttl_secs: default_attempt_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            request_timeout_secs: default_request_timeout(),
            qr_poll_interval_secs: default_qr_poll_interval(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

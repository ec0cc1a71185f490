//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `TELESESSION_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `TELESESSION_SERVER__PORT=3000`
/// - `TELESESSION_TELEGRAM__API_ID=123456`
/// - `TELESESSION_TELEGRAM__API_HASH=0123456789abcdef`
/// - `TELESESSION_LOGIN__RESEND_COOLDOWN_SECS=90`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("telegram.api_id", 0)?
        .set_default("telegram.api_hash", "")?
        .set_default("login.resend_cooldown_secs", 60)?
        .set_default("login.attempt_ttl_secs", 600)?
        .set_default("login.sweep_interval_secs", 60)?
        .set_default("login.request_timeout_secs", 30)?
        .set_default("login.qr_poll_interval_secs", 2)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        // 搜索默认配置文件
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: TELESESSION_
    // 层级分隔符: __ (双下划线)
    // 例如: TELESESSION_TELEGRAM__API_ID=123456
    builder = builder.add_source(
        Environment::with_prefix("TELESESSION")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    // Telegram 凭据必须显式提供
    if config.telegram.api_id == 0 {
        return Err(ConfigError::ValidationError(
            "Telegram api_id is not set".to_string(),
        ));
    }
    if config.telegram.api_hash.is_empty() {
        return Err(ConfigError::ValidationError(
            "Telegram api_hash is not set".to_string(),
        ));
    }

    if config.login.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Request timeout cannot be 0".to_string(),
        ));
    }
    if config.login.qr_poll_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "QR poll interval cannot be 0".to_string(),
        ));
    }
    if config.login.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Sweep interval cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Telegram api_id: {}", config.telegram.api_id);
    tracing::info!("Telegram api_hash: {}", mask_secret(&config.telegram.api_hash));
    tracing::info!("Resend Cooldown: {}s", config.login.resend_cooldown_secs);
    tracing::info!("Attempt TTL: {}s", config.login.attempt_ttl_secs);
    tracing::info!("Sweep Interval: {}s", config.login.sweep_interval_secs);
    tracing::info!("Request Timeout: {}s", config.login.request_timeout_secs);
    tracing::info!("QR Poll Interval: {}s", config.login.qr_poll_interval_secs);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

/// 日志里只露出 api_hash 前 4 位
fn mask_secret(secret: &str) -> String {
    if secret.len() <= 4 {
        "****".to_string()
    } else {
        format!("{}{}", &secret[..4], "*".repeat(secret.len() - 4))
    }
}

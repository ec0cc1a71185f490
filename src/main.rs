//! Telesession - Telegram 会话凭据生成服务
//!
//! 小型 Web 前端驱动 Telegram 登录握手（验证码 / QR 两条路径），
//! 产出可复用的会话凭据字符串。

use std::sync::Arc;
use std::time::Duration;

use telesession::application::{AttemptStorePort, AuthGatewayPort, LoginPolicy};
use telesession::config::{load_config, print_config};
use telesession::infrastructure::http::{AppState, HttpServer, ServerConfig};
use telesession::infrastructure::memory::InMemoryAttemptStore;
use telesession::infrastructure::telegram::{GrammersGateway, GrammersGatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 可选，用于本地开发注入凭据
    dotenvy::dotenv().ok();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},telesession={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));
    if config.log.json {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("Telesession - Telegram 会话凭据生成服务");
    print_config(&config);

    // 内存 Attempt 存储 + grammers 网关
    let attempt_store: Arc<dyn AttemptStorePort> = InMemoryAttemptStore::new().arc();
    let auth_gateway: Arc<dyn AuthGatewayPort> = Arc::new(GrammersGateway::new(
        GrammersGatewayConfig {
            api_id: config.telegram.api_id,
            api_hash: config.telegram.api_hash.clone(),
            request_timeout_secs: config.login.request_timeout_secs,
        },
    ));

    // 过期 attempt 清理任务
    {
        let store = attempt_store.clone();
        let gateway = auth_gateway.clone();
        let ttl_secs = config.login.attempt_ttl_secs.max(0) as u64;
        let sweep_interval = Duration::from_secs(config.login.sweep_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            loop {
                ticker.tick().await;
                for id in store.expired(ttl_secs) {
                    gateway.abort(&id).await;
                    if store.remove(&id).is_ok() {
                        tracing::info!(attempt_id = %id, "Expired login attempt swept");
                    }
                }
            }
        });
    }

    let policy = LoginPolicy {
        resend_cooldown_secs: config.login.resend_cooldown_secs,
    };

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(
        attempt_store,
        auth_gateway,
        policy,
        config.login.qr_poll_interval_secs,
    );

    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

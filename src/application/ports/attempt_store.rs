//! Attempt Store Port - 登录尝试生命周期管理
//!
//! 定义按 attempt id 存取 [`LoginAttempt`] 的抽象接口，
//! 具体实现在 infrastructure/memory 层。

use thiserror::Error;

use crate::domain::login::{LoginAttempt, LoginStage};

/// Attempt Store 错误
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("Login attempt not found: {0}")]
    NotFound(String),

    #[error("Login attempt already exists: {0}")]
    AlreadyExists(String),
}

/// Attempt Store Port
///
/// 所有状态存储在内存中，进程重启即丢弃（本系统无持久化需求）。
pub trait AttemptStorePort: Send + Sync {
    /// 登记新的登录尝试，返回其 id
    fn insert(&self, attempt: LoginAttempt) -> Result<String, AttemptError>;

    /// 获取登录尝试的快照
    fn get(&self, id: &str) -> Result<LoginAttempt, AttemptError>;

    /// 整体替换阶段（阶段机迁移后回写）
    fn set_stage(&self, id: &str, stage: LoginStage) -> Result<(), AttemptError>;

    /// 更新最后活动时间
    fn touch(&self, id: &str);

    /// 移除并返回登录尝试（登录成功或放弃时）
    fn remove(&self, id: &str) -> Result<LoginAttempt, AttemptError>;

    /// 所有闲置超过 `idle_timeout_secs` 的 attempt id
    fn expired(&self, idle_timeout_secs: u64) -> Vec<String>;

    /// 所有 attempt id
    fn list_all(&self) -> Vec<String>;
}

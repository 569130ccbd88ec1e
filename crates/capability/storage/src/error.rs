//! 存储层错误类型
//!
//! 定义主数据源装配过程中的错误：
//! - 配置错误（透传 `ConfigError`）
//! - 连接池构建错误（底层 sqlx 拒绝配置或首个连接失败、URL 协议不受支持）
//! - 注册表错误（名称已占用、锁中毒）
//!
//! 全部错误都是启动期致命错误，本层不做重试。

use vm_config::ConfigError;

/// 资源注册表错误。
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("resource already registered: {0}")]
    AlreadyRegistered(String),
    #[error("resource registry lock poisoned")]
    Poisoned,
}

/// 主数据源装配错误。
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// 底层 sqlx 拒绝配置或首个连接失败，保留原始错误作为 source
    #[error("pool construction failed: {0}")]
    Construction(#[from] sqlx::Error),
    #[error("unsupported connection url scheme: {0}")]
    UnsupportedScheme(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

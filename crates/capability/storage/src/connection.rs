//! 数据库连接管理
//!
//! 提供主数据源连接池的构建：
//! - PgDataSourceFactory：按 PoolSettings 建立 Postgres 连接池
//! - PgDataSource：连接池句柄（获取/归还连接由 sqlx 负责）
//!
//! 设计原则：
//! - 连接池算法（获取、校验、回收）完全交给 sqlx，本层只做参数映射
//! - `fail_fast` 为 false 时延迟建连，首个连接在第一次获取时建立

use crate::error::ProvisionError;
use crate::registry::Lifecycle;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Executor, PgPool};
use std::str::FromStr;
use std::sync::Arc;
use vm_config::PoolSettings;

/// 未配置 pool-name 时使用的连接池名称。
pub const DEFAULT_POOL_NAME: &str = "configs-datasource-pool";

/// 连接池统计快照。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// 当前已建立的连接数（含使用中）
    pub size: u32,
    /// 空闲连接数
    pub idle: usize,
    /// 连接数上限
    pub max_size: u32,
}

/// 池化数据源能力：统计信息 + 生命周期。
pub trait PooledDataSource: Lifecycle {
    fn max_pool_size(&self) -> u32;

    fn stats(&self) -> PoolStats;
}

/// 连接池工厂
///
/// 装配逻辑只通过该接口构建连接池，便于测试替换。
#[async_trait]
pub trait DataSourceFactory: Send + Sync {
    type DataSource: PooledDataSource;

    async fn create(&self, settings: &PoolSettings) -> Result<Self::DataSource, ProvisionError>;
}

/// Postgres 连接池句柄。
#[derive(Debug, Clone)]
pub struct PgDataSource {
    pool: PgPool,
    name: String,
}

impl PgDataSource {
    pub fn new(pool: PgPool, name: impl Into<String>) -> Self {
        Self {
            pool,
            name: name.into(),
        }
    }

    /// 底层连接池（acquire / begin / 查询均直接使用）。
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl Lifecycle for PgDataSource {
    async fn shutdown(&self) {
        self.pool.close().await;
    }
}

impl PooledDataSource for PgDataSource {
    fn max_pool_size(&self) -> u32 {
        self.pool.options().get_max_connections()
    }

    fn stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
            max_size: self.max_pool_size(),
        }
    }
}

/// 基于 sqlx 的 Postgres 连接池工厂。
#[derive(Debug, Clone, Copy, Default)]
pub struct PgDataSourceFactory;

#[async_trait]
impl DataSourceFactory for PgDataSourceFactory {
    type DataSource = PgDataSource;

    async fn create(&self, settings: &PoolSettings) -> Result<PgDataSource, ProvisionError> {
        let connect = connect_options(settings)?;
        let options = pool_options(settings);
        let pool = if settings.fail_fast {
            options.connect_with(connect).await?
        } else {
            options.connect_lazy_with(connect)
        };
        let name = settings
            .pool_name
            .clone()
            .unwrap_or_else(|| DEFAULT_POOL_NAME.to_string());
        Ok(PgDataSource::new(pool, name))
    }
}

/// 去掉 JDBC 前缀并校验协议。
///
/// 仅支持 `postgres://` 与 `postgresql://`；错误信息只包含协议名，避免泄露 URL 中的凭据。
pub fn normalize_url(url: &str) -> Result<&str, ProvisionError> {
    let url = url.strip_prefix("jdbc:").unwrap_or(url);
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        return Ok(url);
    }
    let scheme = url.split(':').next().unwrap_or_default();
    Err(ProvisionError::UnsupportedScheme(scheme.to_string()))
}

/// 连接参数：URL 中的账号口令被 username/password 覆盖。
pub fn connect_options(settings: &PoolSettings) -> Result<PgConnectOptions, ProvisionError> {
    let url = normalize_url(&settings.url)?;
    let mut options = PgConnectOptions::from_str(url)?
        .username(&settings.username)
        .password(settings.password.expose_secret());
    if let Some(name) = &settings.pool_name {
        options = options.application_name(name);
    }
    Ok(options)
}

/// 连接池参数映射。
pub fn pool_options(settings: &PoolSettings) -> PgPoolOptions {
    let options = PgPoolOptions::new()
        .max_connections(settings.max_pool_size)
        .min_connections(settings.min_idle)
        .acquire_timeout(settings.connection_timeout)
        .idle_timeout(settings.idle_timeout)
        .max_lifetime(settings.max_lifetime);

    let Some(query) = &settings.validation_query else {
        return options;
    };

    // 配置了校验 SQL 时以它代替默认 ping
    let query: Arc<str> = Arc::from(query.as_str());
    options
        .test_before_acquire(false)
        .before_acquire(move |conn, _meta| {
            let query = Arc::clone(&query);
            Box::pin(async move {
                conn.execute(&*query).await?;
                Ok(true)
            })
        })
}

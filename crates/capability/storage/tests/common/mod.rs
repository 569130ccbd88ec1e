#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vm_config::{CONFIGS_DATASOURCE, ConfigSource, PoolSettings};
use vm_storage::{DataSourceFactory, Lifecycle, PoolStats, PooledDataSource, ProvisionError};

/// 测试用连接池：记录构建参数与关闭状态。
#[derive(Debug)]
pub struct FakeDataSource {
    pub max_pool_size: u32,
    pub min_idle: u32,
    pub connection_timeout: Duration,
    pub closed: Arc<AtomicBool>,
}

impl FakeDataSource {
    pub fn new(max_pool_size: u32) -> Self {
        Self {
            max_pool_size,
            min_idle: 0,
            connection_timeout: Duration::from_secs(1),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Lifecycle for FakeDataSource {
    async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl PooledDataSource for FakeDataSource {
    fn max_pool_size(&self) -> u32 {
        self.max_pool_size
    }

    fn stats(&self) -> PoolStats {
        PoolStats {
            size: 0,
            idle: 0,
            max_size: self.max_pool_size,
        }
    }
}

/// 计数工厂：统计 create 调用次数，可配置为失败。
#[derive(Default)]
pub struct SpyFactory {
    pub calls: AtomicUsize,
    pub fail: bool,
    created: Mutex<Vec<Arc<AtomicBool>>>,
}

impl SpyFactory {
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 已构建的连接池中被关闭的数量。
    pub fn closed_count(&self) -> usize {
        self.created
            .lock()
            .expect("created lock")
            .iter()
            .filter(|closed| closed.load(Ordering::SeqCst))
            .count()
    }
}

#[async_trait]
impl DataSourceFactory for SpyFactory {
    type DataSource = FakeDataSource;

    async fn create(&self, settings: &PoolSettings) -> Result<FakeDataSource, ProvisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProvisionError::Construction(sqlx::Error::PoolTimedOut));
        }
        let closed = Arc::new(AtomicBool::new(false));
        self.created
            .lock()
            .expect("created lock")
            .push(Arc::clone(&closed));
        Ok(FakeDataSource {
            max_pool_size: settings.max_pool_size,
            min_idle: settings.min_idle,
            connection_timeout: settings.connection_timeout,
            closed,
        })
    }
}

pub fn datasource_source(pairs: &[(&str, &str)]) -> ConfigSource {
    ConfigSource::new().with_group(CONFIGS_DATASOURCE, pairs.iter().copied())
}

pub fn h2_source() -> ConfigSource {
    datasource_source(&[
        ("url", "jdbc:h2:mem:test"),
        ("username", "u"),
        ("password", "p"),
        ("maximum-pool-size", "5"),
    ])
}

//! 日志初始化与主数据源装配计数。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 装配指标快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub primary_provisioned: u64,
    pub primary_skipped: u64,
    pub primary_failed: u64,
}

/// 装配指标。
pub struct TelemetryMetrics {
    primary_provisioned: AtomicU64,
    primary_skipped: AtomicU64,
    primary_failed: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            primary_provisioned: AtomicU64::new(0),
            primary_skipped: AtomicU64::new(0),
            primary_failed: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            primary_provisioned: self.primary_provisioned.load(Ordering::Relaxed),
            primary_skipped: self.primary_skipped.load(Ordering::Relaxed),
            primary_failed: self.primary_failed.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 记录主数据源创建次数。
pub fn record_primary_provisioned() {
    metrics().primary_provisioned.fetch_add(1, Ordering::Relaxed);
}

/// 记录因已存在而跳过装配的次数。
pub fn record_primary_skipped() {
    metrics().primary_skipped.fetch_add(1, Ordering::Relaxed);
}

/// 记录装配失败次数（配置错误或建池失败）。
pub fn record_primary_failed() {
    metrics().primary_failed.fetch_add(1, Ordering::Relaxed);
}

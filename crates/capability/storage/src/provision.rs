//! 主数据源条件装配
//!
//! 进程启动时调用一次 [`provision_primary`]：
//! - 注册表中已有 `primary-datasource`：不解析配置、不建池、不覆盖（Skipped）
//! - 不存在：解析 `configs-datasource` 分组，建池并注册（Created）
//!
//! 同名竞争时先注册者生效，后来者构建出的连接池会被立即关闭。
//! 已注册连接池的关闭由注册表负责。

use crate::connection::{DataSourceFactory, DEFAULT_POOL_NAME, PgDataSource};
use crate::error::{ProvisionError, RegistryError};
use crate::registry::{Lifecycle, RegisteredResource, ResourceRegistry};
use std::sync::Arc;
use tracing::{error, info, warn};
use vm_config::{CONFIGS_DATASOURCE, ConfigSource, resolve};

/// 主数据源在注册表中的名称。
pub const PRIMARY_DATASOURCE: &str = "primary-datasource";

/// 装配结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// 本次调用创建并注册了连接池
    Created,
    /// 已存在主数据源，未做任何操作
    Skipped,
}

/// 装配主数据源。
///
/// # 参数
/// - `registry`：进程级资源注册表
/// - `source`：启动时读取的配置分组
/// - `factory`：连接池工厂
///
/// # 返回
/// - `Result<ProvisionOutcome, ProvisionError>`：配置与建池错误原样返回，不重试
pub async fn provision_primary<R, F>(
    registry: &R,
    source: &ConfigSource,
    factory: &F,
) -> Result<ProvisionOutcome, ProvisionError>
where
    R: ResourceRegistry + ?Sized,
    F: DataSourceFactory,
{
    if registry.contains(PRIMARY_DATASOURCE) {
        info!(
            resource = PRIMARY_DATASOURCE,
            "primary datasource already registered, skipping"
        );
        vm_telemetry::record_primary_skipped();
        return Ok(ProvisionOutcome::Skipped);
    }

    match build_and_register(registry, source, factory).await {
        Ok(ProvisionOutcome::Created) => {
            vm_telemetry::record_primary_provisioned();
            Ok(ProvisionOutcome::Created)
        }
        Ok(ProvisionOutcome::Skipped) => {
            vm_telemetry::record_primary_skipped();
            Ok(ProvisionOutcome::Skipped)
        }
        Err(err) => {
            vm_telemetry::record_primary_failed();
            error!(error = %err, "primary datasource provisioning failed");
            Err(err)
        }
    }
}

async fn build_and_register<R, F>(
    registry: &R,
    source: &ConfigSource,
    factory: &F,
) -> Result<ProvisionOutcome, ProvisionError>
where
    R: ResourceRegistry + ?Sized,
    F: DataSourceFactory,
{
    let settings = resolve(source, CONFIGS_DATASOURCE)?;
    info!(
        pool = settings.pool_name.as_deref().unwrap_or(DEFAULT_POOL_NAME),
        max_pool_size = settings.max_pool_size,
        min_idle = settings.min_idle,
        connection_timeout = ?settings.connection_timeout,
        fail_fast = settings.fail_fast,
        "creating primary datasource"
    );

    let datasource = Arc::new(factory.create(&settings).await?);
    let resource = RegisteredResource::new(Arc::clone(&datasource));
    match registry.register(PRIMARY_DATASOURCE, resource) {
        Ok(()) => {
            info!(resource = PRIMARY_DATASOURCE, "primary datasource registered");
            Ok(ProvisionOutcome::Created)
        }
        Err(RegistryError::AlreadyRegistered(_)) => {
            warn!(
                resource = PRIMARY_DATASOURCE,
                "primary datasource registered concurrently, closing new pool"
            );
            datasource.shutdown().await;
            Ok(ProvisionOutcome::Skipped)
        }
        Err(err) => {
            datasource.shutdown().await;
            Err(err.into())
        }
    }
}

/// 取回已注册的 Postgres 主数据源。
pub fn primary_datasource<R>(registry: &R) -> Option<Arc<PgDataSource>>
where
    R: ResourceRegistry + ?Sized,
{
    registry.get(PRIMARY_DATASOURCE)?.downcast::<PgDataSource>()
}

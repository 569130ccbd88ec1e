//! 进程初始化入口：加载配置、装配主数据源、等待退出信号后关闭资源。

use vm_config::{ConfigSource, datasource_source_from_env};
use vm_storage::{
    InMemoryRegistry, PgDataSourceFactory, PooledDataSource, ProvisionError, ProvisionOutcome,
    primary_datasource, provision_primary,
};
use vm_telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 初始化结构化日志（先于装配，确保装配日志可见）
    init_tracing();
    // 从环境变量读取 configs-datasource 分组
    let source = datasource_source_from_env();

    let registry = InMemoryRegistry::new();
    let outcome = bootstrap(&registry, &source).await?;

    if let Some(datasource) = primary_datasource(&registry) {
        let stats = datasource.stats();
        tracing::info!(
            ?outcome,
            pool = datasource.name(),
            size = stats.size,
            idle = stats.idle,
            max_size = stats.max_size,
            "primary datasource ready"
        );
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    // 注册表负责关闭其持有的连接池
    registry.shutdown().await;
    Ok(())
}

/// 启动期装配；任何错误都直接终止启动。
async fn bootstrap(
    registry: &InMemoryRegistry,
    source: &ConfigSource,
) -> Result<ProvisionOutcome, ProvisionError> {
    provision_primary(registry, source, &PgDataSourceFactory).await
}

//! # VM Storage 模块
//!
//! 本模块负责进程级主数据源（primary datasource）的装配与暴露。
//!
//! ## 架构设计
//!
//! 1. **错误处理层** (`error.rs`)：装配错误与注册表错误
//! 2. **注册表层** (`registry.rs`)：按名称持有长生命周期资源，负责关闭
//! 3. **连接管理层** (`connection.rs`)：PoolSettings -> sqlx 连接池
//! 4. **装配层** (`provision.rs`)：检查 -> 解析 -> 建池 -> 注册
//!
//! ## 核心约束
//!
//! - **至多一个主数据源**：`primary-datasource` 已注册时装配直接跳过
//! - **不覆盖**：注册表拒绝同名二次注册
//! - **错误不吞**：配置错误与建池错误原样传给进程入口，启动失败
//! - **关闭归注册表**：装配方不关闭已注册的连接池
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use vm_config::datasource_source_from_env;
//! use vm_storage::{InMemoryRegistry, PgDataSourceFactory, provision_primary, primary_datasource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = InMemoryRegistry::new();
//!     let source = datasource_source_from_env();
//!     provision_primary(&registry, &source, &PgDataSourceFactory).await?;
//!
//!     let datasource = primary_datasource(&registry).expect("primary datasource");
//!     let mut conn = datasource.pool().acquire().await?;
//!
//!     registry.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod error;
pub mod provision;
pub mod registry;

pub use connection::*;
pub use error::*;
pub use provision::*;
pub use registry::*;

//! 应用运行配置加载。
//!
//! - `source`：启动时读取的命名配置分组（分组名 -> 键值对）
//! - `datasource`：将 `configs-datasource` 分组解析为强类型的连接池配置

pub mod datasource;
pub mod source;

pub use datasource::*;
pub use source::*;

/// 配置加载错误。
///
/// 所有变体都是启动期致命错误，由调用方原样向上传播。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing config group: {0}")]
    MissingGroup(String),
    #[error("missing required key: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
    #[error("constraint violated: {0}")]
    Constraint(String),
}

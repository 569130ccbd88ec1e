//! 进程级资源注册表
//!
//! 持有按名称注册的长生命周期资源（如主数据源连接池）：
//! - contains / get：供装配逻辑与使用方查询
//! - register：一次发布，名称被占用时拒绝且不覆盖
//! - shutdown：进程退出时按注册的逆序关闭资源
//!
//! 资源关闭由注册表负责，注册方不自行关闭。

use crate::error::RegistryError;
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::info;

/// 资源生命周期钩子。
#[async_trait]
pub trait Lifecycle: Send + Sync + 'static {
    /// 释放资源持有的外部句柄（连接、套接字等）。
    async fn shutdown(&self);
}

/// 已注册资源：类型擦除的句柄 + 关闭钩子。
#[derive(Clone)]
pub struct RegisteredResource {
    handle: Arc<dyn Any + Send + Sync>,
    lifecycle: Arc<dyn Lifecycle>,
    type_name: &'static str,
}

impl RegisteredResource {
    pub fn new<T: Lifecycle>(resource: Arc<T>) -> Self {
        Self {
            handle: resource.clone(),
            lifecycle: resource,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// 按具体类型取回资源；类型不符时返回 None。
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.handle.clone().downcast::<T>().ok()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 是否为同一个资源实例。
    pub fn same_as(&self, other: &RegisteredResource) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
    }

    pub async fn shutdown(&self) {
        self.lifecycle.shutdown().await;
    }
}

impl fmt::Debug for RegisteredResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredResource")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// 资源注册接口
///
/// 注册是一次性发布：同名资源只能注册一次，之后所有读取方看到同一个实例。
pub trait ResourceRegistry: Send + Sync {
    /// 指定名称是否已注册
    fn contains(&self, name: &str) -> bool;

    /// 注册资源；名称已存在时返回 `RegistryError::AlreadyRegistered`
    fn register(&self, name: &str, resource: RegisteredResource) -> Result<(), RegistryError>;

    /// 查找已注册资源
    fn get(&self, name: &str) -> Option<RegisteredResource>;
}

/// 内存注册表
///
/// 使用 RwLock + Vec 保留注册顺序，关闭时逆序执行。
#[derive(Default)]
pub struct InMemoryRegistry {
    entries: RwLock<Vec<(String, RegisteredResource)>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按注册顺序列出资源名称
    pub fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .map(|entries| entries.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 关闭并移除全部资源（逆注册顺序）。
    pub async fn shutdown(&self) {
        let drained: Vec<(String, RegisteredResource)> = match self.entries.write() {
            Ok(mut entries) => entries.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        };
        for (name, resource) in drained.into_iter().rev() {
            info!(resource = %name, type_name = resource.type_name(), "shutting down resource");
            resource.shutdown().await;
        }
    }
}

impl ResourceRegistry for InMemoryRegistry {
    fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .ok()
            .is_some_and(|entries| entries.iter().any(|(existing, _)| existing == name))
    }

    fn register(&self, name: &str, resource: RegisteredResource) -> Result<(), RegistryError> {
        let mut entries = self.entries.write().map_err(|_| RegistryError::Poisoned)?;
        if entries.iter().any(|(existing, _)| existing == name) {
            return Err(RegistryError::AlreadyRegistered(name.to_string()));
        }
        entries.push((name.to_string(), resource));
        Ok(())
    }

    fn get(&self, name: &str) -> Option<RegisteredResource> {
        self.entries.read().ok().and_then(|entries| {
            entries
                .iter()
                .find(|(existing, _)| existing == name)
                .map(|(_, resource)| resource.clone())
        })
    }
}

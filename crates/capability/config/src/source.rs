//! 命名配置分组来源。
//!
//! 以 `分组名 -> (键 -> 值)` 的形式持有原始配置：
//! - 启动时一次性读取（环境变量或显式构造）
//! - 读取完成后只读，不做热更新

use std::collections::HashMap;
use std::env;
use std::fmt;

/// 单个配置分组：键 -> 原始字符串值。
pub type ConfigGroup = HashMap<String, String>;

/// 命名配置分组集合。
#[derive(Clone, Default)]
pub struct ConfigSource {
    groups: HashMap<String, ConfigGroup>,
}

impl ConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加（或合并）一个分组。
    pub fn with_group<I, K, V>(mut self, name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let group = self.groups.entry(name.into()).or_default();
        for (key, value) in pairs {
            group.insert(key.into(), value.into());
        }
        self
    }

    /// 写入单个键值。
    pub fn insert(
        &mut self,
        group: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.groups
            .entry(group.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// 按名称查找分组。
    pub fn group(&self, name: &str) -> Option<&ConfigGroup> {
        self.groups.get(name)
    }

    /// 从环境变量读取一个分组。
    ///
    /// 变量名规则：`<分组>_<键>` 转大写，`-`、`.` 替换为 `_`，
    /// 例如 `configs-datasource` + `maximum-pool-size` ->
    /// `CONFIGS_DATASOURCE_MAXIMUM_POOL_SIZE`。
    pub fn load_env_group(self, group: &str, keys: &[&str]) -> Self {
        self.load_group_with(group, keys, |name| env::var(name).ok())
    }

    /// 使用自定义查找函数读取一个分组（便于测试注入）。
    ///
    /// 一个键都没有读到时不创建分组。
    pub fn load_group_with<F>(mut self, group: &str, keys: &[&str], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in keys {
            if let Some(value) = lookup(&env_var_name(group, key)) {
                self.insert(group, *key, value);
            }
        }
        self
    }
}

impl fmt::Debug for ConfigSource {
    // 只输出分组与键名，原始值可能包含口令。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, group) in &self.groups {
            let mut keys: Vec<&str> = group.keys().map(String::as_str).collect();
            keys.sort_unstable();
            map.entry(name, &keys);
        }
        map.finish()
    }
}

/// 分组键对应的环境变量名。
pub fn env_var_name(group: &str, key: &str) -> String {
    format!("{group}_{key}")
        .to_ascii_uppercase()
        .replace(['-', '.'], "_")
}

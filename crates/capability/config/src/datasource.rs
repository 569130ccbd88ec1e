//! 主数据源连接池配置解析。
//!
//! 将命名分组（默认 `configs-datasource`）映射为 [`PoolSettings`]：
//! - 必填：url、username、password、maximum-pool-size
//! - 选填：缺省时使用下方常量定义的默认值
//! - 校验在解析时一次性完成，失败时不返回任何部分结果

use crate::ConfigError;
use crate::source::{ConfigGroup, ConfigSource};
use secrecy::SecretString;
use std::time::Duration;

/// 主数据源配置分组名。
pub const CONFIGS_DATASOURCE: &str = "configs-datasource";

pub const KEY_URL: &str = "url";
pub const KEY_JDBC_URL: &str = "jdbc-url";
pub const KEY_USERNAME: &str = "username";
pub const KEY_PASSWORD: &str = "password";
pub const KEY_MAXIMUM_POOL_SIZE: &str = "maximum-pool-size";
pub const KEY_MINIMUM_IDLE: &str = "minimum-idle";
pub const KEY_CONNECTION_TIMEOUT: &str = "connection-timeout";
pub const KEY_VALIDATION_QUERY: &str = "validation-query";
pub const KEY_IDLE_TIMEOUT: &str = "idle-timeout";
pub const KEY_MAX_LIFETIME: &str = "max-lifetime";
pub const KEY_POOL_NAME: &str = "pool-name";
pub const KEY_INITIALIZATION_FAIL_FAST: &str = "initialization-fail-fast";

/// 数据源分组可识别的全部键（环境变量加载按此列表读取）。
pub const DATASOURCE_KEYS: &[&str] = &[
    KEY_URL,
    KEY_JDBC_URL,
    KEY_USERNAME,
    KEY_PASSWORD,
    KEY_MAXIMUM_POOL_SIZE,
    KEY_MINIMUM_IDLE,
    KEY_CONNECTION_TIMEOUT,
    KEY_VALIDATION_QUERY,
    KEY_IDLE_TIMEOUT,
    KEY_MAX_LIFETIME,
    KEY_POOL_NAME,
    KEY_INITIALIZATION_FAIL_FAST,
];

pub const DEFAULT_MIN_IDLE: u32 = 0;
pub const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 600_000;
pub const DEFAULT_MAX_LIFETIME_MS: u64 = 1_800_000;

/// 已校验的连接池配置。
///
/// 不变量：`max_pool_size > 0`，`min_idle <= max_pool_size`，
/// `connection_timeout > 0`。口令以 `SecretString` 持有，Debug 输出自动脱敏。
#[derive(Debug)]
pub struct PoolSettings {
    pub url: String,
    pub username: String,
    pub password: SecretString,
    pub max_pool_size: u32,
    pub min_idle: u32,
    /// 获取连接的等待上限。
    pub connection_timeout: Duration,
    pub validation_query: Option<String>,
    /// `None` 表示空闲连接不过期。
    pub idle_timeout: Option<Duration>,
    /// `None` 表示连接不限寿命。
    pub max_lifetime: Option<Duration>,
    pub pool_name: Option<String>,
    /// 为 true 时启动即建立首个连接，失败则启动失败。
    pub fail_fast: bool,
}

impl PoolSettings {
    /// 从单个分组解析配置。
    ///
    /// `group_name` 仅用于错误信息中的键名（`<分组>.<键>`）。
    pub fn from_group(group_name: &str, group: &ConfigGroup) -> Result<Self, ConfigError> {
        let reader = GroupReader {
            name: group_name,
            group,
        };

        let url = reader.required(&[KEY_URL, KEY_JDBC_URL])?;
        let username = reader.required(&[KEY_USERNAME])?;
        let password = SecretString::from(reader.required(&[KEY_PASSWORD])?);
        let max_pool_size = reader.required_u32(KEY_MAXIMUM_POOL_SIZE)?;
        if max_pool_size == 0 {
            return Err(reader.invalid(KEY_MAXIMUM_POOL_SIZE, "0"));
        }
        let min_idle = reader.u32_with_default(KEY_MINIMUM_IDLE, DEFAULT_MIN_IDLE)?;
        if min_idle > max_pool_size {
            return Err(ConfigError::Constraint(format!(
                "{} ({}) exceeds {} ({})",
                reader.qualified(KEY_MINIMUM_IDLE),
                min_idle,
                reader.qualified(KEY_MAXIMUM_POOL_SIZE),
                max_pool_size
            )));
        }
        let connection_timeout_ms =
            reader.u64_with_default(KEY_CONNECTION_TIMEOUT, DEFAULT_CONNECTION_TIMEOUT_MS)?;
        if connection_timeout_ms == 0 {
            return Err(reader.invalid(KEY_CONNECTION_TIMEOUT, "0"));
        }
        let idle_timeout = reader.optional_millis(KEY_IDLE_TIMEOUT, DEFAULT_IDLE_TIMEOUT_MS)?;
        let max_lifetime = reader.optional_millis(KEY_MAX_LIFETIME, DEFAULT_MAX_LIFETIME_MS)?;
        let validation_query = reader.optional(KEY_VALIDATION_QUERY);
        let pool_name = reader.optional(KEY_POOL_NAME);
        let fail_fast = reader.bool_with_default(KEY_INITIALIZATION_FAIL_FAST, false)?;

        Ok(Self {
            url,
            username,
            password,
            max_pool_size,
            min_idle,
            connection_timeout: Duration::from_millis(connection_timeout_ms),
            validation_query,
            idle_timeout,
            max_lifetime,
            pool_name,
            fail_fast,
        })
    }
}

/// 解析指定分组为连接池配置。
///
/// 分组不存在、必填键缺失或类型转换失败时返回 `ConfigError`。
pub fn resolve(source: &ConfigSource, group_name: &str) -> Result<PoolSettings, ConfigError> {
    let group = source
        .group(group_name)
        .ok_or_else(|| ConfigError::MissingGroup(group_name.to_string()))?;
    PoolSettings::from_group(group_name, group)
}

/// 从环境变量加载 `configs-datasource` 分组。
pub fn datasource_source_from_env() -> ConfigSource {
    ConfigSource::new().load_env_group(CONFIGS_DATASOURCE, DATASOURCE_KEYS)
}

struct GroupReader<'a> {
    name: &'a str,
    group: &'a ConfigGroup,
}

impl GroupReader<'_> {
    /// 取第一个非空值（按别名顺序），值会去掉首尾空白。
    fn lookup(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.group.get(*key))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn qualified(&self, key: &str) -> String {
        format!("{}.{}", self.name, key)
    }

    fn invalid(&self, key: &str, value: &str) -> ConfigError {
        ConfigError::Invalid(self.qualified(key), value.to_string())
    }

    fn required(&self, keys: &[&str]) -> Result<String, ConfigError> {
        self.lookup(keys)
            .ok_or_else(|| ConfigError::Missing(self.qualified(keys[0])))
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.lookup(&[key])
    }

    fn required_u32(&self, key: &str) -> Result<u32, ConfigError> {
        let value = self.required(&[key])?;
        value.parse::<u32>().map_err(|_| self.invalid(key, &value))
    }

    fn u32_with_default(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        match self.optional(key) {
            Some(value) => value.parse::<u32>().map_err(|_| self.invalid(key, &value)),
            None => Ok(default),
        }
    }

    fn u64_with_default(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        match self.optional(key) {
            Some(value) => value.parse::<u64>().map_err(|_| self.invalid(key, &value)),
            None => Ok(default),
        }
    }

    /// 毫秒时长；显式配置为 0 表示关闭。
    fn optional_millis(&self, key: &str, default: u64) -> Result<Option<Duration>, ConfigError> {
        let millis = self.u64_with_default(key, default)?;
        Ok((millis > 0).then(|| Duration::from_millis(millis)))
    }

    /// 布尔值：true/false、1/0、on/off、yes/no（不区分大小写），其余取值报错。
    fn bool_with_default(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = self.optional(key) else {
            return Ok(default);
        };
        match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Ok(true),
            "false" | "0" | "off" | "no" => Ok(false),
            _ => Err(self.invalid(key, &value)),
        }
    }
}

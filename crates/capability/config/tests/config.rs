use vm_config::{
    CONFIGS_DATASOURCE, ConfigSource, DATASOURCE_KEYS, datasource_source_from_env, env_var_name,
    resolve,
};
use std::collections::HashMap;

#[test]
fn env_var_name_uses_relaxed_binding() {
    assert_eq!(
        env_var_name("configs-datasource", "maximum-pool-size"),
        "CONFIGS_DATASOURCE_MAXIMUM_POOL_SIZE"
    );
    assert_eq!(env_var_name("configs-datasource", "url"), "CONFIGS_DATASOURCE_URL");
}

#[test]
fn load_group_with_lookup() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("CONFIGS_DATASOURCE_URL", "postgres://localhost/configs"),
        ("CONFIGS_DATASOURCE_MINIMUM_IDLE", "2"),
        ("OTHER_URL", "ignored"),
    ]);
    let source = ConfigSource::new().load_group_with(CONFIGS_DATASOURCE, DATASOURCE_KEYS, |name| {
        vars.get(name).map(|value| value.to_string())
    });

    let group = source.group(CONFIGS_DATASOURCE).expect("group");
    assert_eq!(group.len(), 2);
    assert_eq!(group.get("url").map(String::as_str), Some("postgres://localhost/configs"));
    assert_eq!(group.get("minimum-idle").map(String::as_str), Some("2"));
}

#[test]
fn group_absent_when_no_key_found() {
    let source = ConfigSource::new().load_group_with(CONFIGS_DATASOURCE, DATASOURCE_KEYS, |_| None);
    assert!(source.group(CONFIGS_DATASOURCE).is_none());
}

#[test]
fn debug_output_hides_values() {
    let source = ConfigSource::new().with_group(
        CONFIGS_DATASOURCE,
        [("password", "top-secret"), ("username", "u")],
    );
    let rendered = format!("{source:?}");
    assert!(rendered.contains("password"));
    assert!(!rendered.contains("top-secret"));
}

#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("CONFIGS_DATASOURCE_URL", "postgres://localhost:5432/configs");
        std::env::set_var("CONFIGS_DATASOURCE_USERNAME", "vm");
        std::env::set_var("CONFIGS_DATASOURCE_PASSWORD", "vm-secret");
        std::env::set_var("CONFIGS_DATASOURCE_MAXIMUM_POOL_SIZE", "7");
    }

    let source = datasource_source_from_env();
    let settings = resolve(&source, CONFIGS_DATASOURCE).expect("settings");
    assert_eq!(settings.url, "postgres://localhost:5432/configs");
    assert_eq!(settings.username, "vm");
    assert_eq!(settings.max_pool_size, 7);
}

use vm_telemetry::{
    TelemetryMetrics, init_tracing, metrics, record_primary_failed, record_primary_provisioned,
    record_primary_skipped,
};

#[test]
fn fresh_metrics_start_at_zero() {
    let snapshot = TelemetryMetrics::new().snapshot();
    assert_eq!(snapshot.primary_provisioned, 0);
    assert_eq!(snapshot.primary_skipped, 0);
    assert_eq!(snapshot.primary_failed, 0);
}

#[test]
fn record_functions_increment_global_counters() {
    let before = metrics().snapshot();
    record_primary_provisioned();
    record_primary_skipped();
    record_primary_skipped();
    record_primary_failed();
    let after = metrics().snapshot();

    // 同进程内其他测试可能并发累加，只校验下限。
    assert!(after.primary_provisioned >= before.primary_provisioned + 1);
    assert!(after.primary_skipped >= before.primary_skipped + 2);
    assert!(after.primary_failed >= before.primary_failed + 1);
}

#[test]
fn init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}

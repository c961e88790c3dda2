//! Configuration text driving acquisition.

use crate::test_utils::{recorder, Harness};
use geofix_acquisition::testing::CachedBehavior;
use geofix_core::{GeoFixConfig, UpdatePriority};
use std::time::Duration;

#[test]
fn test_toml_config_sets_deadline_and_request() {
    let config = GeoFixConfig::from_toml_str(
        r#"
        [acquisition]
        timeout_ms = 12000

        [acquisition.live]
        priority = "low_power"
        interval_ms = 60000
        fastest_interval_ms = 30000
        min_displacement_m = 100.0

        [logging]
        level = "debug"
        json = true
        "#,
    )
    .unwrap();
    assert!(config.logging.json);

    let harness = Harness::with_config(CachedBehavior::Empty, config.acquisition.clone());
    let (_outcomes, callback) = recorder();
    harness.resolver.acquire(callback);

    assert_eq!(harness.timer.last_duration(), Some(Duration::from_secs(12)));
    let request = harness.provider.last_request().unwrap();
    assert_eq!(request.priority, UpdatePriority::LowPower);
    assert_eq!(request.interval(), Duration::from_secs(60));
}

#[test]
fn test_json_config_with_missing_sections_uses_defaults() {
    let config = GeoFixConfig::from_json_str(r#"{"logging":{"level":"warn","json":false}}"#).unwrap();
    assert_eq!(config.acquisition.timeout(), Duration::from_secs(30));
    assert_eq!(config.acquisition.live.priority, UpdatePriority::HighAccuracy);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_invalid_acquisition_config_rejected() {
    assert!(GeoFixConfig::from_toml_str("[acquisition]\ntimeout_ms = 0\n").is_err());
    assert!(GeoFixConfig::from_json_str(
        r#"{"acquisition":{"live":{"interval_ms":1000,"fastest_interval_ms":5000}}}"#
    )
    .is_err());
}

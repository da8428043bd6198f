#![allow(clippy::float_cmp)]

use super::*;

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: usize = env_parse("__TOPO_TEST_MISSING_KEY__", "integer", 42).expect("default");
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__TOPO_TEST_VALID__", " 99 ") };
    let val: usize = env_parse("__TOPO_TEST_VALID__", "integer", 0).expect("parsed");
    assert_eq!(val, 99);
    unsafe { std::env::remove_var("__TOPO_TEST_VALID__") };
}

#[test]
fn env_parse_present_invalid_is_an_error() {
    unsafe { std::env::set_var("__TOPO_TEST_INVALID__", "wide") };
    let err = env_parse::<f64>("__TOPO_TEST_INVALID__", "number", 1.0).expect_err("invalid");
    assert_eq!(
        err,
        ConfigError::Invalid { key: "__TOPO_TEST_INVALID__", expected: "number", value: "wide".into() }
    );
    assert!(err.to_string().contains("__TOPO_TEST_INVALID__"));
    unsafe { std::env::remove_var("__TOPO_TEST_INVALID__") };
}

// =============================================================================
// EditorConfig
// =============================================================================

#[test]
fn defaults_match_constants() {
    let config = EditorConfig::default();
    assert_eq!(config.width, DEFAULT_VIEWPORT_WIDTH);
    assert_eq!(config.height, DEFAULT_VIEWPORT_HEIGHT);
    assert_eq!(config.client_id, DEFAULT_CLIENT_ID);
    assert_eq!(config.transition_log_capacity, DEFAULT_TRANSITION_LOG_CAPACITY);
    assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
}

#[test]
fn deserialize_fills_missing_fields_with_defaults() {
    let config: EditorConfig = serde_json::from_str(r#"{"width": 640, "client_id": 3}"#).expect("config");
    assert_eq!(config.width, 640.0);
    assert_eq!(config.height, DEFAULT_VIEWPORT_HEIGHT);
    assert_eq!(config.client_id, 3);
    assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
}

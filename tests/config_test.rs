//! 設定ファイルの読み書き

use receipt_scan::config::Config;
use receipt_scan::proxy::DEFAULT_MAX_BODY_BYTES;
use tempfile::tempdir;

#[test]
fn test_load_missing_file_returns_default() {
    let dir = tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("config.json")).unwrap();

    assert!(config.api_key.is_none());
    assert_eq!(config.bind_addr, "127.0.0.1:8787");
    assert_eq!(config.timeout_seconds, 120);
    assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
}

#[test]
fn test_save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config {
        api_key: Some("secret".into()),
        model: "test-model".into(),
        timeout_seconds: 30,
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.api_key.as_deref(), Some("secret"));
    assert_eq!(loaded.model, "test-model");
    assert_eq!(loaded.timeout_seconds, 30);
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"bind_addr": "0.0.0.0:9000", "max_body_bytes": 1048576}"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.bind_addr, "0.0.0.0:9000");
    assert_eq!(config.max_body_bytes, 1048576);
    assert_eq!(config.proxy_url, Config::default().proxy_url);
}

#[test]
fn test_malformed_file_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Config::load_from(&path).is_err());
}

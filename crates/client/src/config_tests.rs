// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use similar_asserts::assert_eq;
use tempfile::tempdir;
use yare::parameterized;

#[test]
fn minimal_config_fills_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lms.toml");
    fs::write(&path, "base_url = \"https://api.example.com\"\n").unwrap();

    let config = ClientConfig::load(&path).unwrap();
    assert_eq!(config.http.timeout_secs, 30);
    assert_eq!(config.cache.stale_time_secs, 60);
    assert_eq!(config.cache.gc_time_secs, 300);
    assert_eq!(config.cache.retry, 3);
    assert_eq!(config.realtime.stream_path, "/notifications/stream");
    assert_eq!(config.realtime.max_retries, 0);
    assert_eq!(config.logging.filter, "info");
    assert!(config.auth.token_path.is_none());
}

#[test]
fn sections_override_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lms.toml");
    fs::write(
        &path,
        r#"
base_url = "http://localhost:4000"

[cache]
stale_time_secs = 5
retry = 0

[realtime]
poll_interval_secs = 10
max_retries = 4

[auth]
token_path = "/tmp/lms-token"
"#,
    )
    .unwrap();

    let config = ClientConfig::load(&path).unwrap();
    assert_eq!(config.cache.stale_time_secs, 5);
    assert_eq!(config.cache.retry, 0);
    assert_eq!(config.cache.gc_time_secs, 300);
    assert_eq!(config.realtime.poll_interval(), Duration::from_secs(10));
    assert_eq!(config.realtime.max_retries, 4);
    assert_eq!(
        config.token_path().unwrap(),
        PathBuf::from("/tmp/lms-token")
    );
}

#[test]
fn save_then_load_preserves_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lms.toml");
    let mut config = ClientConfig::new("https://api.example.com").unwrap();
    config.cache.stale_time_secs = 120;
    config.logging.file = Some(dir.path().join("client.log"));
    config.save(&path).unwrap();

    let loaded = ClientConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[parameterized(
    ftp = { "ftp://files.example.com" },
    relative = { "/api" },
    garbage = { "not a url" },
)]
fn rejects_non_http_base_url(url: &str) {
    let err = ClientConfig::new(url).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn load_missing_file_is_config_error() {
    let dir = tempdir().unwrap();
    let err = ClientConfig::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config"));
}

#[test]
fn poll_interval_never_zero() {
    let mut realtime = RealtimeConfig::default();
    realtime.poll_interval_secs = 0;
    assert_eq!(realtime.poll_interval(), Duration::from_secs(1));
}

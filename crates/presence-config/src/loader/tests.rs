//! Tests for TOML loading and environment overrides.

use super::*;
use crate::schema::{PresenceConfig, DEFAULT_CLIENT_ID};
use std::collections::HashMap;
use std::path::Path;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_fisidi_presence.toml"));
    assert!(matches!(
        result,
        Err(presence_common::ConfigError::FileNotFound(_))
    ));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[session]
refresh_interval_ms = 20000

[activity]
details = "Development in progress"
state = "Building pijin.xyz"
large_image_key = "fisidian"
instance = false
buttons = []
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.session.refresh_interval_ms, 20_000);
    assert_eq!(config.activity.details, "Development in progress");
    assert!(!config.activity.instance);
    assert!(config.activity.buttons.is_empty());
    // Defaults preserved
    assert_eq!(config.session.max_retries, 3);
    assert_eq!(config.client.client_id, DEFAULT_CLIENT_ID);
    assert_eq!(config.activity.small_image_key, "fisidi_logo");
}

#[test]
fn load_invalid_toml_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[session\nmax_retries = ").unwrap();

    let result = load_from_path(&path);
    assert!(matches!(
        result,
        Err(presence_common::ConfigError::ParseError(_))
    ));
}

#[test]
fn missing_file_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    match load_from_path(&path) {
        Err(presence_common::ConfigError::FileNotFound(missing)) => assert_eq!(missing, path),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

#[test]
fn unreadable_path_is_not_reported_missing() {
    let dir = tempfile::tempdir().unwrap();

    let result = load_from_path(dir.path());
    assert!(matches!(
        result,
        Err(presence_common::ConfigError::ParseError(ref msg)) if msg.contains("failed to read")
    ));
}

#[test]
fn default_path_ends_with_app_dir() {
    if let Ok(path) = default_config_path() {
        assert!(path.ends_with("fisidi-presence/config.toml"));
    }
}

#[test]
fn env_overrides_client_settings() {
    let mut config = PresenceConfig::default();
    apply_overrides(
        &mut config,
        lookup(&[
            ("DISCORD_CLIENT_ID", " 42 "),
            ("DISCORD_CLIENT_SECRET", "s3cret"),
            ("PRESENCE_SCOPES", "rpc, identify"),
            ("PRESENCE_IPC_PATH", "/run/user/1000/discord-ipc-3"),
        ]),
    );

    assert_eq!(config.client.client_id, "42");
    assert_eq!(config.client.client_secret.as_deref(), Some("s3cret"));
    assert_eq!(config.client.scopes, vec!["rpc", "identify"]);
    assert_eq!(
        config.client.ipc_path.as_deref(),
        Some(Path::new("/run/user/1000/discord-ipc-3"))
    );
}

#[test]
fn empty_scope_override_disables_authorization() {
    let mut config = PresenceConfig::default();
    apply_overrides(&mut config, lookup(&[("PRESENCE_SCOPES", "")]));
    assert!(config.client.scopes.is_empty());
}

#[test]
fn no_env_leaves_config_untouched() {
    let mut config = PresenceConfig::default();
    apply_overrides(&mut config, lookup(&[]));
    assert_eq!(config, PresenceConfig::default());
}

#[test]
fn blank_secret_is_ignored() {
    let mut config = PresenceConfig::default();
    apply_overrides(&mut config, lookup(&[("DISCORD_CLIENT_SECRET", "  ")]));
    assert!(config.client.client_secret.is_none());
}

#[test]
fn parse_scopes_splits_on_space_and_comma() {
    assert_eq!(
        parse_scopes("rpc activities.write,identify"),
        vec!["rpc", "activities.write", "identify"]
    );
    assert!(parse_scopes("  ,  ").is_empty());
}

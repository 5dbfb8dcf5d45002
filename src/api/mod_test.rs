use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use serial_test::serial;

use super::{Config, DEFAULT_PORT, ServerError};
use crate::paths::default_db_path;

fn clear_env() {
    unsafe {
        env::remove_var("VF_HOST");
        env::remove_var("VF_PORT");
        env::remove_var("VF_DB_PATH");
    }
}

#[test]
#[serial]
fn test_config_defaults() {
    clear_env();
    let config = Config::new().expect("Config should load");
    assert_eq!(config.host, "0.0.0.0".parse::<IpAddr>().unwrap());
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.db_path, default_db_path());
}

#[test]
#[serial]
fn test_config_new_respects_env_vars() {
    clear_env();
    unsafe {
        env::set_var("VF_HOST", "127.0.0.1");
        env::set_var("VF_PORT", "4040");
        env::set_var("VF_DB_PATH", "/tmp/vf-env-test.db");
    }

    let config = Config::new().expect("Config should load");
    assert_eq!(config.host, "127.0.0.1".parse::<IpAddr>().unwrap());
    assert_eq!(config.port, 4040);
    assert_eq!(config.db_path, PathBuf::from("/tmp/vf-env-test.db"));

    clear_env();
}

#[test]
#[serial]
fn test_config_precedence_cli_over_env() {
    clear_env();
    unsafe {
        env::set_var("VF_PORT", "4040");
        env::set_var("VF_DB_PATH", "/tmp/vf-env-precedence.db");
    }

    let config = Config::new()
        .expect("Config should load")
        .with_port(5050)
        .with_db_path(PathBuf::from("/tmp/vf-cli-precedence.db"));

    assert_eq!(config.port, 5050, "CLI flag should override env var");
    assert_eq!(config.db_path, PathBuf::from("/tmp/vf-cli-precedence.db"));

    clear_env();
}

#[test]
#[serial]
fn test_config_rejects_invalid_port() {
    clear_env();
    unsafe {
        env::set_var("VF_PORT", "not-a-port");
    }

    let result = Config::new();
    assert!(matches!(result, Err(ServerError::Config { .. })));

    clear_env();
}

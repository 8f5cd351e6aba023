//! Config loading: defaults, partial overrides, and error messages.

use std::fs;
use std::path::PathBuf;

use sentinel_core::{
    config::{self, config_path_at},
    Config, Multiplexer, SentinelError,
};
use tempfile::TempDir;

fn write_default_config(home: &TempDir, yaml: &str) -> PathBuf {
    let path = config_path_at(home.path());
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, yaml).expect("write config");
    path
}

#[test]
fn missing_default_config_falls_back_to_builtin_defaults() {
    let home = TempDir::new().expect("home");
    let config = config::load_at(home.path(), None).expect("load");

    assert_eq!(config.backup_interval_hours, 12);
    assert_eq!(config.purge_interval_hours, 24);
    assert_eq!(config.poll_quantum_seconds, 10);
    assert_eq!(config.server.session_name, "solar");
    assert_eq!(config.backup.prefix, "autobackup-");
    assert_eq!(config.multiplexer, Multiplexer::Screen);
    assert_eq!(config.backup.base_dir, home.path().to_path_buf());
    assert_eq!(
        config.server.jar_path,
        home.path().join("solar-smp").join("server.jar")
    );
}

#[test]
fn partial_yaml_overrides_only_named_fields() {
    let home = TempDir::new().expect("home");
    write_default_config(
        &home,
        "backup_interval_hours: 6\nmultiplexer: tmux\nserver:\n  session_name: lunar\n  dir: /srv/lunar\n",
    );

    let config = config::load_at(home.path(), None).expect("load");

    assert_eq!(config.backup_interval_hours, 6);
    assert_eq!(config.purge_interval_hours, 24);
    assert_eq!(config.multiplexer, Multiplexer::Tmux);
    assert_eq!(config.server.session_name, "lunar");
    assert_eq!(config.server.memory_max, "7G");
    assert_eq!(
        config.crash_reports_dir(),
        PathBuf::from("/srv/lunar/crash-reports")
    );
}

#[test]
fn tilde_items_and_crash_dir_resolve_against_home_not_server_dir() {
    let home = TempDir::new().expect("home");
    write_default_config(
        &home,
        "server:\n  crash_reports: ~/crashes\nbackup:\n  items: ['~/world', banned-ips.json]\n",
    );

    let config = config::load_at(home.path(), None).expect("load");

    assert_eq!(
        config.backup_items(),
        vec![
            home.path().join("world"),
            home.path().join("solar-smp").join("banned-ips.json"),
        ]
    );
    assert_eq!(config.crash_reports_dir(), home.path().join("crashes"));
}

#[test]
fn explicit_config_path_must_exist() {
    let home = TempDir::new().expect("home");
    let missing = home.path().join("nope.yaml");

    let err = config::load_at(home.path(), Some(&missing)).unwrap_err();

    assert!(matches!(err, SentinelError::Io { .. }), "got: {err}");
    assert!(err.to_string().contains("nope.yaml"));
}

#[test]
fn malformed_yaml_reports_path() {
    let home = TempDir::new().expect("home");
    let path = write_default_config(&home, "backup_interval_hours: [unclosed");

    let err = config::load_at(home.path(), None).unwrap_err();

    assert!(matches!(err, SentinelError::ConfigParse { .. }), "got: {err}");
    assert!(err.to_string().contains(&path.display().to_string()));
}

#[test]
fn unknown_fields_are_rejected() {
    let home = TempDir::new().expect("home");
    write_default_config(&home, "backup_intervl_hours: 3\n");

    let err = config::load_at(home.path(), None).unwrap_err();
    assert!(matches!(err, SentinelError::ConfigParse { .. }), "got: {err}");
}

#[test]
fn zero_intervals_and_empty_names_are_invalid() {
    for yaml in [
        "backup_interval_hours: 0\n",
        "purge_interval_hours: 0\n",
        "poll_quantum_seconds: 0\n",
        "server:\n  session_name: '  '\n",
        "backup:\n  prefix: ''\n",
    ] {
        let home = TempDir::new().expect("home");
        write_default_config(&home, yaml);
        let err = config::load_at(home.path(), None).unwrap_err();
        assert!(
            matches!(err, SentinelError::Invalid(_)),
            "expected invalid for {yaml:?}, got: {err}"
        );
    }
}

#[test]
fn effective_config_serializes_back_to_loadable_yaml() {
    let home = TempDir::new().expect("home");
    let config = config::load_at(home.path(), None).expect("load");

    let yaml = serde_yaml::to_string(&config).expect("serialize");
    let explicit = home.path().join("effective.yaml");
    fs::write(&explicit, yaml).expect("write");

    let reloaded: Config = config::load_at(home.path(), Some(&explicit)).expect("reload");
    assert_eq!(reloaded, config);
}

//! Tests for the logging system

use super::*;

#[test]
fn test_log_level_display() {
    assert_eq!(LogLevel::Trace.to_string(), "trace");
    assert_eq!(LogLevel::Debug.to_string(), "debug");
    assert_eq!(LogLevel::Info.to_string(), "info");
    assert_eq!(LogLevel::Warn.to_string(), "warn");
    assert_eq!(LogLevel::Error.to_string(), "error");
}

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.format, LogFormat::Text);
    assert_eq!(config.output, LogOutput::Console);
    assert_eq!(config.rotation, RotationStrategy::Daily);
    assert!(config.log_directory.ends_with("logs"));
    assert_eq!(config.filter_directives(), "info");
}

#[test]
fn test_output_destinations() {
    assert!(LogOutput::Console.to_console());
    assert!(!LogOutput::Console.to_file());
    assert!(!LogOutput::File.to_console());
    assert!(LogOutput::File.to_file());
    assert!(LogOutput::Both.to_console() && LogOutput::Both.to_file());
}

#[test]
fn test_verbose_override_keeps_module_levels() {
    let mut config = LoggingConfig::default();
    config
        .module_levels
        .insert("tower_http".to_string(), LogLevel::Warn);

    let config = config.with_level(LogLevel::Debug);
    assert_eq!(config.filter_directives(), "debug,tower_http=warn");
}

#[test]
fn test_filter_directives_sorted_by_target() {
    let config: LoggingConfig = serde_json::from_str(
        r#"{
            "level": "warn",
            "module_levels": {"tower_http": "debug", "asset_caps::caps": "trace"}
        }"#,
    )
    .unwrap();

    assert_eq!(
        config.filter_directives(),
        "warn,asset_caps::caps=trace,tower_http=debug"
    );
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: LoggingConfig = serde_json::from_str(
        r#"{"level": "debug", "output": "both", "format": "json", "rotation": "never", "log_directory": "/var/log/caps"}"#,
    )
    .unwrap();
    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(config.output, LogOutput::Both);
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.rotation, RotationStrategy::Never);
    assert_eq!(config.log_directory, std::path::PathBuf::from("/var/log/caps"));
    assert!(config.module_levels.is_empty());
}

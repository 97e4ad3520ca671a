use config_engine::{ConfigError, ConfigLoader, Environment};
use logger_redacted::LogFormat;
use secrecy::ExposeSecret;
use std::fs;
use std::path::PathBuf;

fn write_temp(extension: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("nightingale-{}.{extension}", uuid::Uuid::new_v4()));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn defaults_load_without_sources() {
    let config = ConfigLoader::new().without_env().load_validated().unwrap();

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.authority.token_ttl_secs, 3600);
    assert_eq!(config.authority.refresh_threshold_secs, 300);
    assert_eq!(config.provenance.max_refs_per_chunk, 3);
    assert_eq!(config.pipeline.retry.max_attempts, 3);
    assert_eq!(config.compliance.retention.max_age_days, 30);
    assert!(config.compliance.hipaa_mode);
}

#[test]
fn file_values_override_defaults() {
    let path = write_temp(
        "toml",
        r#"
environment = "staging"

[authority]
token_ttl_secs = 900

[logging]
level = "debug"
format = "json"

[pipeline.retry]
max_attempts = 5
"#,
    );

    let config = ConfigLoader::new().without_env().with_file(&path).load_validated().unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(config.environment, Environment::Staging);
    assert_eq!(config.authority.token_ttl_secs, 900);
    assert_eq!(config.authority.leeway_secs, 30);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.pipeline.retry.max_attempts, 5);
    assert_eq!(config.pipeline.retry.initial_backoff_ms, 200);
}

#[test]
fn overrides_take_precedence_over_the_file() {
    let path = write_temp("yaml", "environment: testing\nauthority:\n  issuer: from-file\n");

    let config = ConfigLoader::new()
        .without_env()
        .with_file(&path)
        .with_override("authority.issuer", "from-override")
        .load()
        .unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(config.environment, Environment::Testing);
    assert_eq!(config.authority.issuer, "from-override");
}

#[test]
fn production_requires_real_secrets() {
    let loader = ConfigLoader::new()
        .without_env()
        .with_override("environment", "production");

    let error = loader.load_validated().unwrap_err();
    assert!(matches!(error, ConfigError::Invalid { .. }));
    assert!(!error.to_string().contains("nightingale-development-signing-secret"));

    let config = loader
        .with_override("authority.signing_secret", "a-production-secret-of-sufficient-length")
        .with_override("authority.subject_salt", "a-production-salt")
        .load_validated()
        .unwrap();
    assert_eq!(
        config.authority.signing_secret.expose_secret(),
        "a-production-secret-of-sufficient-length"
    );
}

#[test]
fn missing_file_is_a_load_error() {
    let error = ConfigLoader::new()
        .without_env()
        .with_file("/nonexistent/nightingale.toml")
        .load()
        .unwrap_err();
    assert!(matches!(error, ConfigError::Load(_)));
}

#[test]
fn summary_hides_secrets() {
    let config = ConfigLoader::new().without_env().load().unwrap();
    let json = serde_json::to_string(&config.summary()).unwrap();

    assert!(json.contains("\"environment\":\"development\""));
    assert!(!json.contains("signing"));
    assert!(!json.contains("nightingale-development"));
}

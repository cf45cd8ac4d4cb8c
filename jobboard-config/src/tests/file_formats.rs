use crate::{ConfigError, ConfigProvider, JobBoardConfig};
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_empty_directory_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let config = ConfigProvider::new(temp.path()).load().unwrap();
    assert_eq!(config, JobBoardConfig::default());
}

#[test]
#[serial]
fn test_toml_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("jobboard.toml"),
        r#"
submission_duration = 30
geolocation_enabled = false
admin_url = "https://jobs.example.com/wp-admin/"
fields_dir = "/srv/jobboard/fields"
"#,
    )
    .unwrap();

    let config = ConfigProvider::new(temp.path()).load().unwrap();
    assert_eq!(config.submission_duration_days(), Some(30));
    assert!(!config.geolocation_enabled);
    assert_eq!(config.admin_url, "https://jobs.example.com/wp-admin/");
    assert_eq!(config.fields_dir, Some(PathBuf::from("/srv/jobboard/fields")));
    // untouched keys keep their defaults
    assert!(config.enable_types);
    assert_eq!(config.nonce_lifetime_hours, 24);
}

#[test]
#[serial]
fn test_yaml_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("jobboard.yaml"),
        "multi_job_type: true\nnonce_secret: s3cret\n",
    )
    .unwrap();

    let config = ConfigProvider::new(temp.path()).load().unwrap();
    assert!(config.multi_job_type);
    assert_eq!(config.nonce_secret, "s3cret");
}

#[test]
#[serial]
fn test_invalid_lifetime_is_rejected() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("jobboard.json"),
        r#"{ "nonce_lifetime_hours": 0 }"#,
    )
    .unwrap();

    let err = ConfigProvider::new(temp.path()).load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
#[serial]
fn test_wrong_type_is_parse_error() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("jobboard.toml"),
        "geolocation_enabled = \"sometimes\"\n",
    )
    .unwrap();

    let err = ConfigProvider::new(temp.path()).load().unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

use crate::ConfigProvider;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

#[test]
#[serial]
fn test_json_overrides_toml() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("jobboard.toml"),
        "submission_duration = 30\nenable_types = false\n",
    )
    .unwrap();
    fs::write(
        temp.path().join("jobboard.json"),
        r#"{ "submission_duration": 60 }"#,
    )
    .unwrap();

    let config = ConfigProvider::new(temp.path()).load().unwrap();
    assert_eq!(config.submission_duration_days(), Some(60));
    assert!(!config.enable_types);
}

#[test]
#[serial]
fn test_environment_overrides_files() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("jobboard.toml"),
        "submission_duration = 30\ngeolocation_enabled = true\n",
    )
    .unwrap();

    std::env::set_var("JOBBOARD_SUBMISSION_DURATION", "14");
    std::env::set_var("JOBBOARD_GEOLOCATION_ENABLED", "false");

    let result = ConfigProvider::new(temp.path()).load();

    std::env::remove_var("JOBBOARD_SUBMISSION_DURATION");
    std::env::remove_var("JOBBOARD_GEOLOCATION_ENABLED");

    let config = result.unwrap();
    assert_eq!(config.submission_duration_days(), Some(14));
    assert!(!config.geolocation_enabled);
}

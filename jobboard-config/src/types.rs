//! The settings shape for the job board write panels

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{ConfigError, ConfigResult};

/// Settings for the job listing write panels.
///
/// Every key has a default, so an empty configuration directory and an empty
/// environment still produce a usable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobBoardConfig {
    /// Default listing lifetime in days. `None` or `0` means listings never
    /// get a computed expiry date.
    pub submission_duration: Option<u32>,
    /// Whether saving a location may trigger geocoding.
    pub geolocation_enabled: bool,
    /// Whether the job-type taxonomy panel is shown at all.
    pub enable_types: bool,
    /// Whether a listing may carry more than one job type.
    pub multi_job_type: bool,
    /// Base URL of the admin area, used for user-edit links.
    pub admin_url: String,
    /// How long a form nonce stays valid.
    pub nonce_lifetime_hours: u32,
    /// Secret mixed into nonce hashes.
    pub nonce_secret: String,
    /// Directory holding extra YAML field definitions.
    pub fields_dir: Option<PathBuf>,
}

impl Default for JobBoardConfig {
    fn default() -> Self {
        Self {
            submission_duration: None,
            geolocation_enabled: true,
            enable_types: true,
            multi_job_type: false,
            admin_url: "/wp-admin/".to_string(),
            nonce_lifetime_hours: 24,
            nonce_secret: String::new(),
            fields_dir: None,
        }
    }
}

impl JobBoardConfig {
    /// The configured listing lifetime, treating `0` as unset.
    pub fn submission_duration_days(&self) -> Option<u32> {
        self.submission_duration.filter(|days| *days > 0)
    }

    /// Join a path onto the admin base URL.
    pub fn admin_url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.admin_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Reject values that cannot work at runtime.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.nonce_lifetime_hours == 0 {
            return Err(ConfigError::invalid_value(
                "nonce_lifetime_hours",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

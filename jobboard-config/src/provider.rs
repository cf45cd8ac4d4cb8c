//! Configuration provider using Figment

use crate::discovery::{discover, ConfigFile, ConfigFormat};
use crate::{ConfigResult, JobBoardConfig};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use std::path::PathBuf;
use tracing::{debug, trace};

/// Prefix for environment overrides, e.g. `JOBBOARD_SUBMISSION_DURATION=30`.
pub const ENV_PREFIX: &str = "JOBBOARD_";

/// Loads [`JobBoardConfig`] from defaults, files in one directory and the
/// environment. Nothing is cached; every `load` reads the sources again.
pub struct ConfigProvider {
    config_dir: PathBuf,
}

impl ConfigProvider {
    /// Create a provider reading files from `config_dir`
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Load and validate the settings
    pub fn load(&self) -> ConfigResult<JobBoardConfig> {
        let config: JobBoardConfig = self.build_figment().extract()?;
        config.validate()?;
        debug!(
            dir = %self.config_dir.display(),
            submission_duration = ?config.submission_duration_days(),
            geolocation = config.geolocation_enabled,
            "loaded job board configuration"
        );
        Ok(config)
    }

    /// Build the figment with all sources in precedence order
    fn build_figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(JobBoardConfig::default()));

        for file in discover(&self.config_dir) {
            figment = figment.merge(Self::file_provider(&file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    fn file_provider(file: &ConfigFile) -> Figment {
        trace!(
            "Loading config file: {} ({:?})",
            file.path.display(),
            file.format
        );
        match file.format {
            ConfigFormat::Toml => Figment::from(Toml::file(&file.path)),
            ConfigFormat::Yaml => Figment::from(Yaml::file(&file.path)),
            ConfigFormat::Json => Figment::from(Json::file(&file.path)),
        }
    }
}

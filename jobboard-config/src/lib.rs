//! Job board configuration using Figment
//!
//! Settings that steer the listing write panels: the default listing lifetime,
//! whether geolocation runs on save, how the job-type taxonomy panel behaves,
//! nonce parameters and where extra field definitions live.
//!
//! # Sources
//!
//! Later sources override earlier ones:
//!
//! 1. Built-in defaults ([`JobBoardConfig::default`])
//! 2. `jobboard.toml` in the configuration directory
//! 3. `jobboard.yaml` / `jobboard.yml`
//! 4. `jobboard.json`
//! 5. `JOBBOARD_`-prefixed environment variables
//!
//! ```no_run
//! use jobboard_config::ConfigProvider;
//!
//! let config = ConfigProvider::new("/etc/jobboard").load()?;
//! if let Some(days) = config.submission_duration_days() {
//!     println!("listings run for {days} days");
//! }
//! # Ok::<(), jobboard_config::ConfigError>(())
//! ```

pub mod discovery;
pub mod error;
pub mod provider;
pub mod types;

pub use discovery::{ConfigFile, ConfigFormat};
pub use error::{ConfigError, ConfigResult};
pub use provider::{ConfigProvider, ENV_PREFIX};
pub use types::JobBoardConfig;

#[cfg(test)]
mod tests;

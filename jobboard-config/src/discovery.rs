//! Configuration file discovery
//!
//! Looks for `jobboard.{toml,yaml,yml,json}` in a single directory and
//! returns the files that exist in merge order.

use std::path::{Path, PathBuf};
use tracing::trace;

/// Base name shared by every configuration file.
pub const CONFIG_FILE_STEM: &str = "jobboard";

/// A discovered configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub format: ConfigFormat,
}

/// Configuration file format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Merge order: later entries override earlier ones.
const EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

/// Find the configuration files present in `dir`, in merge order.
pub fn discover(dir: &Path) -> Vec<ConfigFile> {
    EXTENSIONS
        .iter()
        .filter_map(|ext| {
            let path = dir.join(format!("{CONFIG_FILE_STEM}.{ext}"));
            if !path.is_file() {
                return None;
            }
            let format = ConfigFormat::from_extension(ext)?;
            trace!("found config file: {}", path.display());
            Some(ConfigFile { path, format })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_orders_by_format() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("jobboard.json"), "{}").unwrap();
        fs::write(temp.path().join("jobboard.toml"), "").unwrap();
        fs::write(temp.path().join("other.toml"), "").unwrap();

        let found = discover(temp.path());
        let formats: Vec<_> = found.iter().map(|f| f.format).collect();
        assert_eq!(formats, vec![ConfigFormat::Toml, ConfigFormat::Json]);
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(discover(&temp.path().join("nope")).is_empty());
    }
}

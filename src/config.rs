use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};

use crate::geometry::RaycastMode;

/// Kernel configuration, loaded once at startup.
///
/// None of these values feed into collision arithmetic, so changing them never
/// affects determinism: thread counts only change *where* work runs, and every
/// parallel-for index writes its own result.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct KernelConfig {
    pub scheduler: SchedulerConfig,
    /// Which edge hit box raycasts report.
    pub raycast_mode: RaycastMode,
}

/// Settings for a [`Scheduler`](crate::jobs::Scheduler).
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Threads in the parallel-for pool. 0 lets rayon pick (one per core).
    pub parallel_threads: usize,
    /// Name of the worker thread; pool threads get `<name>-par-<i>`.
    pub worker_name: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            parallel_threads: 0,
            worker_name: "peregrine-jobs".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse kernel config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

impl KernelConfig {
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    /// Loads the config at `path`, falling back to defaults (and logging why)
    /// if it is missing or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded kernel config from {}", path.display());
                config
            }
            Err(e) => {
                error!("Failed to load kernel config: {}", e);
                error!("Using default KernelConfig");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_config_parses() {
        let config = KernelConfig::from_ron_str(include_str!("../assets/kernel_config.ron")).unwrap();
        assert_eq!(config, KernelConfig::default());
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config = KernelConfig::from_ron_str("(raycast_mode: Nearest)").unwrap();
        assert_eq!(config.raycast_mode, RaycastMode::Nearest);
        assert_eq!(config.scheduler, SchedulerConfig::default());

        let config = KernelConfig::from_ron_str("(scheduler: (parallel_threads: 3))").unwrap();
        assert_eq!(config.scheduler.parallel_threads, 3);
        assert_eq!(config.scheduler.worker_name, "peregrine-jobs");
    }

    #[test]
    fn test_malformed_config_is_a_parse_error() {
        assert!(matches!(
            KernelConfig::from_ron_str("(raycast_mode: Sideways)"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let path = std::env::temp_dir().join("peregrine_kernel_missing_config.ron");
        assert!(matches!(KernelConfig::load(&path), Err(ConfigError::Io { .. })));
        assert_eq!(KernelConfig::load_or_default(&path), KernelConfig::default());
    }
}

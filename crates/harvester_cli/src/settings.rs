use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use harvester_engine::HarvestConfig;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// One subject and the listing page to harvest on each site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    pub subject_id: String,
    /// Site id to listing URL. Empty URLs are skipped.
    pub links: BTreeMap<String, String>,
}

/// No path means built-in defaults. A path that cannot be read is an error.
pub fn load_config(path: Option<&Path>) -> Result<HarvestConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(HarvestConfig::default());
    };
    let config = read_ron(path)?;
    engine_info!("Loaded settings from {:?}", path);
    Ok(config)
}

pub fn load_jobs(path: &Path) -> Result<Vec<Job>, ConfigError> {
    read_ron(path)
}

fn read_ron<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

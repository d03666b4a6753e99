//! Configuration discovery.
//!
//! Searches upward from the working directory, checking each directory for
//! a dedicated config file and then for a `"velo"` key in `package.json`,
//! the way cosmiconfig-style loaders resolve project configuration.

use super::model::Config;
use crate::errors::ConfigError;
use std::io;
use std::path::Path;

const CONFIG_FILES: [&str; 2] = ["velo.json", ".velorc.json"];
const MANIFEST_FILE: &str = "package.json";
const MANIFEST_KEY: &str = "velo";

impl Config {
    /// Searches upward from `root` for a velo configuration.
    ///
    /// The first directory providing one wins; within a directory,
    /// dedicated config files take precedence over the manifest key.
    pub async fn discover(root: &Path) -> Result<Self, ConfigError> {
        for dir in root.ancestors() {
            if let Some(config) = load_from_dir(dir).await? {
                return Ok(config);
            }
        }

        Err(ConfigError::NotFound {
            root: root.to_path_buf(),
        })
    }
}

async fn load_from_dir(dir: &Path) -> Result<Option<Config>, ConfigError> {
    for file in CONFIG_FILES {
        let path = dir.join(file);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let config = serde_json::from_slice(&bytes)
                    .map_err(|source| ConfigError::Parse { path, source })?;
                return Ok(Some(config));
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(ConfigError::Read { path, source }),
        }
    }

    let path = dir.join(MANIFEST_FILE);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let manifest: serde_json::Value = serde_json::from_slice(&bytes)
                .map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
            match manifest.get(MANIFEST_KEY) {
                Some(value) => {
                    let config = serde_json::from_value(value.clone())
                        .map_err(|source| ConfigError::Parse { path, source })?;
                    Ok(Some(config))
                }
                None => Ok(None),
            }
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Read { path, source }),
    }
}

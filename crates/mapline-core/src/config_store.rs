//! Partner configuration lookup.

use std::fs;
use std::path::{Path, PathBuf};

use mapline_model::{PartnerConfig, normalize_partner_id};
use tracing::{debug, warn};

use crate::error::ConfigStoreError;

/// Source of partner configurations.
pub trait ConfigStore: Send + Sync {
    /// Load and validate one partner's configuration.
    fn load(&self, partner_id: &str) -> Result<PartnerConfig, ConfigStoreError>;

    /// Identifiers of every available configuration, sorted.
    fn list(&self) -> Result<Vec<String>, ConfigStoreError>;
}

/// Reads `<dir>/<partner_id>.json` files.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    dir: PathBuf,
}

impl JsonConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, partner_id: &str) -> PathBuf {
        self.dir.join(format!("{partner_id}.json"))
    }

    /// Parse a configuration file at an arbitrary path.
    pub fn load_path(path: &Path) -> Result<PartnerConfig, ConfigStoreError> {
        if !path.is_file() {
            return Err(ConfigStoreError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigStoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        PartnerConfig::from_json_str(&text).map_err(|source| ConfigStoreError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self, partner_id: &str) -> Result<PartnerConfig, ConfigStoreError> {
        let id = normalize_partner_id(partner_id)
            .map_err(|message| ConfigStoreError::InvalidPartnerId { message })?;
        let path = self.path_for(&id);
        let config = Self::load_path(&path)?;
        if config.partner_id != id {
            warn!(
                file = %path.display(),
                partner_id = %config.partner_id,
                "partner_id in configuration differs from file name"
            );
        }
        debug!(partner_id = %id, path = %path.display(), "loaded partner configuration");
        Ok(config)
    }

    fn list(&self) -> Result<Vec<String>, ConfigStoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| ConfigStoreError::Read {
            path: self.dir.clone(),
            source,
        })?;
        let mut ids: Vec<String> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
            })
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }
}

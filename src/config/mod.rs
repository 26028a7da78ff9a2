use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::calc::BudgetCalculator;
use crate::domain::DEFAULT_DAILY_TITLE;
use crate::errors::ConfigError;
use crate::storage::{JsonFileStore, StoreResult};
use crate::utils::{
    paths::{app_data_dir, config_file_in, store_file_in},
    persistence::{ensure_dir, write_atomic},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub locale: String,
    pub currency: String,
    /// Title of the category that absorbs the uncategorised remainder.
    pub daily_category_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_opened_budget: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            daily_category_title: DEFAULT_DAILY_TITLE.into(),
            data_file: None,
            last_opened_budget: None,
        }
    }
}

impl Config {
    pub fn calculator(&self) -> BudgetCalculator {
        BudgetCalculator::new(self.daily_category_title.clone())
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json =
            serde_json::to_string_pretty(config).map_err(|err| ConfigError::Serde(err.to_string()))?;
        write_atomic(&self.path, &json)?;
        debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Store file named by `config`, or `store.json` in the base directory.
    pub fn store_path(&self, config: &Config) -> PathBuf {
        config
            .data_file
            .clone()
            .unwrap_or_else(|| store_file_in(&self.base))
    }

    pub fn open_store(&self, config: &Config) -> StoreResult<JsonFileStore> {
        JsonFileStore::open(self.store_path(config))
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::error;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PredictionConfig {
    host: String,
    port: u16,
    model_path: PathBuf,
    reload_on_request: bool,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            model_path: PathBuf::from("model.json"),
            reload_on_request: false,
        }
    }
}

impl PredictionConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Reload the artifact from disk on every prediction instead of once at startup.
    pub fn reload_on_request(&self) -> bool {
        self.reload_on_request
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    host: String,
    port: u16,
    rentals_path: PathBuf,
    successive_path: PathBuf,
    successive_clean_path: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8501,
            rentals_path: PathBuf::from("data/dataset_clean.csv"),
            successive_path: PathBuf::from("data/dataset_join.csv"),
            successive_clean_path: PathBuf::from("data/dataset_join_clean.csv"),
        }
    }
}

impl DashboardConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn rentals_path(&self) -> &Path {
        &self.rentals_path
    }

    pub fn successive_path(&self) -> &Path {
        &self.successive_path
    }

    pub fn successive_clean_path(&self) -> &Path {
        &self.successive_clean_path
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    prediction: PredictionConfig,
    dashboard: DashboardConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error reading config: {0}")]
    Confy(#[from] confy::ConfyError),
}

impl Config {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Config> {
        match Config::load_or_create(path) {
            Ok(cfg) => Some(cfg),
            Err(err) => {
                error!("Failed to load configuration: {}", err);
                None
            }
        }
    }

    fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        if path.exists() {
            let cfg: Self = confy::load_path(path)?;
            Ok(cfg)
        } else {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            let cfg = Config::default();
            confy::store_path(path, &cfg)?;
            Ok(cfg)
        }
    }

    pub fn prediction(&self) -> &PredictionConfig {
        &self.prediction
    }

    pub fn dashboard(&self) -> &DashboardConfig {
        &self.dashboard
    }
}

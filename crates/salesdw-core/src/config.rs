//! Configuration schema (salesdw.toml)

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::schema::Entity;

/// Environment variable overriding `extract_dir`
pub const ENV_EXTRACT_DIR: &str = "SALESDW_EXTRACT_DIR";

/// Environment variable overriding `warehouse_path`
pub const ENV_WAREHOUSE_PATH: &str = "SALESDW_WAREHOUSE_PATH";

/// How the schema reset relates to the load transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetPolicy {
    /// Drop/create runs inside the load transaction; a failed run leaves
    /// the previous load untouched
    #[default]
    Transactional,

    /// Drop/create is committed before loading; a failed run leaves the
    /// schema in place with every table empty
    Eager,
}

impl std::fmt::Display for ResetPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transactional => write!(f, "transactional"),
            Self::Eager => write!(f, "eager"),
        }
    }
}

/// File names of the three extracts inside `extract_dir`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractFiles {
    #[serde(default = "default_customers_file")]
    pub customers: String,

    #[serde(default = "default_products_file")]
    pub products: String,

    #[serde(default = "default_sales_file")]
    pub sales: String,
}

impl ExtractFiles {
    /// File name for an entity
    pub fn file_for(&self, entity: Entity) -> &str {
        match entity {
            Entity::Customer => &self.customers,
            Entity::Product => &self.products,
            Entity::Sale => &self.sales,
        }
    }
}

impl Default for ExtractFiles {
    fn default() -> Self {
        Self {
            customers: default_customers_file(),
            products: default_products_file(),
            sales: default_sales_file(),
        }
    }
}

fn default_customers_file() -> String {
    "customers_data_prepared.csv".to_string()
}

fn default_products_file() -> String {
    "products_data_prepared.csv".to_string()
}

fn default_sales_file() -> String {
    "sales_data_prepared.csv".to_string()
}

fn default_extract_dir() -> PathBuf {
    PathBuf::from("data").join("prepared")
}

fn default_warehouse_path() -> PathBuf {
    PathBuf::from("data").join("dw").join("smart_sales.db")
}

fn default_artifact_columns() -> Vec<String> {
    vec![
        r"^Unnamed: \d+$".to_string(),
        "^index$".to_string(),
        "^level_0$".to_string(),
        r"^\s*$".to_string(),
    ]
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the prepared extracts
    #[serde(default = "default_extract_dir")]
    pub extract_dir: PathBuf,

    /// SQLite warehouse file
    #[serde(default = "default_warehouse_path")]
    pub warehouse_path: PathBuf,

    /// Whether the schema reset shares the load transaction
    #[serde(default)]
    pub reset_policy: ResetPolicy,

    /// Reject the load when a sale references a missing customer/product
    #[serde(default)]
    pub enforce_foreign_keys: bool,

    /// Regex patterns for index/artifact columns dropped during normalization
    #[serde(default = "default_artifact_columns")]
    pub artifact_columns: Vec<String>,

    /// Extract file names
    #[serde(default)]
    pub extracts: ExtractFiles,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extract_dir: default_extract_dir(),
            warehouse_path: default_warehouse_path(),
            reset_policy: ResetPolicy::default(),
            enforce_foreign_keys: false,
            artifact_columns: default_artifact_columns(),
            extracts: ExtractFiles::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.artifact_patterns()?;
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Apply `SALESDW_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_EXTRACT_DIR).filter(|v| !v.is_empty()) {
            self.extract_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup(ENV_WAREHOUSE_PATH).filter(|v| !v.is_empty()) {
            self.warehouse_path = PathBuf::from(path);
        }
    }

    /// Resolve a possibly relative path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Full path of the extract for an entity
    pub fn extract_path(&self, entity: Entity) -> PathBuf {
        self.resolve(&self.extract_dir).join(self.extracts.file_for(entity))
    }

    /// Full path of the warehouse file
    pub fn warehouse_file(&self) -> PathBuf {
        self.resolve(&self.warehouse_path)
    }

    /// Compile the artifact column patterns
    pub fn artifact_patterns(&self) -> Result<Vec<Regex>, ConfigError> {
        self.artifact_columns
            .iter()
            .map(|p| Regex::new(p).map_err(|e| ConfigError::InvalidPattern(p.clone(), e.to_string())))
            .collect()
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid artifact column pattern '{0}': {1}")]
    InvalidPattern(String, String),
}

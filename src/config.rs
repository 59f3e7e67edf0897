use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// The password is never stored here; it is asked for on every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConnection {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
    pub tls: bool,
}

impl Default for DatabaseConnection {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            database: "loja".to_string(),
            tls: false,
        }
    }
}

impl DatabaseConnection {
    pub fn to_pg_config(&self, password: &str) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(password)
            .dbname(&self.database)
            .application_name("loja-verify");
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnCreateOrderFailure {
    Skip,
    UseFallbackId(i32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub prompt_before_mutation: bool,
    pub min_row_threshold: i64,
    pub sample_size: i64,
    pub on_create_order_failure: OnCreateOrderFailure,
    pub probe_order_id: i32,
    pub customer_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            prompt_before_mutation: true,
            min_row_threshold: 3,
            sample_size: 3,
            on_create_order_failure: OnCreateOrderFailure::Skip,
            probe_order_id: 1,
            customer_id: 1,
            product_id: 1,
            quantity: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: DatabaseConnection,
    pub pipeline: PipelineConfig,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection: DatabaseConnection::default(),
            pipeline: PipelineConfig::default(),
            log_file: PathBuf::from("verificacao_loja.log"),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        let base = match dirs::config_dir() {
            Some(dir) => dir,
            None => dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?
                .join(".config"),
        };
        Ok(base.join("loja-verify").join("config.json"))
    }
}

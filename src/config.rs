use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_NODE_NAME: &str = "etfwatch-server";
const DEFAULT_DATA_DIR: &str = "docs/data";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_RELOAD_INTERVAL_SECS: u64 = 300;
const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(String, #[source] std::io::Error),

    #[error("Failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

// YAML-serializable configuration structure
#[derive(Serialize, Deserialize, Debug)]
pub struct ConfigYaml {
    pub node_name: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub port: Option<u16>,
    pub environment: Option<String>,
    pub reload_interval_secs: Option<u64>,
    pub page_size: Option<usize>,
}

// Holds application-wide settings
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub node_name: String,
    pub data_dir: PathBuf,
    pub port: u16,
    pub environment: String,
    pub reload_interval: Duration,
    pub page_size: usize,
}

impl AppConfig {
    // Load configuration from YAML file or environment variables
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(config_file) = env::var("CONFIG_FILE") {
            Self::from_yaml(&config_file)
        } else {
            dotenvy::dotenv().ok(); // Load .env file if present
            Ok(Self::from_vars(|key| env::var(key).ok()))
        }
    }

    pub fn from_yaml(file_path: &str) -> Result<Self, ConfigError> {
        let yaml_content =
            fs::read_to_string(file_path).map_err(|e| ConfigError::Read(file_path.to_string(), e))?;
        Self::from_yaml_str(&yaml_content)
    }

    pub fn from_yaml_str(yaml_content: &str) -> Result<Self, ConfigError> {
        let yaml_config: ConfigYaml = serde_yaml::from_str(yaml_content)?;

        Ok(Self {
            node_name: yaml_config.node_name.unwrap_or_else(|| DEFAULT_NODE_NAME.to_string()),
            data_dir: yaml_config.data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            port: yaml_config.port.unwrap_or(DEFAULT_PORT),
            environment: yaml_config.environment.unwrap_or_else(|| "development".to_string()),
            reload_interval: Duration::from_secs(
                yaml_config.reload_interval_secs.unwrap_or(DEFAULT_RELOAD_INTERVAL_SECS),
            ),
            page_size: yaml_config.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
        })
    }

    // Unparseable values fall back to their defaults
    pub fn from_vars<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let node_name = get("NODE_NAME").unwrap_or_else(|| DEFAULT_NODE_NAME.to_string());

        let data_dir = get("DATA_DIR")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let port = get("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let environment = get("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let reload_interval_secs = get("RELOAD_INTERVAL")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RELOAD_INTERVAL_SECS); // Default to 5 minutes

        let page_size = get("PAGE_SIZE")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .max(1);

        Self {
            node_name,
            data_dir,
            port,
            environment,
            reload_interval: Duration::from_secs(reload_interval_secs),
            page_size,
        }
    }
}

// ABOUTME: Configuration management for the geoflow service
// ABOUTME: Handles loading YAML configuration with defaults and CLI overrides

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::Args;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    #[serde(default = "default_workflows_dir")]
    pub workflows_dir: PathBuf,

    /// Fixed sleep between dispatcher iterations.
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_listen() -> SocketAddr {
    "0.0.0.0:3000".parse().expect("static default address")
}

fn default_workflows_dir() -> PathBuf {
    PathBuf::from("./workflows")
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(2)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            workflows_dir: default_workflows_dir(),
            poll_interval: default_poll_interval(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the given path, or from the first candidate
    /// file found in the working directory, or defaults.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => match Self::find_config_file() {
                Some(found) => found,
                None => return Ok(Config::default()),
            },
        };

        let contents = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        ["geoflow.yaml", "geoflow.yml", ".geoflow.yaml", ".geoflow.yml"]
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists())
    }

    /// Fold command line overrides into the loaded configuration.
    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(listen) = args.listen {
            self.listen = listen;
        }
        if let Some(workflows_dir) = &args.workflows_dir {
            self.workflows_dir = workflows_dir.clone();
        }
    }
}

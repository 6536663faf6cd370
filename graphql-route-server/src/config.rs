//! Server configuration

use graphql_route::RouteConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for {name}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server bind address
    pub addr: SocketAddr,
    /// Path the GraphQL route is mounted on
    pub path: String,
    /// GraphQL route behaviour
    pub route: RouteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            path: "/graphql".to_string(),
            route: RouteConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file; missing keys take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration from environment variables and an optional file.
    /// Priority: Environment variables > config file > defaults
    pub fn from_env(file: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Apply `GRAPHQL_ROUTE_*` overrides read through `lookup`
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(addr) = lookup("GRAPHQL_ROUTE_ADDR") {
            self.addr = addr.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "GRAPHQL_ROUTE_ADDR",
                value: addr,
            })?;
        }

        if let Some(path) = lookup("GRAPHQL_ROUTE_PATH") {
            self.path = path;
        }

        if let Some(explorer) = lookup("GRAPHQL_ROUTE_EXPLORER") {
            self.route.explorer = explorer.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "GRAPHQL_ROUTE_EXPLORER",
                value: explorer,
            })?;
        }

        Ok(self)
    }

    /// Set a new bind address
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Set a new mount path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

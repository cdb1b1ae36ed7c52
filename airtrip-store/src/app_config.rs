use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public base URL. Derived from host and port when unset.
    pub address: Option<String>,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        self.address
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Memory,
    Sqlite,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    /// JSON snapshot loaded by the memory backend.
    pub file_path: PathBuf,
    /// When true the memory backend never writes its snapshot back.
    #[serde(default = "default_rollback")]
    pub rollback: bool,
    pub url: String,
}

fn default_rollback() -> bool { true }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    pub fn load_from(dir: &str) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name(&format!("{}/default", dir)))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name(&format!("{}/local", dir)).required(false))
            // Eg. `AIRTRIP__SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("AIRTRIP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

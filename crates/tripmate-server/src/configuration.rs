use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use tripmate::config::{deserialize, load_config, Settings};
use tripmate::errors::ConfigError;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port).parse()?;
        Ok(addr)
    }
}

/// Everything the binary reads from `config.yaml` and `TRIPMATE_` variables
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(flatten)]
    pub app: Settings,
}

impl AppConfig {
    pub fn new(path: Option<&Path>) -> Result<Self, ConfigError> {
        deserialize(load_config(path)?)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8001
}

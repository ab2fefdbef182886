use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    /// `"*"` permits every origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_preflight_status")]
    pub preflight_status: u16,
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_preflight_status() -> u16 {
    204
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            preflight_status: default_preflight_status(),
        }
    }
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RelayConfig {
    /// Maximum bytes held between the upstream read and the client write.
    #[serde(default = "default_high_water_mark")]
    pub high_water_mark: usize,
    /// Maximum number of chunks queued in the relay channel.
    #[serde(default = "default_channel_depth")]
    pub channel_depth: usize,
}

fn default_high_water_mark() -> usize {
    10 * 1024 * 1024
}

fn default_channel_depth() -> usize {
    32
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            high_water_mark: default_high_water_mark(),
            channel_depth: default_channel_depth(),
        }
    }
}

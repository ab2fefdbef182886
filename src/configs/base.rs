use serde::{Deserialize, Serialize};

use crate::{common::types::AnyResult, configs::*};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub youtube: YouTubeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads `config.toml` (or `config.default.toml`), falling back to the
    /// built-in defaults when neither exists, then applies environment
    /// overrides.
    pub fn load() -> AnyResult<Self> {
        let config_path = ["config.toml", "config.default.toml"]
            .into_iter()
            .find(|p| std::path::Path::new(p).exists());

        let mut config = match config_path {
            Some(path) => {
                crate::log_println!("Loading configuration from: {}", path);
                let config_str = std::fs::read_to_string(path)?;
                Self::from_toml(&config_str)?
            }
            None => {
                crate::log_println!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(config_str: &str) -> AnyResult<Self> {
        Ok(toml::from_str(config_str)?)
    }

    /// `PORT` and `HOST` win over the file, matching how hosting platforms
    /// assign the listening port.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> AnyResult<()> {
        if let Some(port) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| format!("invalid PORT {:?}: {}", port, e))?;
        }
        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            self.server.host = host.trim().to_string();
        }
        Ok(())
    }
}

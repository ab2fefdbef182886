use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YouTubeConfig {
    /// InnerTube client profiles tried in order when resolving formats.
    #[serde(default = "default_clients")]
    pub clients: Vec<String>,
    /// Size of each ranged request made against the media host.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Site the embed page and player script are fetched from.
    #[serde(default = "default_web_base")]
    pub web_base: String,
    #[serde(default)]
    pub cipher: YouTubeCipherConfig,
}

fn default_clients() -> Vec<String> {
    vec!["ANDROID_VR".to_string(), "IOS".to_string()]
}

fn default_chunk_size() -> u64 {
    10 * 1024 * 1024
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_api_base() -> String {
    "https://youtubei.googleapis.com".to_string()
}

fn default_web_base() -> String {
    "https://www.youtube.com".to_string()
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            clients: default_clients(),
            chunk_size: default_chunk_size(),
            request_timeout_secs: default_request_timeout_secs(),
            api_base: default_api_base(),
            web_base: default_web_base(),
            cipher: YouTubeCipherConfig::default(),
        }
    }
}

/// Remote signature deciphering service. Without a `url`, formats that need
/// deciphering are skipped. `token` is sent as the `Authorization` header.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct YouTubeCipherConfig {
    pub url: Option<String>,
    pub token: Option<String>,
}

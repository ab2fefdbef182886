use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tokio::sync::RwLock;

use crate::{common::types::AnyResult, configs::YouTubeCipherConfig};

const PLAYER_SCRIPT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

#[derive(Clone)]
struct CachedPlayerScript {
    url: String,
    expires_at: Instant,
}

/// Client for a remote deciphering service exposing `POST /resolve_url`.
pub struct YouTubeCipherManager {
    base_url: String,
    web_base: String,
    token: Option<String>,
    client: reqwest::Client,
    cached_player_script: RwLock<Option<CachedPlayerScript>>,
}

impl YouTubeCipherManager {
    /// Returns `None` when no service URL is configured.
    pub fn new(
        config: &YouTubeCipherConfig,
        web_base: &str,
        client: reqwest::Client,
    ) -> Option<Self> {
        let base_url = config.url.as_ref()?.trim_end_matches('/').to_string();
        Some(Self {
            base_url,
            web_base: web_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            client,
            cached_player_script: RwLock::new(None),
        })
    }

    async fn player_script_url(&self) -> AnyResult<String> {
        {
            let cache = self.cached_player_script.read().await;
            if let Some(script) = &*cache {
                if Instant::now() < script.expires_at {
                    return Ok(script.url.clone());
                }
            }
        }

        let mut cache = self.cached_player_script.write().await;
        if let Some(script) = &*cache {
            if Instant::now() < script.expires_at {
                return Ok(script.url.clone());
            }
        }

        let url = self.fetch_player_script_url().await?;
        *cache = Some(CachedPlayerScript {
            url: url.clone(),
            expires_at: Instant::now() + PLAYER_SCRIPT_TTL,
        });
        Ok(url)
    }

    async fn fetch_player_script_url(&self) -> AnyResult<String> {
        let text = self
            .client
            .get(format!("{}/embed/", self.web_base))
            .header(reqwest::header::USER_AGENT, BROWSER_UA)
            .send()
            .await?
            .text()
            .await?;

        let script_url = extract_js_url(&text, &self.web_base)?
            .ok_or("Could not find jsUrl in embed page")?;
        Ok(script_url)
    }

    /// Deciphers `sig` (when present) and the `n` parameter of `stream_url`.
    pub async fn resolve_url(&self, stream_url: &str, sig: Option<&str>) -> AnyResult<String> {
        let player_url = self.player_script_url().await?;

        let mut body = json!({
            "stream_url": stream_url,
            "player_url": player_url,
        });
        if let Some(n) = n_param(stream_url) {
            body["n_param"] = json!(n);
        }
        if let Some(s) = sig {
            body["encrypted_signature"] = json!(s);
            body["signature_key"] = json!("sig");
        }

        let mut req = self
            .client
            .post(format!("{}/resolve_url", self.base_url))
            .json(&body);
        if let Some(token) = &self.token {
            req = req.header(reqwest::header::AUTHORIZATION, token);
        }

        let res = req.send().await?;
        let status = res.status();
        if status.is_success() {
            let body: Value = res.json().await?;
            return body
                .get("resolved_url")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| "Resolved URL missing in response".into());
        }

        let err_body = res.text().await.unwrap_or_default();
        Err(format!("Failed to resolve URL with status {}: {}", status, err_body).into())
    }
}

/// Finds the player script in an embed or watch page, normalised to en_US.
fn extract_js_url(page: &str, web_base: &str) -> AnyResult<Option<String>> {
    let re = regex::Regex::new(r#""jsUrl":"([^"]+)""#)?;
    let Some(caps) = re.captures(page) else {
        return Ok(None);
    };

    let locale_re = regex::Regex::new(r"/([a-z]{2}_[A-Z]{2})/")?;
    let script_url = locale_re.replace(&caps[1], "/en_US/").to_string();

    Ok(Some(if script_url.starts_with("http") {
        script_url
    } else {
        format!("{}{}", web_base, script_url)
    }))
}

/// The throttling parameter googlevideo expects to be transformed.
pub fn n_param(url: &str) -> Option<&str> {
    url.split("&n=")
        .nth(1)
        .or_else(|| url.split("?n=").nth(1))
        .and_then(|s| s.split('&').next())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_n_param() {
        assert_eq!(
            n_param("https://rr1.googlevideo.com/videoplayback?itag=18&n=abcDEF&sig=x"),
            Some("abcDEF")
        );
        assert_eq!(n_param("https://rr1.googlevideo.com/videoplayback?n=xyz"), Some("xyz"));
        assert_eq!(n_param("https://rr1.googlevideo.com/videoplayback?itag=18"), None);
    }

    #[test]
    fn test_extract_js_url_normalises_locale() {
        let page = r#"{"jsUrl":"/s/player/abc123/player_ias.vflset/de_DE/base.js","other":1}"#;
        assert_eq!(
            extract_js_url(page, "https://www.youtube.com").unwrap().as_deref(),
            Some("https://www.youtube.com/s/player/abc123/player_ias.vflset/en_US/base.js")
        );
        assert_eq!(extract_js_url("<html></html>", "https://www.youtube.com").unwrap(), None);
    }

    #[test]
    fn test_disabled_without_url() {
        let config = YouTubeCipherConfig::default();
        let manager =
            YouTubeCipherManager::new(&config, "https://www.youtube.com", reqwest::Client::new());
        assert!(manager.is_none());
    }
}

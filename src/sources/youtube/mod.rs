use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::Url;

use crate::{
    common::{
        HttpClient, RelayError,
        types::{AnyResult, ByteStream, VideoId},
    },
    configs::YouTubeConfig,
    relay::{FormatDescriptor, StreamLocator, VideoResolver},
};

pub mod chunked;
pub mod cipher;
pub mod clients;
pub mod id;
pub mod ua;

use cipher::YouTubeCipherManager;
use clients::{
    YouTubeClient,
    android_vr::AndroidVrClient,
    common::{parse_format, streaming_formats},
    ios::IosClient,
};

/// Resolves videos through the InnerTube player API, trying each configured
/// client profile in turn.
pub struct YouTubeResolver {
    clients: Vec<Box<dyn YouTubeClient>>,
    cipher: Option<Arc<YouTubeCipherManager>>,
    media_http: reqwest::Client,
    chunk_size: u64,
}

impl YouTubeResolver {
    pub fn new(config: &YouTubeConfig) -> AnyResult<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let create_client = |name: &str| -> AnyResult<Option<Box<dyn YouTubeClient>>> {
            let client: Box<dyn YouTubeClient> = match name.to_uppercase().as_str() {
                "ANDROID_VR" | "ANDROIDVR" => {
                    Box::new(AndroidVrClient::new(&config.api_base, timeout)?)
                }
                "IOS" => Box::new(IosClient::new(&config.api_base, timeout)?),
                _ => {
                    tracing::warn!("Unknown YouTube client: {}", name);
                    return Ok(None);
                }
            };
            Ok(Some(client))
        };

        let mut clients = Vec::new();
        for name in &config.clients {
            if let Some(client) = create_client(name)? {
                clients.push(client);
            }
        }
        if clients.is_empty() {
            tracing::warn!("No valid YouTube clients configured! Fallback to AndroidVR.");
            clients.push(Box::new(AndroidVrClient::new(&config.api_base, timeout)?));
        }

        let cipher = YouTubeCipherManager::new(
            &config.cipher,
            &config.web_base,
            HttpClient::new(&HttpClient::default_user_agent(), timeout)?,
        )
        .map(Arc::new);
        if cipher.is_none() {
            tracing::info!("No cipher service configured, ciphered formats will be skipped");
        }

        Ok(Self {
            clients,
            cipher,
            media_http: HttpClient::new_streaming(timeout)?,
            chunk_size: config.chunk_size,
        })
    }

    pub fn client_names(&self) -> Vec<&str> {
        self.clients.iter().map(|c| c.name()).collect()
    }

    /// Turns a locator into a fetchable URL, deciphering through the remote
    /// service when one is configured.
    async fn stream_url(&self, locator: &StreamLocator) -> Result<String, RelayError> {
        match (locator, &self.cipher) {
            (StreamLocator::Direct(url), None) => Ok(url.clone()),
            (StreamLocator::Direct(url), Some(cipher)) => {
                if cipher::n_param(url).is_none() {
                    return Ok(url.clone());
                }
                cipher
                    .resolve_url(url, None)
                    .await
                    .map_err(|e| RelayError::Resolution(format!("n-param resolution failed: {}", e)))
            }
            (StreamLocator::Ciphered { url, signature }, Some(cipher)) => cipher
                .resolve_url(url, Some(signature))
                .await
                .map_err(|e| RelayError::Resolution(format!("signature resolution failed: {}", e))),
            (StreamLocator::Ciphered { .. }, None) => Err(RelayError::Resolution(
                "format requires deciphering but no cipher service is configured".to_string(),
            )),
        }
    }
}

#[async_trait]
impl VideoResolver for YouTubeResolver {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn resolve_formats(&self, id: &VideoId) -> Result<Vec<FormatDescriptor>, RelayError> {
        let mut last_error: Option<String> = None;
        let mut fallback: Option<Vec<FormatDescriptor>> = None;

        for client in &self.clients {
            tracing::debug!(
                "{}: attempting client '{}' ({} {})",
                id,
                client.name(),
                client.client_name(),
                client.client_version()
            );

            let body = match client.player(id).await {
                Ok(body) => body,
                Err(e) => {
                    last_error = Some(format!(
                        "player request via client '{}' failed: {}",
                        client.name(),
                        e
                    ));
                    tracing::warn!("{}: {}", id, last_error.as_deref().unwrap_or_default());
                    continue;
                }
            };

            let raw = match streaming_formats(&body) {
                Ok(raw) => raw,
                Err(reason) => {
                    last_error = Some(format!(
                        "Video '{}' is not playable via client '{}': {}",
                        id,
                        client.name(),
                        reason
                    ));
                    tracing::warn!("{}", last_error.as_deref().unwrap_or_default());
                    continue;
                }
            };

            let mut descriptors: Vec<FormatDescriptor> =
                raw.into_iter().filter_map(parse_format).collect();
            if self.cipher.is_none() {
                descriptors.retain(|f| matches!(f.locator, StreamLocator::Direct(_)));
            }

            tracing::debug!(
                "{}: client '{}' returned {} usable format(s)",
                id,
                client.name(),
                descriptors.len()
            );

            if descriptors.iter().any(FormatDescriptor::is_muxed) {
                return Ok(descriptors);
            }
            if fallback.is_none() {
                fallback = Some(descriptors);
            }
        }

        // A playable answer without muxed formats is still an answer; the
        // relay reports it as "no suitable format".
        fallback.ok_or_else(|| {
            RelayError::Resolution(
                last_error.unwrap_or_else(|| format!("Could not find formats for video '{}'", id)),
            )
        })
    }

    async fn open_byte_source(
        &self,
        format: &FormatDescriptor,
        high_water_mark: usize,
    ) -> Result<ByteStream, RelayError> {
        let resolved = self.stream_url(&format.locator).await?;
        let url = Url::parse(&resolved)
            .map_err(|e| RelayError::Resolution(format!("invalid stream URL: {}", e)))?;

        let user_agent = ua::issuing_client(&resolved).and_then(|issuer| {
            self.clients
                .iter()
                .find(|c| c.client_name() == issuer)
                .map(|c| c.user_agent().to_string())
        });

        // A zero chunk size falls back to the caller's buffer size.
        let chunk_size = if self.chunk_size > 0 {
            self.chunk_size
        } else {
            high_water_mark as u64
        };

        tracing::debug!(
            "opening itag={} length={:?} chunk_size={} high_water_mark={}",
            format.itag,
            format.content_length,
            chunk_size,
            high_water_mark
        );

        Ok(chunked::ranged_stream(
            self.media_http.clone(),
            url,
            user_agent,
            format.content_length,
            chunk_size,
        ))
    }
}

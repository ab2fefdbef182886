use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{YouTubeClient, common::player_request};
use crate::common::{HttpClient, types::AnyResult};

const CLIENT_NAME: &str = "ANDROID_VR";
const CLIENT_ID: &str = "28";
const CLIENT_VERSION: &str = "1.61.48";
const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8 Pro Build/UQ1A.240205.002; wv) \
     AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 \
     Chrome/121.0.6167.164 Mobile Safari/537.36 YouTubeVR/1.61.48 (gzip)";

/// Returns unciphered stream URLs for most public videos.
pub struct AndroidVrClient {
    http: reqwest::Client,
    api_base: String,
}

impl AndroidVrClient {
    pub fn new(api_base: &str, timeout: Duration) -> AnyResult<Self> {
        Ok(Self {
            http: HttpClient::new(USER_AGENT, timeout)?,
            api_base: api_base.to_string(),
        })
    }

    fn build_context(&self) -> Value {
        json!({
            "client": {
                "clientName": CLIENT_NAME,
                "clientVersion": CLIENT_VERSION,
                "userAgent": USER_AGENT,
                "androidSdkVersion": 34,
                "deviceMake": "Google",
                "deviceModel": "Pixel 8 Pro",
                "osName": "Android",
                "osVersion": "14",
                "hl": "en",
                "gl": "US"
            },
            "user": { "lockedSafetyMode": false },
            "request": { "useSsl": true }
        })
    }
}

#[async_trait]
impl YouTubeClient for AndroidVrClient {
    fn name(&self) -> &str {
        "AndroidVR"
    }
    fn client_name(&self) -> &str {
        CLIENT_NAME
    }
    fn client_version(&self) -> &str {
        CLIENT_VERSION
    }
    fn user_agent(&self) -> &str {
        USER_AGENT
    }

    async fn player(&self, video_id: &str) -> AnyResult<Value> {
        player_request(
            &self.http,
            &self.api_base,
            CLIENT_ID,
            CLIENT_VERSION,
            self.build_context(),
            video_id,
        )
        .await
    }
}

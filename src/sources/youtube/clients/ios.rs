use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{YouTubeClient, common::player_request};
use crate::common::{HttpClient, types::AnyResult};

const CLIENT_NAME: &str = "IOS";
const CLIENT_ID: &str = "5";
const CLIENT_VERSION: &str = "21.02.1";
const USER_AGENT: &str =
    "com.google.ios.youtube/21.02.1 (iPhone16,2; U; CPU iOS 18_2 like Mac OS X;)";

pub struct IosClient {
    http: reqwest::Client,
    api_base: String,
}

impl IosClient {
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
                "deviceMake": "Apple",
                "deviceModel": "iPhone16,2",
                "osName": "iPhone",
                "osVersion": "18.2.22C152",
                "hl": "en",
                "gl": "US",
                "utcOffsetMinutes": 0
            },
            "user": { "lockedSafetyMode": false },
            "request": { "useSsl": true }
        })
    }
}

#[async_trait]
impl YouTubeClient for IosClient {
    fn name(&self) -> &str {
        "IOS"
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

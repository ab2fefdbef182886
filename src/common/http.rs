use std::time::Duration;

use reqwest::{Client, Error};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

pub struct HttpClient;

impl HttpClient {
    pub fn default_user_agent() -> String {
        DEFAULT_USER_AGENT.to_string()
    }

    /// Client used for metadata calls. The whole request is bounded by `timeout`.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Client, Error> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
    }

    /// Client used for media downloads. Only connecting is bounded; a transfer
    /// may legitimately run for as long as the video plays.
    pub fn new_streaming(connect_timeout: Duration) -> Result<Client, Error> {
        Client::builder()
            .user_agent(Self::default_user_agent())
            .connect_timeout(connect_timeout)
            .build()
    }
}

pub mod android_vr;
pub mod common;
pub mod ios;

use async_trait::async_trait;
use serde_json::Value;

use crate::common::types::AnyResult;

/// An InnerTube client profile. Profiles differ in the context they send and
/// in whether the platform hands them plain or ciphered stream URLs.
#[async_trait]
pub trait YouTubeClient: Send + Sync {
    fn name(&self) -> &str;
    fn client_name(&self) -> &str;
    fn client_version(&self) -> &str;
    fn user_agent(&self) -> &str;

    async fn player(&self, video_id: &str) -> AnyResult<Value>;
}

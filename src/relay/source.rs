use async_trait::async_trait;

use crate::{
    common::{RelayError, types::{ByteStream, VideoId}},
    relay::format::FormatDescriptor,
};

/// The external video platform, seen as two capabilities: listing the
/// formats of a video and opening the bytes of one of them.
#[async_trait]
pub trait VideoResolver: Send + Sync {
    fn name(&self) -> &str;

    async fn resolve_formats(&self, id: &VideoId) -> Result<Vec<FormatDescriptor>, RelayError>;

    /// `high_water_mark` hints how many bytes the caller will buffer ahead.
    async fn open_byte_source(
        &self,
        format: &FormatDescriptor,
        high_water_mark: usize,
    ) -> Result<ByteStream, RelayError>;
}

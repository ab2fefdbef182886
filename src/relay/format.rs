use crate::common::types::Container;

/// Where the bytes of a format can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamLocator {
    /// Directly fetchable URL.
    Direct(String),
    /// URL that only works once `signature` has been deciphered and appended.
    Ciphered { url: String, signature: String },
}

/// One encoding of a video as reported by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub itag: i64,
    pub mime_type: String,
    pub container: Container,
    pub has_audio: bool,
    pub has_video: bool,
    /// Relative ranking, higher is better. Vertical resolution for video.
    pub quality: u32,
    pub bitrate: u64,
    pub content_length: Option<u64>,
    pub locator: StreamLocator,
}

impl FormatDescriptor {
    pub fn is_muxed(&self) -> bool {
        self.has_audio && self.has_video
    }
}

/// Picks the highest-quality format carrying both audio and video. Equal
/// rankings keep the one listed first.
pub fn select_format(descriptors: &[FormatDescriptor]) -> Option<&FormatDescriptor> {
    descriptors
        .iter()
        .filter(|f| f.is_muxed())
        .fold(None, |best: Option<&FormatDescriptor>, f| match best {
            Some(b) if b.quality >= f.quality => Some(b),
            _ => Some(f),
        })
}

#[cfg(test)]
pub(crate) fn descriptor(itag: i64, has_audio: bool, has_video: bool, quality: u32) -> FormatDescriptor {
    FormatDescriptor {
        itag,
        mime_type: "video/mp4".to_string(),
        container: Container::Mp4,
        has_audio,
        has_video,
        quality,
        bitrate: 0,
        content_length: None,
        locator: StreamLocator::Direct(format!("memory://{}", itag)),
    }
}

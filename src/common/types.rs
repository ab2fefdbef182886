use bytes::Bytes;
use futures::stream::BoxStream;

/// A generic boxed error type.
pub type AnyError = Box<dyn std::error::Error + Send + Sync>;

/// A convenient Result alias returning `AnyError`.
pub type AnyResult<T> = std::result::Result<T, AnyError>;

/// Upstream media bytes, in order, ending with `None` or an I/O error.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// A video identifier that has passed the platform grammar check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(pub String);

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::ops::Deref for VideoId {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Media containers a format may be packaged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Mp4,
    Webm,
    ThreeGp,
    Unknown,
}

impl Container {
    /// Parses the subtype of a mime string such as `video/mp4; codecs="..."`.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        match essence.split('/').nth(1).map(|s| s.to_lowercase()).as_deref() {
            Some("mp4") => Self::Mp4,
            Some("webm") => Self::Webm,
            Some("3gpp") => Self::ThreeGp,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_from_mime() {
        assert_eq!(
            Container::from_mime("video/mp4; codecs=\"avc1.42001E, mp4a.40.2\""),
            Container::Mp4
        );
        assert_eq!(Container::from_mime("audio/webm; codecs=\"opus\""), Container::Webm);
        assert_eq!(Container::from_mime("video/3gpp"), Container::ThreeGp);
        assert_eq!(Container::from_mime("garbage"), Container::Unknown);
    }
}

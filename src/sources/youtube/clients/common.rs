use serde_json::Value;

use crate::{
    common::types::{AnyResult, Container},
    relay::{FormatDescriptor, StreamLocator},
};

const AUDIO_CODECS: &[&str] = &["mp4a", "opus", "vorbis", "ac-3", "ec-3", "mp3", "flac"];

/// Decode a `signatureCipher` / `cipher` query string into (url, sig) parts.
pub fn decode_signature_cipher(cipher_str: &str) -> Option<(String, String)> {
    let mut url = None;
    let mut sig = None;

    for part in cipher_str.split('&') {
        if let Some((k, v)) = part.split_once('=') {
            let decoded = urlencoding::decode(v).ok()?.to_string();
            match k {
                "url" => url = Some(decoded),
                "s" => sig = Some(decoded),
                _ => {}
            }
        }
    }

    match (url, sig) {
        (Some(u), Some(s)) => Some((u, s)),
        _ => None,
    }
}

/// Sends an InnerTube `player` request and returns the raw JSON body.
pub async fn player_request(
    http: &reqwest::Client,
    api_base: &str,
    client_id: &str,
    client_version: &str,
    context: Value,
    video_id: &str,
) -> AnyResult<Value> {
    let body = serde_json::json!({
        "context": context,
        "videoId": video_id,
        "contentCheckOk": true,
        "racyCheckOk": true
    });

    let url = format!(
        "{}/youtubei/v1/player?prettyPrint=false",
        api_base.trim_end_matches('/')
    );

    let res = http
        .post(&url)
        .header("X-YouTube-Client-Name", client_id)
        .header("X-YouTube-Client-Version", client_version)
        .json(&body)
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        return Err(format!("player request returned {status}").into());
    }

    Ok(res.json().await?)
}

/// Returns the raw format objects of a player response, muxed `formats`
/// first, or the reason the video cannot be played.
pub fn streaming_formats(body: &Value) -> Result<Vec<&Value>, String> {
    let playability = body
        .get("playabilityStatus")
        .and_then(|p| p.get("status"))
        .and_then(|s| s.as_str())
        .unwrap_or("UNKNOWN");

    if playability != "OK" {
        let reason = body
            .get("playabilityStatus")
            .and_then(|p| p.get("reason"))
            .and_then(|r| r.as_str())
            .unwrap_or("no reason provided");
        return Err(format!("status={}, reason={}", playability, reason));
    }

    let streaming_data = body
        .get("streamingData")
        .ok_or_else(|| "no streamingData in player response".to_string())?;

    let formats = streaming_data.get("formats").and_then(|v| v.as_array());
    let adaptive = streaming_data
        .get("adaptiveFormats")
        .and_then(|v| v.as_array());

    Ok(formats
        .into_iter()
        .flatten()
        .chain(adaptive.into_iter().flatten())
        .collect())
}

/// Builds a descriptor from one InnerTube format object. Formats without a
/// usable URL are skipped.
pub fn parse_format(format: &Value) -> Option<FormatDescriptor> {
    let itag = format.get("itag").and_then(|v| v.as_i64())?;
    let mime_type = format.get("mimeType").and_then(|v| v.as_str())?.to_string();

    let locator = if let Some(url) = format.get("url").and_then(|u| u.as_str()) {
        StreamLocator::Direct(url.to_string())
    } else {
        let cipher_str = format
            .get("signatureCipher")
            .or_else(|| format.get("cipher"))
            .and_then(|c| c.as_str())?;
        let (url, signature) = decode_signature_cipher(cipher_str)?;
        StreamLocator::Ciphered { url, signature }
    };

    let codecs = codecs(&mime_type);
    let has_video = mime_type.starts_with("video/");
    let has_audio = mime_type.starts_with("audio/")
        || format.get("audioQuality").is_some()
        || codecs
            .iter()
            .any(|c| AUDIO_CODECS.iter().any(|a| c.starts_with(a)));

    Some(FormatDescriptor {
        itag,
        container: Container::from_mime(&mime_type),
        mime_type,
        has_audio,
        has_video,
        quality: quality_rank(format),
        bitrate: format.get("bitrate").and_then(|v| v.as_u64()).unwrap_or(0),
        content_length: format
            .get("contentLength")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&len| len > 0),
        locator,
    })
}

/// `height` when present, otherwise the number in `qualityLabel` (`720p60`).
fn quality_rank(format: &Value) -> u32 {
    if let Some(height) = format.get("height").and_then(|v| v.as_u64()) {
        return height.min(u32::MAX as u64) as u32;
    }
    format
        .get("qualityLabel")
        .and_then(|v| v.as_str())
        .and_then(|label| label.split('p').next())
        .and_then(|digits| digits.trim().parse().ok())
        .unwrap_or(0)
}

/// `video/mp4; codecs="avc1.42001E, mp4a.40.2"` -> `["avc1.42001E", "mp4a.40.2"]`
fn codecs(mime: &str) -> Vec<String> {
    mime.split_once("codecs=")
        .map(|(_, list)| {
            list.trim_matches(|c| c == '"' || c == '\'' || c == ' ')
                .split(',')
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_signature_cipher() {
        let cipher = "s=AB%3DCD&sp=sig&url=https%3A%2F%2Frr1.googlevideo.com%2Fvideoplayback%3Fitag%3D18";
        let (url, sig) = decode_signature_cipher(cipher).unwrap();
        assert_eq!(url, "https://rr1.googlevideo.com/videoplayback?itag=18");
        assert_eq!(sig, "AB=CD");
        assert!(decode_signature_cipher("sp=sig").is_none());
    }

    #[test]
    fn test_parse_muxed_format() {
        let f = parse_format(&json!({
            "itag": 18,
            "url": "https://rr1.googlevideo.com/videoplayback?itag=18",
            "mimeType": "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"",
            "bitrate": 503000,
            "width": 640,
            "height": 360,
            "contentLength": "1234567",
            "qualityLabel": "360p",
            "audioQuality": "AUDIO_QUALITY_LOW"
        }))
        .unwrap();

        assert_eq!(f.itag, 18);
        assert!(f.has_audio && f.has_video);
        assert_eq!(f.quality, 360);
        assert_eq!(f.container, Container::Mp4);
        assert_eq!(f.content_length, Some(1234567));
        assert_eq!(
            f.locator,
            StreamLocator::Direct("https://rr1.googlevideo.com/videoplayback?itag=18".into())
        );
    }

    #[test]
    fn test_parse_adaptive_formats() {
        let video = parse_format(&json!({
            "itag": 137,
            "url": "https://example/v",
            "mimeType": "video/mp4; codecs=\"avc1.640028\"",
            "qualityLabel": "1080p60"
        }))
        .unwrap();
        assert!(video.has_video && !video.has_audio);
        assert_eq!(video.quality, 1080);
        assert_eq!(video.content_length, None);

        let audio = parse_format(&json!({
            "itag": 251,
            "url": "https://example/a",
            "mimeType": "audio/webm; codecs=\"opus\"",
            "audioQuality": "AUDIO_QUALITY_MEDIUM"
        }))
        .unwrap();
        assert!(audio.has_audio && !audio.has_video);
        assert_eq!(audio.quality, 0);
        assert_eq!(audio.container, Container::Webm);
    }

    #[test]
    fn test_parse_ciphered_format() {
        let f = parse_format(&json!({
            "itag": 22,
            "mimeType": "video/mp4; codecs=\"avc1.64001F, mp4a.40.2\"",
            "signatureCipher": "s=xyz&url=https%3A%2F%2Fexample%2Fv"
        }))
        .unwrap();
        assert_eq!(
            f.locator,
            StreamLocator::Ciphered {
                url: "https://example/v".into(),
                signature: "xyz".into()
            }
        );
        assert!(f.has_audio);
    }

    #[test]
    fn test_parse_format_without_url_is_skipped() {
        assert!(parse_format(&json!({"itag": 18, "mimeType": "video/mp4"})).is_none());
    }

    #[test]
    fn test_streaming_formats_order_and_errors() {
        let body = json!({
            "playabilityStatus": {"status": "OK"},
            "streamingData": {
                "formats": [{"itag": 18}],
                "adaptiveFormats": [{"itag": 137}, {"itag": 140}]
            }
        });
        let itags: Vec<i64> = streaming_formats(&body)
            .unwrap()
            .iter()
            .filter_map(|f| f.get("itag").and_then(|v| v.as_i64()))
            .collect();
        assert_eq!(itags, vec![18, 137, 140]);

        let blocked = json!({
            "playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "Sign in to confirm your age"}
        });
        assert_eq!(
            streaming_formats(&blocked).unwrap_err(),
            "status=LOGIN_REQUIRED, reason=Sign in to confirm your age"
        );

        let missing = json!({"playabilityStatus": {"status": "OK"}});
        assert!(streaming_formats(&missing).is_err());
    }
}

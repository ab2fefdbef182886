/// The InnerTube client a googlevideo URL was issued to (`c=` parameter).
/// googlevideo rejects ranged requests whose User-Agent does not match it.
pub fn issuing_client(url: &str) -> Option<&str> {
    if !(url.contains("googlevideo.com") || url.contains("youtube.com")) {
        return None;
    }
    extract_param(url, "c=")
}

fn extract_param<'a>(url: &'a str, key: &str) -> Option<&'a str> {
    let query_start = url.find('?')?;
    let query = &url[query_start + 1..];

    for part in query.split('&') {
        if let Some(val) = part.strip_prefix(key) {
            return Some(val.split('#').next().unwrap_or(val));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issuing_client() {
        assert_eq!(
            issuing_client("https://rr3.googlevideo.com/videoplayback?itag=18&c=ANDROID_VR&n=x"),
            Some("ANDROID_VR")
        );
        assert_eq!(
            issuing_client("https://rr3.googlevideo.com/videoplayback?itag=18"),
            None
        );
        assert_eq!(issuing_client("https://example.com/v?c=IOS"), None);
    }
}

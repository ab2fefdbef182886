use std::io;

use futures::{Stream, StreamExt, TryFutureExt, TryStreamExt, future, stream};
use reqwest::{Client, Url, header};

use crate::common::types::ByteStream;

/// Fetches `url` as consecutive `range=start-end` requests of `chunk_size`
/// bytes. A chunk is only requested once the previous one has been fully
/// consumed. Without a known length the media is fetched with one GET. The
/// stream ends after the first error.
pub fn ranged_stream(
    http: Client,
    url: Url,
    user_agent: Option<String>,
    content_length: Option<u64>,
    chunk_size: u64,
) -> ByteStream {
    let total = match content_length {
        Some(total) if chunk_size > 0 => total,
        _ => return fetch(http, url, user_agent).try_flatten_stream().boxed(),
    };

    chunk_ranges(total, chunk_size)
        .then(move |(start, end)| {
            let mut ranged = url.clone();
            ranged
                .query_pairs_mut()
                .append_pair("range", &format!("{}-{}", start, end));
            tracing::trace!("requesting range {}-{}", start, end);
            fetch(http.clone(), ranged, user_agent.clone())
                .map_ok(move |body| exact_length(body, end - start + 1))
        })
        .try_flatten()
        .scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            *failed = item.is_err();
            future::ready(Some(item))
        })
        .boxed()
}

/// Inclusive `(start, end)` pairs covering `0..total`, produced on demand.
/// `chunk_size` must be non-zero.
fn chunk_ranges(total: u64, chunk_size: u64) -> impl Stream<Item = (u64, u64)> {
    stream::unfold(0u64, move |start| async move {
        if start >= total {
            return None;
        }
        let next = start.saturating_add(chunk_size).min(total);
        Some(((start, next - 1), next))
    })
}

/// Passes `body` through, failing if it does not carry exactly `expected`
/// bytes.
fn exact_length(body: ByteStream, expected: u64) -> ByteStream {
    stream::unfold(Some((body, 0u64)), move |state| async move {
        let (mut body, received) = state?;
        match body.next().await {
            Some(Ok(bytes)) => {
                let received = received + bytes.len() as u64;
                if received > expected {
                    let err = io::Error::other(format!(
                        "range returned more than the {} bytes requested",
                        expected
                    ));
                    return Some((Err(err), None));
                }
                Some((Ok(bytes), Some((body, received))))
            }
            Some(Err(e)) => Some((Err(e), None)),
            None if received == expected => None,
            None => {
                let err = io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("range ended after {} of {} bytes", received, expected),
                );
                Some((Err(err), None))
            }
        }
    })
    .boxed()
}

async fn fetch(
    http: Client,
    url: Url,
    user_agent: Option<String>,
) -> io::Result<ByteStream> {
    let mut req = http.get(url);
    if let Some(ua) = user_agent {
        req = req.header(header::USER_AGENT, ua);
    }

    let res = req.send().await.map_err(to_io_error)?;
    let status = res.status();
    if !status.is_success() {
        return Err(io::Error::other(format!("upstream returned {}", status)));
    }

    Ok(res.bytes_stream().map_err(to_io_error).boxed())
}

fn to_io_error(e: reqwest::Error) -> io::Error {
    io::Error::other(e)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    async fn ranges(total: u64, chunk_size: u64) -> Vec<(u64, u64)> {
        chunk_ranges(total, chunk_size).collect().await
    }

    fn body(parts: &[&'static [u8]]) -> ByteStream {
        stream::iter(parts.to_vec().into_iter().map(|p| Ok(Bytes::from_static(p)))).boxed()
    }

    #[tokio::test]
    async fn test_chunk_ranges() {
        assert_eq!(ranges(10, 4).await, vec![(0, 3), (4, 7), (8, 9)]);
        assert_eq!(ranges(8, 4).await, vec![(0, 3), (4, 7)]);
        assert_eq!(ranges(3, 10).await, vec![(0, 2)]);
        assert!(ranges(0, 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_chunk_ranges_near_u64_max() {
        assert_eq!(
            ranges(u64::MAX, u64::MAX - 1).await,
            vec![(0, u64::MAX - 2), (u64::MAX - 1, u64::MAX - 1)]
        );

        let first: Vec<(u64, u64)> = chunk_ranges(u64::MAX, 1).take(3).collect().await;
        assert_eq!(first, vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[tokio::test]
    async fn test_exact_length_passes_full_body() {
        let out: Vec<Bytes> = exact_length(body(&[b"01", b"23"]), 4)
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(out.concat(), b"0123");
    }

    #[tokio::test]
    async fn test_exact_length_rejects_short_body() {
        let out: Vec<io::Result<Bytes>> = exact_length(body(&[b"01"]), 4).collect().await;
        assert_eq!(out.len(), 2);
        assert_eq!(&out[0].as_ref().unwrap()[..], b"01");
        assert_eq!(
            out[1].as_ref().unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }

    #[tokio::test]
    async fn test_exact_length_rejects_long_body() {
        let mut out = exact_length(body(&[b"0123", b"45"]), 4);
        assert!(out.next().await.unwrap().is_ok());
        assert!(out.next().await.unwrap().is_err());
        assert!(out.next().await.is_none());
    }
}

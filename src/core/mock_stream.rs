//! Synthetic completion stream for dry runs.
//!
//! Exercises the pipeline deterministically without a live provider call:
//! an initial pause stands in for network latency, then a fixed sample is
//! emitted in fixed-size byte chunks on a fixed cadence.

use async_stream::stream;
use bytes::Bytes;
use std::time::Duration;
use tokio::time::sleep;

use crate::core::chat_stream::ChunkStream;

/// Sample emitted by the mock stream. Not user-configurable.
pub const SAMPLE_TEXT: &str = "A terminal is a humble thing: a grid of cells, \
a cursor, and a promise that bytes written in order will appear in order. \
Streaming text into one is mostly a matter of keeping that promise. Chunks \
arrive whenever the network feels like delivering them, rarely aligned with \
words or even whole characters, and a naïve decoder that treats each chunk \
in isolation will tear multi-byte sequences apart. The decoder's job is to \
stitch the pieces back into readable text without ever getting ahead of the \
reader.";

/// Pause between consecutive chunks.
pub const CHUNK_DELAY: Duration = Duration::from_millis(100);

/// Delay used when the chat flow runs against the mock stream.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(2000);

/// Chunk size used when the chat flow runs against the mock stream.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Produce the synthetic stream: wait `initial_delay`, then emit
/// [`SAMPLE_TEXT`] in `chunk_size`-byte chunks separated by [`CHUNK_DELAY`],
/// then signal end-of-data.
pub fn mock_stream(initial_delay: Duration, chunk_size: usize) -> ChunkStream {
    let chunk_size = chunk_size.max(1);
    Box::pin(stream! {
        sleep(initial_delay).await;
        for chunk in SAMPLE_TEXT.as_bytes().chunks(chunk_size) {
            yield Ok(Bytes::from_static(chunk));
            sleep(CHUNK_DELAY).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use tokio::time::timeout;

    #[tokio::test(start_paused = true)]
    async fn emits_sample_in_fixed_size_chunks() {
        let chunk_size = 10;
        let mut stream = mock_stream(Duration::ZERO, chunk_size);

        let mut chunks = Vec::new();
        while let Some(chunk) = stream.next().await {
            chunks.push(chunk.expect("mock stream never errors"));
        }

        assert_eq!(chunks.len(), SAMPLE_TEXT.len().div_ceil(chunk_size));
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.len(), chunk_size);
        }
        let last = chunks.last().expect("at least one chunk");
        assert!(!last.is_empty() && last.len() <= chunk_size);

        let reassembled: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
        assert_eq!(reassembled, SAMPLE_TEXT.as_bytes());
    }

    #[tokio::test(start_paused = true)]
    async fn emits_nothing_before_initial_delay() {
        let mut stream = mock_stream(Duration::from_millis(200), 10);

        let early = timeout(Duration::from_millis(100), stream.next()).await;
        assert!(early.is_err(), "no chunk may arrive before the initial delay");

        let first = timeout(Duration::from_millis(200), stream.next())
            .await
            .expect("first chunk should arrive once the delay elapses")
            .expect("stream should not be exhausted")
            .expect("mock stream never errors");
        assert_eq!(&first[..], &SAMPLE_TEXT.as_bytes()[..10]);
    }

    #[tokio::test(start_paused = true)]
    async fn spaces_chunks_by_fixed_cadence() {
        let mut stream = mock_stream(Duration::ZERO, 10);

        let _first = stream.next().await.expect("first chunk");
        // The next chunk only becomes ready after CHUNK_DELAY.
        let too_soon = timeout(CHUNK_DELAY - Duration::from_millis(1), stream.next()).await;
        assert!(too_soon.is_err());
        let second = timeout(Duration::from_millis(2), stream.next()).await;
        assert!(second.is_ok());
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        // Constructing with zero must not panic; the stream falls back to
        // one-byte chunks.
        let _stream = mock_stream(Duration::ZERO, 0);
    }
}

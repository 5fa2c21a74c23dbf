//! Moves a completion byte stream into an output sink, chunk by chunk.
//!
//! The drain loop is strictly sequential: a chunk's decoded text is fully
//! written to the sink before the next chunk is polled from the source, so
//! the pipeline never reads faster than the sink can accept.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::error::Error as StdError;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

use crate::core::chat_stream::StreamError;

/// Incremental UTF-8 decoder.
///
/// Chunk boundaries are not guaranteed to align with character boundaries,
/// so an incomplete trailing sequence (at most three bytes) is carried over
/// and prepended to the next chunk. Truly invalid bytes decode to U+FFFD.
pub struct StreamDecoder {
    carry: Vec<u8>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self { carry: Vec::new() }
    }

    /// Decode the next chunk, returning the longest decodable prefix of the
    /// carried-over bytes plus `input`.
    pub fn decode(&mut self, input: &[u8]) -> String {
        let mut buf = std::mem::take(&mut self.carry);
        buf.extend_from_slice(input);

        let mut out = String::with_capacity(buf.len());
        let mut rest: &[u8] = &buf;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        // Invalid sequence: substitute and keep going.
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[bad..];
                        }
                        // Incomplete trailing sequence: hold it for the
                        // next chunk.
                        None => {
                            self.carry = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush any bytes still held after the stream ends. A leftover partial
    /// sequence at end-of-data decodes lossily.
    pub fn finish(&mut self) -> String {
        if self.carry.is_empty() {
            return String::new();
        }
        let tail = String::from_utf8_lossy(&self.carry).into_owned();
        self.carry.clear();
        tail
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Destination for decoded response text, held for one invocation.
pub struct OutputSink {
    target: SinkTarget,
}

enum SinkTarget {
    Console(Stdout),
    File(BufWriter<File>),
    #[cfg(test)]
    Memory(Vec<u8>),
}

impl OutputSink {
    pub fn console() -> Self {
        Self {
            target: SinkTarget::Console(io::stdout()),
        }
    }

    pub fn file(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            target: SinkTarget::File(BufWriter::new(file)),
        })
    }

    /// In-memory sink with console framing, for pipeline tests.
    #[cfg(test)]
    pub(crate) fn memory() -> Self {
        Self {
            target: SinkTarget::Memory(Vec::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn into_bytes(self) -> Vec<u8> {
        match self.target {
            SinkTarget::Memory(buf) => buf,
            _ => Vec::new(),
        }
    }

    fn begin(&mut self) -> io::Result<()> {
        match &mut self.target {
            SinkTarget::Console(out) => {
                out.write_all(b"\n")?;
                out.flush()
            }
            SinkTarget::File(_) => Ok(()),
            #[cfg(test)]
            SinkTarget::Memory(buf) => {
                buf.push(b'\n');
                Ok(())
            }
        }
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        match &mut self.target {
            // Console writes land immediately, one flush per chunk.
            SinkTarget::Console(out) => {
                out.write_all(text.as_bytes())?;
                out.flush()
            }
            SinkTarget::File(writer) => writer.write_all(text.as_bytes()),
            #[cfg(test)]
            SinkTarget::Memory(buf) => {
                buf.extend_from_slice(text.as_bytes());
                Ok(())
            }
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        match &mut self.target {
            SinkTarget::Console(out) => {
                out.write_all(b"\n")?;
                out.flush()
            }
            // Single flush once the stream is exhausted.
            SinkTarget::File(writer) => writer.flush(),
            #[cfg(test)]
            SinkTarget::Memory(buf) => {
                buf.push(b'\n');
                Ok(())
            }
        }
    }
}

#[derive(Debug)]
pub enum PipelineError {
    Stream(StreamError),
    Sink(io::Error),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Stream(source) => write!(f, "{source}"),
            PipelineError::Sink(source) => write!(f, "Failed to write response: {source}"),
        }
    }
}

impl StdError for PipelineError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PipelineError::Stream(source) => Some(source),
            PipelineError::Sink(source) => Some(source),
        }
    }
}

impl From<StreamError> for PipelineError {
    fn from(source: StreamError) -> Self {
        PipelineError::Stream(source)
    }
}

impl From<io::Error> for PipelineError {
    fn from(source: io::Error) -> Self {
        PipelineError::Sink(source)
    }
}

/// Drain `stream` into `sink` in arrival order, at most one chunk in
/// flight. Completes when the source signals end-of-data; chunks flushed
/// before an error stay flushed.
pub async fn stream_to_sink<S>(mut stream: S, sink: &mut OutputSink) -> Result<(), PipelineError>
where
    S: Stream<Item = Result<Bytes, StreamError>> + Unpin,
{
    let mut decoder = StreamDecoder::new();
    sink.begin()?;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        let text = decoder.decode(&bytes);
        if !text.is_empty() {
            sink.write_text(&text)?;
        }
    }
    let tail = decoder.finish();
    if !tail.is_empty() {
        sink.write_text(&tail)?;
    }
    sink.finish()?;
    Ok(())
}

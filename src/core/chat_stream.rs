//! Client for the streaming chat-completion endpoint.
//!
//! The provider speaks Server-Sent Events: `data:` lines carrying JSON
//! chunk deltas, terminated by `data: [DONE]`. The stream returned here is
//! pull-based, so bytes are only read from the socket as fast as the
//! pipeline consumes them.

use async_stream::try_stream;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use memchr::memchr;
use std::error::Error as StdError;
use std::fmt;
use std::pin::Pin;
use tracing::debug;

use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::utils::url::construct_api_url;

/// Default API endpoint; overridable with `OPENAI_BASE_URL`.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// An ordered, finite sequence of response byte chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, StreamError>> + Send>>;

#[derive(Debug)]
pub enum StreamError {
    /// The request could not be sent or the connection dropped mid-stream.
    Transport(reqwest::Error),
    /// The provider answered with an error payload.
    Api(String),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Transport(source) => {
                write!(f, "Request to completion API failed: {source}")
            }
            StreamError::Api(message) => write!(f, "{message}"),
        }
    }
}

impl StdError for StreamError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StreamError::Transport(source) => Some(source),
            StreamError::Api(_) => None,
        }
    }
}

pub struct CompletionParams {
    pub client: reqwest::Client,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub prompt: String,
}

#[derive(Debug, PartialEq)]
enum SseEvent {
    Content(String),
    Done,
}

fn parse_sse_line(line: &str) -> Result<Option<SseEvent>, StreamError> {
    let Some(payload) = line.strip_prefix("data:").map(str::trim_start) else {
        // Comments, event names, and keep-alive blank lines.
        return Ok(None);
    };
    if payload == "[DONE]" {
        return Ok(Some(SseEvent::Done));
    }

    match serde_json::from_str::<ChatResponse>(payload) {
        Ok(response) => Ok(response
            .choices
            .first()
            .and_then(|choice| choice.delta.content.clone())
            .map(SseEvent::Content)),
        Err(_) => {
            if payload.trim().is_empty() {
                return Ok(None);
            }
            Err(StreamError::Api(format_api_error(payload)))
        }
    }
}

fn extract_error_message(value: &serde_json::Value) -> Option<String> {
    let message = value
        .pointer("/error/message")
        .and_then(serde_json::Value::as_str)
        .or_else(|| value.get("error").and_then(serde_json::Value::as_str))
        .or_else(|| value.get("message").and_then(serde_json::Value::as_str))?;
    let collapsed = message.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

fn format_api_error(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "API error: <empty response>".to_string();
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(message) = extract_error_message(&value) {
            return format!("API error: {message}");
        }
    }
    format!("API error: {trimmed}")
}

/// Open a live completion stream for one prompt.
///
/// Nothing is sent until the returned stream is first polled; the caller
/// owns the request lifecycle by consuming it.
pub fn open_completion_stream(params: CompletionParams) -> ChunkStream {
    Box::pin(try_stream! {
        let CompletionParams {
            client,
            base_url,
            api_key,
            model,
            temperature,
            prompt,
        } = params;

        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature,
            stream: true,
        };

        let url = construct_api_url(&base_url, "chat/completions");
        debug!("opening completion stream against {url}");

        let response = client
            .post(url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(StreamError::Transport)?;

        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(StreamError::Api(format_api_error(&body)))?;
        }

        let mut byte_stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        'receive: while let Some(chunk) = byte_stream.next().await {
            let chunk = chunk.map_err(StreamError::Transport)?;
            buffer.extend_from_slice(&chunk);

            while let Some(newline_pos) = memchr(b'\n', &buffer) {
                let line = String::from_utf8_lossy(&buffer[..newline_pos])
                    .trim()
                    .to_string();
                buffer.drain(..=newline_pos);

                match parse_sse_line(&line)? {
                    Some(SseEvent::Content(content)) => yield Bytes::from(content),
                    Some(SseEvent::Done) => break 'receive,
                    None => {}
                }
            }
        }
    })
}

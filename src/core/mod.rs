//! Core state and plumbing: configuration, the completion stream client,
//! the dry-run stream, and the sink pipeline.

pub mod chat;
pub mod chat_stream;
pub mod config;
pub mod mock_stream;
pub mod pipeline;

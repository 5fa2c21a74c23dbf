//! Plume is a command-line client for streaming LLM chat completions.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns configuration persistence, the completion stream client,
//!   the synthetic dry-run stream, and the pipeline that moves decoded
//!   response text into a sink.
//! - [`cli`] parses arguments, drives the interactive flows, and dispatches
//!   into [`core`].
//! - [`api`] defines the chat payloads exchanged with the provider.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;

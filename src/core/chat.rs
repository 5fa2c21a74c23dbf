//! The chat flow: resolve a prompt, open a completion stream, and drain it
//! into the requested sink.

use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::core::chat_stream::{open_completion_stream, CompletionParams, OPENAI_BASE_URL};
use crate::core::config::Config;
use crate::core::mock_stream::{mock_stream, DEFAULT_CHUNK_SIZE, DEFAULT_INITIAL_DELAY};
use crate::core::pipeline::{stream_to_sink, OutputSink};
use crate::utils::input::read_prompt_line;

/// Where the prompt text comes from. Exactly one source is used per
/// invocation; a literal prompt wins over a file, a file over interactive
/// entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptSource {
    Literal(String),
    FilePath(PathBuf),
    Interactive,
}

#[derive(Debug, Default)]
pub struct ChatOptions {
    pub prompt: Option<String>,
    pub input_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    /// Testing hook: substitute the synthetic stream for a live provider
    /// call. Not exposed on the CLI surface.
    pub dry_run: bool,
}

impl ChatOptions {
    pub fn prompt_source(&self) -> PromptSource {
        if let Some(prompt) = self.prompt.as_deref().filter(|p| !p.is_empty()) {
            PromptSource::Literal(prompt.to_string())
        } else if let Some(path) = &self.input_file {
            PromptSource::FilePath(path.clone())
        } else {
            PromptSource::Interactive
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ChatOutcome {
    Completed,
    Cancelled,
}

/// Run one chat invocation against a validated config.
///
/// Returns [`ChatOutcome::Cancelled`] when the interactive prompt is
/// cancelled or left empty; nothing is written in that case.
pub async fn run_chat(config: Config, options: ChatOptions) -> Result<ChatOutcome, Box<dyn Error>> {
    let prompt = match resolve_prompt(options.prompt_source())? {
        Some(prompt) => prompt,
        None => return Ok(ChatOutcome::Cancelled),
    };

    let stream = if options.dry_run {
        debug!("dry run: using the mock stream");
        mock_stream(DEFAULT_INITIAL_DELAY, DEFAULT_CHUNK_SIZE)
    } else {
        let base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| OPENAI_BASE_URL.to_string());
        open_completion_stream(CompletionParams {
            client: reqwest::Client::new(),
            base_url,
            api_key: config.api_key,
            model: config.model_name,
            temperature: config.temperature,
            prompt,
        })
    };

    let mut sink = match &options.output_file {
        Some(path) => OutputSink::file(path)
            .map_err(|e| format!("Failed to open output file {}: {e}", path.display()))?,
        None => OutputSink::console(),
    };

    stream_to_sink(stream, &mut sink).await?;
    Ok(ChatOutcome::Completed)
}

fn resolve_prompt(source: PromptSource) -> Result<Option<String>, Box<dyn Error>> {
    match source {
        PromptSource::Literal(prompt) => Ok(Some(prompt)),
        PromptSource::FilePath(path) => {
            debug!("reading prompt from {}", path.display());
            let contents = fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read prompt file {}: {e}", path.display()))?;
            Ok(Some(contents))
        }
        PromptSource::Interactive => {
            let entry = read_prompt_line("How can I assist you today?")?;
            // An empty entry cancels, same as a closed stdin.
            Ok(entry.filter(|text| !text.is_empty()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock_stream::SAMPLE_TEXT;
    use tempfile::TempDir;

    fn options(prompt: Option<&str>, input_file: Option<PathBuf>) -> ChatOptions {
        ChatOptions {
            prompt: prompt.map(str::to_string),
            input_file,
            ..Default::default()
        }
    }

    #[test]
    fn literal_prompt_wins_over_file_and_interactive() {
        let opts = options(Some("hi"), Some(PathBuf::from("prompt.txt")));
        assert_eq!(opts.prompt_source(), PromptSource::Literal("hi".to_string()));
    }

    #[test]
    fn file_wins_over_interactive() {
        let opts = options(None, Some(PathBuf::from("prompt.txt")));
        assert_eq!(
            opts.prompt_source(),
            PromptSource::FilePath(PathBuf::from("prompt.txt"))
        );
    }

    #[test]
    fn empty_literal_prompt_falls_through() {
        let opts = options(Some(""), Some(PathBuf::from("prompt.txt")));
        assert_eq!(
            opts.prompt_source(),
            PromptSource::FilePath(PathBuf::from("prompt.txt"))
        );
        assert_eq!(options(Some(""), None).prompt_source(), PromptSource::Interactive);
    }

    #[test]
    fn no_sources_means_interactive() {
        assert_eq!(options(None, None).prompt_source(), PromptSource::Interactive);
    }

    #[test]
    fn resolves_prompt_from_file_contents() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("prompt.txt");
        std::fs::write(&path, "Tell me a joke about math").expect("write prompt file");

        let resolved = resolve_prompt(PromptSource::FilePath(path)).expect("resolve failed");
        assert_eq!(resolved.as_deref(), Some("Tell me a joke about math"));
    }

    #[test]
    fn missing_prompt_file_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("absent.txt");
        assert!(resolve_prompt(PromptSource::FilePath(path)).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dry_run_streams_sample_into_output_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let out_path = temp_dir.path().join("response.txt");

        let config = Config {
            temperature: 0.5,
            model_name: "gpt-4o".to_string(),
            api_key: "sk-test".to_string(),
        };
        let opts = ChatOptions {
            prompt: Some("anything".to_string()),
            output_file: Some(out_path.clone()),
            dry_run: true,
            ..Default::default()
        };

        let outcome = run_chat(config, opts).await.expect("chat failed");
        assert_eq!(outcome, ChatOutcome::Completed);
        assert_eq!(
            std::fs::read_to_string(&out_path).expect("read back"),
            SAMPLE_TEXT
        );
    }
}

//! Command-line interface parsing and dispatch.

pub mod config_setup;


use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::config_setup::{run_config_setup, SetupOutcome};
use crate::core::chat::{run_chat, ChatOptions, ChatOutcome};
use crate::core::config::{ConfigDocument, ConfigError, ConfigStore};

#[derive(Parser)]
#[command(name = "plume")]
#[command(version)]
#[command(about = "Stream LLM chat completions from the command line")]
#[command(
    long_about = "Plume sends a prompt to a hosted chat-completion API and streams the \
response to your terminal or a file.\n\n\
Configuration (model name, sampling temperature, API key) lives in a JSON file \
under your per-user config directory; run 'plume config' to edit it \
interactively, or pass flags for a partial update. Running 'plume chat' with no \
usable config drops you into the same setup flow.\n\n\
Environment Variables:\n\
  OPENAI_BASE_URL   Custom API base URL (optional, defaults to https://api.openai.com/v1)\n\
  RUST_LOG          Overrides the logging filter set by --verbose"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Update configuration
    Config {
        /// The model name, e.g. "gpt-4o"
        #[arg(short = 'm', long = "modelName", value_name = "STR")]
        model_name: Option<String>,

        /// The OpenAI API key
        #[arg(short = 'k', long = "openAIApiKey", value_name = "STR")]
        api_key: Option<String>,

        /// The sampling temperature (0-1)
        #[arg(short = 't', long, value_name = "NUM")]
        temperature: Option<f64>,

        /// Run the interactive setup flow
        #[arg(short, long)]
        interactive: bool,
    },

    /// Chat with the configured model (default)
    Chat {
        /// Read the prompt from a text file
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// The prompt text
        #[arg(short, long, value_name = "STR")]
        prompt: Option<String>,

        /// Write the response to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let store = ConfigStore::from_default_path();
    let command = args.command.unwrap_or(Commands::Chat {
        input: None,
        prompt: None,
        output: None,
    });

    match command {
        Commands::Config {
            model_name,
            api_key,
            temperature,
            interactive,
        } => {
            let no_flags = model_name.is_none() && api_key.is_none() && temperature.is_none();
            if interactive || no_flags {
                return finish_setup(run_config_setup(&store)?);
            }

            debug!("applying non-interactive config update");
            store.save(ConfigDocument {
                temperature,
                model_name,
                api_key,
            })?;
            println!("✅ Config updated!");
            Ok(())
        }
        Commands::Chat {
            input,
            prompt,
            output,
        } => {
            run_chat_command(
                &store,
                ChatOptions {
                    prompt,
                    input_file: input,
                    output_file: output,
                    dry_run: false,
                },
            )
            .await
        }
    }
}

async fn run_chat_command(
    store: &ConfigStore,
    options: ChatOptions,
) -> Result<(), Box<dyn Error>> {
    let config = match store.load() {
        Ok(config) => config,
        Err(ConfigError::Validation(reason)) => {
            debug!("config not usable yet: {reason}");
            println!("Looks like this is your first run. Let's set up your config file.");
            return finish_setup(run_config_setup(store)?);
        }
        Err(other) => return Err(other.into()),
    };

    match run_chat(config, options).await? {
        ChatOutcome::Completed => Ok(()),
        ChatOutcome::Cancelled => {
            println!("Operation cancelled.");
            Ok(())
        }
    }
}

fn finish_setup(outcome: SetupOutcome) -> Result<(), Box<dyn Error>> {
    if let SetupOutcome::Cancelled = outcome {
        println!("Operation cancelled.");
    }
    Ok(())
}

/// Convert the top-level verbosity flag into the subscriber filter, exactly
/// once at startup. `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "warn,plume=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

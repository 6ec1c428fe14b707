//! narrate - Convert plain-text books into chunked audio narration

mod config;
mod library;
mod processor;
mod record;
mod text;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::NarrateConfig;
use processor::{BookProcessor, ProcessorSettings};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use text::Cl100kTokenizer;
use tts_client::providers::{OPENAI_API_KEY_ENV, OPENAI_PROVIDER};
use tts_client::{AudioFormat, ProviderConfig, Voice};

#[derive(Parser, Debug)]
#[command(name = "narrate")]
#[command(about = "Convert plain-text books into chunked audio narration", long_about = None)]
#[command(version)]
struct Args {
    /// Root directory holding books/ and audio_files/ (default: current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Directory of .txt books (default: <root>/books)
    #[arg(long)]
    books: Option<PathBuf>,

    /// Output directory for audio (default: <root>/audio_files)
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Maximum tokens per synthesis request
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Narrator voice (alloy, echo, fable, onyx, nova, shimmer)
    #[arg(long)]
    voice: Option<String>,

    /// Speech model identifier
    #[arg(long)]
    model: Option<String>,

    /// Output audio format (mp3, opus, aac, flac, wav)
    #[arg(long)]
    format: Option<String>,

    /// Per-request synthesis timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default voice
    SetVoice {
        /// Voice name
        voice: String,
    },
    /// Set default speech model
    SetModel {
        /// Model identifier
        model: String,
    },
    /// Set default maximum tokens per chunk
    SetMaxTokens {
        /// Value (> 0)
        value: usize,
    },
    /// Set default output audio format
    SetFormat {
        /// Format name
        format: String,
    },
    /// Store the OpenAI API key in the TTS config
    SetApiKey {
        /// API key
        key: String,
    },
    /// Point the OpenAI provider at a compatible endpoint
    SetBaseUrl {
        /// Base URL, e.g. http://localhost:8000/v1
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let mut config = NarrateConfig::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &args)?;
    config.validate().context("Invalid configuration")?;

    // Credentials are checked before any book is touched.
    let tts_config = tts_client::Config::load().context("Failed to load TTS configuration")?;
    let provider = tts_client::get_provider(&tts_config, Duration::from_secs(config.timeout_secs))?;
    provider.is_available()?;

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let (books_dir, audio_dir) = config.resolve_dirs(&cwd);
    for dir in [&books_dir, &audio_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    log::debug!("Books: {}", books_dir.display());
    log::debug!("Audio: {}", audio_dir.display());
    log::debug!(
        "Provider: {}, model: {}, voice: {}, format: {}, max tokens: {}",
        provider.name(),
        config.model,
        config.voice,
        config.format,
        config.max_tokens
    );

    let tokenizer = Cl100kTokenizer::new()?;
    let processor = BookProcessor::new(
        Box::new(tokenizer),
        Arc::from(provider),
        ProcessorSettings {
            audio_dir,
            max_tokens: config.max_tokens,
            voice: config.voice,
            model: config.model.clone(),
            format: config.format,
            timeout: Duration::from_secs(config.timeout_secs),
        },
    );

    let library = library::discover_documents(&books_dir)?;
    if library.documents.is_empty() {
        log::warn!("No books to process in {}", books_dir.display());
    }

    let summary = processor.run(library).await;
    summary.log();

    if summary.failed_chunks() > 0 || summary.unfinished_books() > 0 {
        log::warn!(
            "{} chunk(s) failed, {} book(s) unfinished",
            summary.failed_chunks(),
            summary.unfinished_books()
        );
    }

    Ok(())
}

/// Layer command-line flags over the loaded configuration.
fn apply_overrides(config: &mut NarrateConfig, args: &Args) -> Result<()> {
    if let Some(root) = &args.root {
        config.root_dir = Some(root.clone());
    }
    if let Some(books) = &args.books {
        config.books_dir = Some(books.clone());
    }
    if let Some(audio) = &args.audio {
        config.audio_dir = Some(audio.clone());
    }
    if let Some(max_tokens) = args.max_tokens {
        config.max_tokens = max_tokens;
    }
    if let Some(voice) = &args.voice {
        config.voice = voice.parse::<Voice>()?;
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(format) = &args.format {
        config.format = format.parse::<AudioFormat>()?;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = NarrateConfig::load()?;
            println!("Configuration file: {:?}", NarrateConfig::config_path()?);
            println!();
            match &config.root_dir {
                Some(root) => println!("root_dir = \"{}\"", root.display()),
                None => println!("root_dir = (current directory)"),
            }
            match &config.books_dir {
                Some(dir) => println!("books_dir = \"{}\"", dir.display()),
                None => println!("books_dir = (<root>/books)"),
            }
            match &config.audio_dir {
                Some(dir) => println!("audio_dir = \"{}\"", dir.display()),
                None => println!("audio_dir = (<root>/audio_files)"),
            }
            println!("max_tokens = {}", config.max_tokens);
            println!("voice = \"{}\"", config.voice);
            println!("model = \"{}\"", config.model);
            println!("format = \"{}\"", config.format);
            println!("timeout_secs = {}", config.timeout_secs);

            let tts_config = tts_client::Config::load()?;
            let openai = tts_config.get_provider_config(OPENAI_PROVIDER);
            println!();
            println!("TTS configuration file: {:?}", tts_client::Config::config_path()?);
            match openai.and_then(|c| c.api_key.as_deref()) {
                Some(key) => println!("api_key = {}", mask_key(key)),
                None => println!("api_key = (from {})", OPENAI_API_KEY_ENV),
            }
            match openai.and_then(|c| c.base_url.as_deref()) {
                Some(url) => println!("base_url = \"{}\"", url),
                None => println!("base_url = (default)"),
            }
        }
        ConfigAction::SetVoice { voice } => {
            let mut config = NarrateConfig::load()?;
            config.voice = voice.parse()?;
            config.save()?;
            println!("Default voice set to: {}", config.voice);
        }
        ConfigAction::SetModel { model } => {
            let mut config = NarrateConfig::load()?;
            config.model = model.clone();
            config.validate()?;
            config.save()?;
            println!("Default model set to: {}", config.model);
        }
        ConfigAction::SetMaxTokens { value } => {
            let mut config = NarrateConfig::load()?;
            config.max_tokens = *value;
            config.validate()?;
            config.save()?;
            println!("Default max tokens set to: {}", config.max_tokens);
        }
        ConfigAction::SetFormat { format } => {
            let mut config = NarrateConfig::load()?;
            config.format = format.parse()?;
            config.save()?;
            println!("Default format set to: {}", config.format);
        }
        ConfigAction::SetApiKey { key } => {
            let key = key.trim();
            if key.is_empty() {
                anyhow::bail!("API key must not be empty");
            }
            update_openai_config(&tts_client::Config::config_path()?, |openai| {
                openai.api_key = Some(key.to_string());
            })?;
            println!("OpenAI API key set to: {}", mask_key(key));
        }
        ConfigAction::SetBaseUrl { url } => {
            update_openai_config(&tts_client::Config::config_path()?, |openai| {
                openai.base_url = Some(url.trim().to_string());
            })?;
            println!("OpenAI base URL set to: {}", url.trim());
        }
    }
    Ok(())
}

/// Edit the OpenAI provider table of the TTS config stored at `path`.
fn update_openai_config(path: &Path, edit: impl FnOnce(&mut ProviderConfig)) -> Result<()> {
    let mut config = tts_client::Config::load_from(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    edit(config.provider_mut(OPENAI_PROVIDER));
    config
        .save_to(path)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}

/// Show only the last four characters of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let visible: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("****{}", visible)
}

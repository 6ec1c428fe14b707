//! narrate configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tts_client::{AudioFormat, Voice};

use crate::text::chunker::DEFAULT_MAX_TOKENS;

const DEFAULT_MODEL: &str = "tts-1-hd";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrateConfig {
    /// Root that books/ and audio_files/ are resolved against. None means the current directory.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,

    /// Directory of input .txt books (default: <root>/books)
    #[serde(default)]
    pub books_dir: Option<PathBuf>,

    /// Directory that receives audio output (default: <root>/audio_files)
    #[serde(default)]
    pub audio_dir: Option<PathBuf>,

    /// Maximum tokens per synthesis request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Narrator voice
    #[serde(default)]
    pub voice: Voice,

    /// Speech model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Audio container for output files
    #[serde(default)]
    pub format: AudioFormat,

    /// Per-request synthesis timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for NarrateConfig {
    fn default() -> Self {
        Self {
            root_dir: None,
            books_dir: None,
            audio_dir: None,
            max_tokens: default_max_tokens(),
            voice: Voice::default(),
            model: default_model(),
            format: AudioFormat::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl NarrateConfig {
    /// Get the config file path: ~/.config/cli-programs/narrate.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("narrate.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: NarrateConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            anyhow::bail!("max_tokens must be greater than zero");
        }
        if self.model.trim().is_empty() {
            anyhow::bail!("model must not be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Resolve the input and output directories against the root.
    pub fn resolve_dirs(&self, cwd: &Path) -> (PathBuf, PathBuf) {
        let root = self.root_dir.clone().unwrap_or_else(|| cwd.to_path_buf());
        let books = self.books_dir.clone().unwrap_or_else(|| root.join("books"));
        let audio = self
            .audio_dir
            .clone()
            .unwrap_or_else(|| root.join("audio_files"));
        (books, audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NarrateConfig::default();
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.voice, Voice::Onyx);
        assert_eq!(config.model, "tts-1-hd");
        assert_eq!(config.format, AudioFormat::Mp3);
        assert_eq!(config.timeout_secs, 120);
        assert!(config.root_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_path() {
        let path = NarrateConfig::config_path().unwrap();
        assert!(path.ends_with("cli-programs/narrate.toml"));
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
root_dir = "/srv/narration"
max_tokens = 2000
voice = "nova"
model = "tts-1"
format = "flac"
timeout_secs = 30
"#;
        let config: NarrateConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.root_dir, Some(PathBuf::from("/srv/narration")));
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.voice, Voice::Nova);
        assert_eq!(config.model, "tts-1");
        assert_eq!(config.format, AudioFormat::Flac);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: NarrateConfig = toml::from_str("").unwrap();
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.voice, Voice::Onyx);
        assert_eq!(config.model, "tts-1-hd");
    }

    #[test]
    fn test_rejects_unknown_voice() {
        let result: std::result::Result<NarrateConfig, _> = toml::from_str("voice = \"robot\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_zero_max_tokens() {
        let config = NarrateConfig {
            max_tokens: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_dirs_defaults_to_root() {
        let config = NarrateConfig::default();
        let (books, audio) = config.resolve_dirs(Path::new("/work"));
        assert_eq!(books, PathBuf::from("/work/books"));
        assert_eq!(audio, PathBuf::from("/work/audio_files"));

        let config = NarrateConfig {
            root_dir: Some(PathBuf::from("/srv")),
            audio_dir: Some(PathBuf::from("/mnt/out")),
            ..Default::default()
        };
        let (books, audio) = config.resolve_dirs(Path::new("/work"));
        assert_eq!(books, PathBuf::from("/srv/books"));
        assert_eq!(audio, PathBuf::from("/mnt/out"));
    }
}

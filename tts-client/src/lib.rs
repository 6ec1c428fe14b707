//! Shared text-to-speech client library for the narrate workspace
//!
//! Provides a single seam for speech synthesis backends:
//! - OpenAI speech API (direct)
//! - Mock provider (tests)

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::{Config, ProviderConfig};
pub use error::{Result, TtsError};
pub use provider::{AudioFormat, SpeechProvider, SpeechRequest, SpeechResponse, Voice};
pub use providers::{MockProvider, OpenAiSpeechProvider, get_provider};

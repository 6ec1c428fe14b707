//! Speech provider implementations

pub mod mock;
mod openai;

pub use mock::MockProvider;
pub use openai::{DEFAULT_BASE_URL, OpenAiSpeechProvider};

use std::time::Duration;

use crate::config::{Config, ProviderConfig};
use crate::error::{Result, TtsError};
use crate::provider::SpeechProvider;

/// Config table name for the OpenAI provider
pub const OPENAI_PROVIDER: &str = "openai";

/// Environment variable holding the OpenAI API key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Create the speech provider described by `config`
///
/// Fails fast with [`TtsError::MissingApiKey`] when no credential is configured.
pub fn get_provider(config: &Config, timeout: Duration) -> Result<Box<dyn SpeechProvider>> {
    let provider_config = config.get_provider_config(OPENAI_PROVIDER);
    let api_key = get_api_key(provider_config, OPENAI_API_KEY_ENV, "OpenAI")?;
    let base_url = provider_config
        .and_then(|c| c.base_url.as_deref())
        .unwrap_or(DEFAULT_BASE_URL);

    Ok(Box::new(OpenAiSpeechProvider::new(
        base_url, api_key, timeout,
    )?))
}

/// Get API key from config or environment variable
fn get_api_key(
    config: Option<&ProviderConfig>,
    env_var: &str,
    provider_name: &str,
) -> Result<String> {
    // Check config first
    if let Some(key) = config.and_then(|c| c.api_key.clone()) {
        return Ok(key);
    }

    std::env::var(env_var)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| TtsError::MissingApiKey {
            provider: provider_name.to_string(),
            env_var: env_var.to_string(),
        })
}

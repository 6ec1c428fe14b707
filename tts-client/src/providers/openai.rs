//! OpenAI speech API provider
//!
//! Also works against self-hosted services exposing the same
//! `/audio/speech` endpoint via a custom `base_url`.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, TtsError};
use crate::provider::{SpeechProvider, SpeechRequest, SpeechResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Provider for the OpenAI `/audio/speech` endpoint
pub struct OpenAiSpeechProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenAiSpeechProvider {
    /// Create a new provider; `timeout` bounds each synthesis request
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TtsError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn speech_url(&self) -> String {
        format!("{}/audio/speech", self.base_url)
    }
}

// OpenAI API request/response types

#[derive(Debug, Serialize)]
struct SpeechApiRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Pull the human-readable message out of an error body, falling back to the raw text
fn error_message(body: String) -> String {
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body,
    }
}

#[async_trait]
impl SpeechProvider for OpenAiSpeechProvider {
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechResponse> {
        let body = SpeechApiRequest {
            model: &request.model,
            input: &request.text,
            voice: request.voice.as_str(),
            response_format: request.format.extension(),
        };

        log::debug!(
            "POST {} (model={}, voice={}, {} chars)",
            self.speech_url(),
            request.model,
            request.voice,
            request.text.len()
        );

        let response = self
            .client
            .post(self.speech_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else {
                    TtsError::ApiError {
                        message: format!("Request failed: {}", e),
                        status_code: None,
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let message = error_message(response.text().await.unwrap_or_default());

            return Err(match status.as_u16() {
                429 => TtsError::RateLimited { retry_after },
                503 => TtsError::ServerOverloaded { message },
                code => TtsError::ApiError {
                    message,
                    status_code: Some(code),
                },
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else {
                    TtsError::InvalidResponse(format!("Failed to read audio: {}", e))
                }
            })?
            .to_vec();

        if audio.is_empty() {
            return Err(TtsError::InvalidResponse("empty audio body".to_string()));
        }

        Ok(SpeechResponse {
            audio,
            model: request.model,
        })
    }

    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn is_available(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(TtsError::MissingApiKey {
                provider: self.name().to_string(),
                env_var: super::OPENAI_API_KEY_ENV.to_string(),
            });
        }
        Ok(())
    }
}

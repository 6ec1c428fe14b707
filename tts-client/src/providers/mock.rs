//! Mock speech provider for testing
//!
//! Simulates successful synthesis, failures, and failure-then-success
//! sequences, and records every request it receives.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, TtsError};
use crate::provider::{SpeechProvider, SpeechRequest, SpeechResponse};

/// A mock provider for exercising failure handling
pub struct MockProvider {
    /// Calls with an index in this list fail
    failing_calls: Vec<usize>,
    /// Number of leading calls that fail
    fail_count: usize,
    /// Current call count
    call_count: AtomicUsize,
    /// Error to return on failure
    fail_with: TtsError,
    /// Audio bytes returned on success
    audio: Vec<u8>,
    /// Every request seen, in call order
    requests: Mutex<Vec<SpeechRequest>>,
}

impl MockProvider {
    fn build(fail_count: usize, failing_calls: Vec<usize>, error: TtsError, audio: &[u8]) -> Self {
        Self {
            failing_calls,
            fail_count,
            call_count: AtomicUsize::new(0),
            fail_with: error,
            audio: audio.to_vec(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that always succeeds with the given audio bytes
    pub fn always_succeeds(audio: &[u8]) -> Self {
        Self::build(0, Vec::new(), TtsError::Timeout, audio)
    }

    /// Create a provider that always fails with the given error
    pub fn always_fails(error: TtsError) -> Self {
        Self::build(usize::MAX, Vec::new(), error, &[])
    }

    /// Create a provider that fails `n` times with the given error, then succeeds
    pub fn fails_then_succeeds(n: usize, error: TtsError, audio: &[u8]) -> Self {
        Self::build(n, Vec::new(), error, audio)
    }

    /// Create a provider that fails only on the listed (0-based) calls
    pub fn fails_on_calls(calls: &[usize], error: TtsError, audio: &[u8]) -> Self {
        Self::build(0, calls.to_vec(), error, audio)
    }

    /// Get the number of times synthesize() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Texts of all requests received so far
    pub fn request_texts(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.iter().map(|req| req.text.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SpeechProvider for MockProvider {
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechResponse> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        let model = request.model.clone();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if call_num < self.fail_count || self.failing_calls.contains(&call_num) {
            return Err(clone_error(&self.fail_with));
        }

        Ok(SpeechResponse {
            audio: self.audio.clone(),
            model,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}

/// Clone a TtsError (needed because TtsError doesn't implement Clone)
fn clone_error(err: &TtsError) -> TtsError {
    match err {
        TtsError::MissingApiKey { provider, env_var } => TtsError::MissingApiKey {
            provider: provider.clone(),
            env_var: env_var.clone(),
        },
        TtsError::Timeout => TtsError::Timeout,
        TtsError::RateLimited { retry_after } => TtsError::RateLimited {
            retry_after: *retry_after,
        },
        TtsError::ServerOverloaded { message } => TtsError::ServerOverloaded {
            message: message.clone(),
        },
        TtsError::ApiError {
            message,
            status_code,
        } => TtsError::ApiError {
            message: message.clone(),
            status_code: *status_code,
        },
        TtsError::InvalidResponse(s) => TtsError::InvalidResponse(s.clone()),
        TtsError::InvalidVoice(s) => TtsError::InvalidVoice(s.clone()),
        TtsError::InvalidFormat(s) => TtsError::InvalidFormat(s.clone()),
        TtsError::ConfigError(s) => TtsError::ConfigError(s.clone()),
        // For Io and Toml errors, we create a generic error since they can't be cloned
        TtsError::Io(_) => TtsError::ConfigError("IO error (mock)".to_string()),
        TtsError::TomlParse(_) => TtsError::ConfigError("TOML parse error (mock)".to_string()),
        TtsError::TomlSerialize(_) => {
            TtsError::ConfigError("TOML serialize error (mock)".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{AudioFormat, Voice};

    fn request(text: &str) -> SpeechRequest {
        SpeechRequest {
            text: text.to_string(),
            voice: Voice::Onyx,
            model: "tts-1-hd".to_string(),
            format: AudioFormat::Mp3,
        }
    }

    #[tokio::test]
    async fn test_always_succeeds() {
        let provider = MockProvider::always_succeeds(b"audio");

        let result = provider.synthesize(request("hello")).await;
        let response = result.unwrap();
        assert_eq!(response.audio, b"audio");
        assert_eq!(response.model, "tts-1-hd");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.request_texts(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_always_fails() {
        let provider = MockProvider::always_fails(TtsError::ServerOverloaded {
            message: "overloaded".to_string(),
        });

        for _ in 0..3 {
            let result = provider.synthesize(request("x")).await;
            assert!(matches!(result, Err(TtsError::ServerOverloaded { .. })));
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fails_then_succeeds() {
        let provider = MockProvider::fails_then_succeeds(2, TtsError::Timeout, b"ok");

        assert!(provider.synthesize(request("a")).await.is_err());
        assert!(provider.synthesize(request("b")).await.is_err());

        let result = provider.synthesize(request("c")).await;
        assert_eq!(result.unwrap().audio, b"ok");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fails_on_calls() {
        let provider = MockProvider::fails_on_calls(&[1], TtsError::Timeout, b"ok");

        assert!(provider.synthesize(request("a")).await.is_ok());
        assert!(provider.synthesize(request("b")).await.is_err());
        assert!(provider.synthesize(request("c")).await.is_ok());
    }
}

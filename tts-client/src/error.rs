use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error(
        "API key not found for {provider}. Set {env_var} environment variable or add to config."
    )]
    MissingApiKey { provider: String, env_var: String },

    #[error("Speech request timed out")]
    Timeout,

    #[error("Rate limit exceeded{}", .retry_after.map(|s| format!(". Retry after {} seconds", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("Server overloaded (HTTP 503): {message}")]
    ServerOverloaded { message: String },

    #[error("API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unknown voice: {0} (expected one of alloy, echo, fable, onyx, nova, shimmer)")]
    InvalidVoice(String),

    #[error("Unknown audio format: {0} (expected one of mp3, opus, aac, flac, wav)")]
    InvalidFormat(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl TtsError {
    /// Whether retrying the same request later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TtsError::Timeout | TtsError::RateLimited { .. } | TtsError::ServerOverloaded { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TtsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message() {
        let err = TtsError::RateLimited {
            retry_after: Some(30),
        };
        assert_eq!(err.to_string(), "Rate limit exceeded. Retry after 30 seconds");

        let err = TtsError::RateLimited { retry_after: None };
        assert_eq!(err.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn test_api_error_message() {
        let err = TtsError::ApiError {
            message: "bad input".to_string(),
            status_code: Some(400),
        };
        assert_eq!(err.to_string(), "API error (HTTP 400): bad input");
    }

    #[test]
    fn test_transient_classification() {
        assert!(TtsError::Timeout.is_transient());
        assert!(
            TtsError::ServerOverloaded {
                message: String::new()
            }
            .is_transient()
        );
        assert!(!TtsError::InvalidVoice("robot".into()).is_transient());
        assert!(
            !TtsError::ApiError {
                message: String::new(),
                status_code: Some(401)
            }
            .is_transient()
        );
    }
}

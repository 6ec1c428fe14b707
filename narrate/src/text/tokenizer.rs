//! Tokenizer seam used to bound chunk sizes.

use std::collections::HashSet;
use thiserror::Error;
use tiktoken_rs::CoreBPE;

#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("Failed to load {encoding} encoding: {message}")]
    Load { encoding: String, message: String },

    #[error("Failed to decode tokens {start}..{end}: {message}")]
    Decode {
        start: usize,
        end: usize,
        message: String,
    },

    #[error("max_tokens must be greater than zero")]
    ZeroLimit,
}

/// Converts text to and from integer token ids under a fixed encoding.
pub trait Tokenizer: Send + Sync {
    /// Encode text into token ids.
    fn encode(&self, text: &str) -> Vec<u32>;

    /// Decode a run of token ids back into text.
    ///
    /// Errors carry offsets relative to `tokens`.
    fn decode(&self, tokens: &[u32]) -> Result<String, TokenizerError>;

    /// Encoding name for logs.
    fn name(&self) -> &str;
}

/// Number of ordinary ranks in `cl100k_base` (ranks `0..100_256`).
const CL100K_ORDINARY_RANKS: u32 = 100_256;

/// The `cl100k_base` BPE encoding.
///
/// Book text is always encoded as ordinary text, so a literal
/// `<|endoftext|>` in a book is spelled out rather than becoming a
/// control token. Decoding is lossy: a window that starts or ends inside
/// a multi-byte character gets U+FFFD in place of the broken bytes.
pub struct Cl100kTokenizer {
    bpe: CoreBPE,
    special_ranks: HashSet<u32>,
}

impl Cl100kTokenizer {
    pub const ENCODING: &'static str = "cl100k_base";

    pub fn new() -> Result<Self, TokenizerError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| TokenizerError::Load {
            encoding: Self::ENCODING.to_string(),
            message: e.to_string(),
        })?;
        let special_ranks = [
            tiktoken_rs::ENDOFTEXT,
            tiktoken_rs::FIM_PREFIX,
            tiktoken_rs::FIM_MIDDLE,
            tiktoken_rs::FIM_SUFFIX,
            tiktoken_rs::ENDOFPROMPT,
        ]
        .iter()
        .flat_map(|token| bpe.encode_with_special_tokens(token))
        .collect();
        Ok(Self { bpe, special_ranks })
    }

    fn is_known(&self, token: u32) -> bool {
        token < CL100K_ORDINARY_RANKS || self.special_ranks.contains(&token)
    }
}

impl Tokenizer for Cl100kTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        self.bpe.encode_ordinary(text)
    }

    fn decode(&self, tokens: &[u32]) -> Result<String, TokenizerError> {
        if let Some(i) = tokens.iter().position(|&t| !self.is_known(t)) {
            return Err(TokenizerError::Decode {
                start: i,
                end: i + 1,
                message: format!("unknown token {}", tokens[i]),
            });
        }

        let bytes: Vec<u8> = self
            .bpe
            ._decode_native_and_split(tokens.to_vec())
            .flatten()
            .collect();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn name(&self) -> &str {
        Self::ENCODING
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// One token per `char`, so token counts are exact in tests.
    pub(crate) struct CharTokenizer;

    impl Tokenizer for CharTokenizer {
        fn encode(&self, text: &str) -> Vec<u32> {
            text.chars().map(|c| c as u32).collect()
        }

        fn decode(&self, tokens: &[u32]) -> Result<String, TokenizerError> {
            tokens
                .iter()
                .enumerate()
                .map(|(i, &t)| {
                    char::from_u32(t).ok_or_else(|| TokenizerError::Decode {
                        start: i,
                        end: i + 1,
                        message: format!("invalid code point {}", t),
                    })
                })
                .collect()
        }

        fn name(&self) -> &str {
            "chars"
        }
    }

    #[test]
    fn test_char_tokenizer() {
        let tok = CharTokenizer;
        let tokens = tok.encode("héllo");
        assert_eq!(tokens.len(), 5);
        assert_eq!(tok.decode(&tokens).unwrap(), "héllo");
        assert!(tok.decode(&[0xD800]).is_err());
    }

    #[test]
    fn test_cl100k_roundtrip_ascii() {
        let tok = Cl100kTokenizer::new().unwrap();
        let text = "It was a dark and stormy night; the rain fell in torrents.";
        let tokens = tok.encode(text);
        assert!(!tokens.is_empty());
        assert!(tokens.len() < text.len());
        assert_eq!(tok.decode(&tokens).unwrap(), text);
        assert_eq!(tok.name(), "cl100k_base");
    }

    #[test]
    fn test_cl100k_empty() {
        let tok = Cl100kTokenizer::new().unwrap();
        assert!(tok.encode("").is_empty());
        assert_eq!(tok.decode(&[]).unwrap(), "");
    }

    #[test]
    fn test_cl100k_special_token_text_is_ordinary() {
        let tok = Cl100kTokenizer::new().unwrap();
        let text = "The end.<|endoftext|>";
        let tokens = tok.encode(text);
        assert!(!tokens.iter().any(|t| tok.special_ranks.contains(t)));
        assert_eq!(tok.decode(&tokens).unwrap(), text);
    }

    #[test]
    fn test_cl100k_split_character_decodes_lossily() {
        let tok = Cl100kTokenizer::new().unwrap();
        let text = "日本語のテキスト。🙂 Café naïve 𝔘𝔫𝔦𝔠𝔬𝔡𝔢";
        let tokens = tok.encode(text);

        // Some single tokens hold only part of a character.
        let singles: Vec<String> = tokens
            .iter()
            .map(|t| tok.decode(std::slice::from_ref(t)).unwrap())
            .collect();
        assert!(singles.iter().any(|s| s.contains('\u{FFFD}')));
        assert_eq!(tok.decode(&tokens).unwrap(), text);
    }

    #[test]
    fn test_cl100k_unknown_token_is_error() {
        let tok = Cl100kTokenizer::new().unwrap();
        let hello = tok.encode("hello");
        let mut tokens = hello.clone();
        tokens.push(CL100K_ORDINARY_RANKS);
        match tok.decode(&tokens) {
            Err(TokenizerError::Decode { start, end, .. }) => {
                assert_eq!((start, end), (hello.len(), hello.len() + 1));
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }
}

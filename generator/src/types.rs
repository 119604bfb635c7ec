//! Generator data types

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::GeneratorError;

/// Chat completion result
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub content: String,
    pub tokens_used: u32,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub model_used: String,
    pub response_time: Duration,
}

/// Image bytes as returned by the image generator
#[derive(Clone, PartialEq, Eq)]
pub struct RawImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl RawImage {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self { bytes, content_type }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for RawImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawImage")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Backend used for post text, chosen once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextProvider {
    #[default]
    Gpt,
    Claude,
}

impl fmt::Display for TextProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextProvider::Gpt => write!(f, "gpt"),
            TextProvider::Claude => write!(f, "claude"),
        }
    }
}

impl FromStr for TextProvider {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "gpt" | "openai" => Ok(TextProvider::Gpt),
            "claude" | "anthropic" => Ok(TextProvider::Claude),
            other => Err(GeneratorError::ConfigError {
                message: format!("unknown text generation provider '{other}' (expected gpt | claude)"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_provider_parsing() {
        assert_eq!("gpt".parse::<TextProvider>().unwrap(), TextProvider::Gpt);
        assert_eq!(" Claude ".parse::<TextProvider>().unwrap(), TextProvider::Claude);
        assert_eq!("".parse::<TextProvider>().unwrap(), TextProvider::Gpt);
        assert!("gemini".parse::<TextProvider>().is_err());
    }

    #[test]
    fn test_raw_image_debug_hides_bytes() {
        let image = RawImage::new(vec![0u8; 2048], Some("image/png".to_string()));
        let printed = format!("{image:?}");
        assert!(printed.contains("len: 2048"));
        assert!(!printed.contains("0, 0, 0"));
    }
}

//! Content generation adapters for the word-of-the-day autopilot
//!
//! Every adapter sits behind a trait from [`traits`] so the orchestrator can
//! be wired with real HTTP-backed services at startup and with mocks in tests.

pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

// Re-export main types
pub use error::{GeneratorError, GeneratorResult};
pub use traits::{ChatBackend, ImageCompositor, ImageGenerator, ImagePromptGenerator, TextGenerator};
pub use types::{ProviderResponse, RawImage, TextProvider};

// Re-export trait mocks for downstream test suites
pub use traits::{
    MockChatBackend, MockImageCompositor, MockImageGenerator, MockImagePromptGenerator, MockTextGenerator,
};

pub use core::PromptTemplates;
pub use services::{
    build_text_generator, AnthropicChat, ChatImagePromptGenerator, ChatTextGenerator, FileCompositor,
    OpenAiChat, ReplicateImageGenerator,
};

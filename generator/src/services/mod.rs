//! HTTP-backed implementations of the generator traits

mod http;

pub mod anthropic;
pub mod compositor;
pub mod image_prompt;
pub mod openai;
pub mod replicate;
pub mod text_generator;

pub use anthropic::AnthropicChat;
pub use compositor::FileCompositor;
pub use image_prompt::ChatImagePromptGenerator;
pub use openai::OpenAiChat;
pub use replicate::ReplicateImageGenerator;
pub use text_generator::{build_text_generator, ChatTextGenerator};

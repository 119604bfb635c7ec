//! Generator core logic: prompt templates and text post-processing

pub mod formatting;
pub mod prompt;

pub use formatting::{apply_unicode_bold, polish_post_text, safe_file_stem, strip_heading_lines};
pub use prompt::PromptTemplates;

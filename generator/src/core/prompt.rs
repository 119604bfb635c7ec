//! Prompt templates for the two LLM calls of a run
//!
//! Templates use `{word}` and `{post_text}` placeholders. Built-in defaults
//! can be overridden per file from a prompts directory so the wording can be
//! tuned without a rebuild.

use std::path::Path;
use tracing::{debug, info};

use crate::error::{GeneratorError, GeneratorResult};

const DEFAULT_TEXT_SYSTEM: &str = "\
You are an educational content writer for a Facebook page that teaches one English word per day.

Formatting rule: wrap any English word or term you want to appear bold with double asterisks, \
e.g. **ephemeral**. Do NOT use ** anywhere else.";

const DEFAULT_TEXT_USER: &str = "\
Today's word: {word}

Requirements:
- Start with the meaning of the word.
- Then write 3-5 sentences showing the word in a vivid, relatable everyday scene.
- Use the target word 2-3 times in different contexts, in different forms where possible.
- Use line breaks between sentences or when the scene shifts.
- Keep the tone natural and conversational, never formal or robotic.

After the story, add a blank line and write exactly 2 example sentences using the word naturally.";

const DEFAULT_IMAGE_SYSTEM: &str = "\
You are an expert at creating concise, vivid image prompts for SDXL Lightning that capture action and emotion.";

const DEFAULT_IMAGE_USER: &str = "\
Based on this post about the word '{word}', create an image prompt for SDXL Lightning.

Post:
{post_text}

Decide whether the word is best shown through a person, a group, a place or an event, \
then describe that scene in cinematic detail.
Write only the final image prompt in a single paragraph. No explanations, no bullet points, no word labels.";

pub const TEXT_SYSTEM_FILE: &str = "text_system.txt";
pub const TEXT_USER_FILE: &str = "text_user.txt";
pub const IMAGE_SYSTEM_FILE: &str = "image_system.txt";
pub const IMAGE_USER_FILE: &str = "image_user.txt";

/// The four prompt templates used by text and image-prompt generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    pub text_system: String,
    pub text_user: String,
    pub image_system: String,
    pub image_user: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            text_system: DEFAULT_TEXT_SYSTEM.to_string(),
            text_user: DEFAULT_TEXT_USER.to_string(),
            image_system: DEFAULT_IMAGE_SYSTEM.to_string(),
            image_user: DEFAULT_IMAGE_USER.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Load templates, replacing each default whose override file exists in `dir`
    ///
    /// A missing directory is not an error; an unreadable or blank override is.
    pub fn load(dir: &Path) -> GeneratorResult<Self> {
        let mut templates = Self::default();
        if !dir.is_dir() {
            debug!("No prompts directory at {}, using built-in templates", dir.display());
            return Ok(templates);
        }

        let slots: [(&str, &mut String); 4] = [
            (TEXT_SYSTEM_FILE, &mut templates.text_system),
            (TEXT_USER_FILE, &mut templates.text_user),
            (IMAGE_SYSTEM_FILE, &mut templates.image_system),
            (IMAGE_USER_FILE, &mut templates.image_user),
        ];

        for (file_name, slot) in slots {
            let path = dir.join(file_name);
            if !path.is_file() {
                continue;
            }
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                return Err(GeneratorError::ConfigError {
                    message: format!("prompt override {} is empty", path.display()),
                });
            }
            info!("Using prompt override {}", path.display());
            *slot = content;
        }

        Ok(templates)
    }

    pub fn render_text_user(&self, word: &str) -> String {
        self.text_user.replace("{word}", word.trim())
    }

    pub fn render_image_user(&self, word: &str, post_text: &str) -> String {
        self.image_user
            .replace("{word}", word.trim())
            .replace("{post_text}", post_text.trim())
    }
}

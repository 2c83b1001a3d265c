//! Prompt stage: expand a subject into an image description.

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::constants::{MAX_PROMPT_CHARS, PROMPT_LENGTH_INSTRUCTION};
use crate::error::DndImgError;
use crate::openai::{ChatMessage, OpenAiClient};

/// Something that can write an image description for a subject.
#[async_trait]
pub trait PromptGenerator: Send + Sync {
    /// Returns a description of at most [`MAX_PROMPT_CHARS`] characters.
    async fn generate(&self, subject: &str) -> Result<String, DndImgError>;
}

/// Cuts `prompt` down to the first [`MAX_PROMPT_CHARS`] characters. No word boundaries.
pub fn truncate_prompt(prompt: String) -> String {
    match prompt.char_indices().nth(MAX_PROMPT_CHARS) {
        Some((byte_idx, _)) => {
            let mut prompt = prompt;
            prompt.truncate(byte_idx);
            prompt
        }
        None => prompt,
    }
}

/// [`PromptGenerator`] backed by OpenAI chat completions.
#[derive(Clone, Debug)]
pub struct OpenAiPromptGenerator {
    client: OpenAiClient,
    model: String,
    system_prompt: String,
    web_search_prompt: String,
}

impl OpenAiPromptGenerator {
    /// Builds a generator from the shared client and config.
    pub fn new(client: OpenAiClient, config: &Config) -> Self {
        Self {
            client,
            model: config.text_model.clone(),
            system_prompt: config.system_prompt.clone(),
            web_search_prompt: config.web_search_prompt.clone(),
        }
    }

    fn messages(&self, subject: &str) -> [ChatMessage; 2] {
        [
            ChatMessage::system(format!(
                "{}\n{PROMPT_LENGTH_INSTRUCTION}",
                self.system_prompt
            )),
            ChatMessage::user(format!("{}\nSubject: {subject}", self.web_search_prompt)),
        ]
    }
}

#[async_trait]
impl PromptGenerator for OpenAiPromptGenerator {
    async fn generate(&self, subject: &str) -> Result<String, DndImgError> {
        let prompt = self
            .client
            .chat_completion(&self.model, &self.messages(subject))
            .await
            .map_err(|err| DndImgError::Generation(err.context("failed to generate prompt")))?;

        let original_len = prompt.chars().count();
        let prompt = truncate_prompt(prompt);
        if original_len > MAX_PROMPT_CHARS {
            debug!("Truncated prompt for {subject} from {original_len} characters");
        }
        debug!("Prompt for {subject}: {prompt}");
        Ok(prompt)
    }
}

//! Shared constants/defaults for things
//!

use std::time::Duration;

/// Default system prompt for the description stage.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert in Dungeons & Dragons art direction, specializing in the iconic 90s TSR catalog style. Your task is to create focused, clear descriptions that depict individual D&D subjects (items, monsters, weapons, spells, etc.) in a way that would fit perfectly in a D&D catalog or rulebook. Focus on clear, isolated depictions that showcase the subject's key features while maintaining the dramatic, high-fantasy aesthetic of classic TSR-era hand-painted artwork. Ensure the descriptions emphasize traditional painting techniques, brush strokes, and artistic style rather than photographic realism.";

/// Default research/style instruction sent alongside the subject.
pub const DEFAULT_WEB_SEARCH_PROMPT: &str = r#"Research and analyze this D&D subject, focusing on:
1. Core visual characteristics and defining features
2. Historical context and significance in D&D lore
3. Typical appearance and key details
4. Common interactions or effects (if applicable)
5. Key artistic elements from 90s D&D catalog style (clear composition, dramatic lighting, rich textures, hand-painted aesthetic)

Generate a detailed description that would serve as a perfect prompt for creating a piece of hand-painted art that could have appeared in a 90s D&D catalog or rulebook."#;

/// Appended to the system prompt so the model keeps the description short.
pub const PROMPT_LENGTH_INSTRUCTION: &str =
    "Generate a concise image prompt under 1000 characters that captures the essence of the subject.";

/// Hard upper bound (in characters) on a generated image prompt.
pub const MAX_PROMPT_CHARS: usize = 1000;

/// Default separator between records in a subjects file.
pub const DEFAULT_SUBJECTS_DELIMITER: &str = "\n";

/// Where images go unless told otherwise.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Chat model used to write image descriptions.
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4o";

/// Image model used to render descriptions.
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// OpenAI REST base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Images are always square.
pub const IMAGE_SIZE: &str = "1024x1024";

/// Default spacing between batch requests, in seconds.
pub const DEFAULT_RATE_LIMIT_SECONDS: u64 = 20;

/// Default spacing between batch requests.
pub const DEFAULT_RATE_LIMIT_INTERVAL: Duration = Duration::from_secs(DEFAULT_RATE_LIMIT_SECONDS);

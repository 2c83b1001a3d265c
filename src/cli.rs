//! CLI parser
use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::constants::{
    DEFAULT_IMAGE_MODEL, DEFAULT_OPENAI_BASE_URL, DEFAULT_OUTPUT_DIR, DEFAULT_RATE_LIMIT_SECONDS,
    DEFAULT_TEXT_MODEL,
};

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "dndimg", about = "Generate D&D SRD subject images using AI")]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["subject", "subjects_file"])
))]
/// CLI Options
pub struct CliOptions {
    /// The D&D subject to generate an image for
    pub subject: Option<String>,

    #[clap(long, short = 'f')]
    /// Path to a file containing delimiter-separated subjects
    pub subjects_file: Option<PathBuf>,

    #[clap(long, env = "OPEN_AI_TOKEN", hide_env_values = true)]
    /// OpenAI API token. Env: OPEN_AI_TOKEN
    pub openai_token: Option<String>,

    #[clap(long, env = "SYSTEM_PROMPT", hide_env_values = true)]
    /// Override the built-in art director system prompt. Env: SYSTEM_PROMPT
    pub system_prompt: Option<String>,

    #[clap(long, env = "WEB_SEARCH_PROMPT", hide_env_values = true)]
    /// Override the built-in research instruction. Env: WEB_SEARCH_PROMPT
    pub web_search_prompt: Option<String>,

    #[clap(long, env = "SUBJECTS_DELIMITER")]
    /// Record separator for the subjects file, defaults to a newline.
    /// `\n`, `\t` and `\r` are unescaped. Env: SUBJECTS_DELIMITER
    pub subjects_delimiter: Option<String>,

    #[clap(long, default_value = DEFAULT_OUTPUT_DIR, env = "DNDIMG_OUTPUT_DIR")]
    /// Output directory, defaults to `output`.
    /// Env: DNDIMG_OUTPUT_DIR
    pub output_dir: PathBuf,

    #[clap(long, default_value = DEFAULT_TEXT_MODEL, env = "DNDIMG_TEXT_MODEL")]
    /// Chat model used to write the image description. Env: DNDIMG_TEXT_MODEL
    pub text_model: String,

    #[clap(long, default_value = DEFAULT_IMAGE_MODEL, env = "DNDIMG_IMAGE_MODEL")]
    /// Image model. Env: DNDIMG_IMAGE_MODEL
    pub image_model: String,

    #[clap(long, default_value = DEFAULT_OPENAI_BASE_URL, env = "OPENAI_BASE_URL")]
    /// OpenAI API base URL. Env: OPENAI_BASE_URL
    pub openai_base_url: String,

    #[clap(long, default_value_t = DEFAULT_RATE_LIMIT_SECONDS, env = "DNDIMG_RATE_LIMIT_SECONDS")]
    /// Seconds between subjects in batch mode, defaults to `20`.
    /// Env: DNDIMG_RATE_LIMIT_SECONDS
    pub rate_limit_seconds: u64,

    #[clap(long, help = "Enable debug logging", env = "DNDIMG_DEBUG")]
    /// Enable debug logging. Env: DNDIMG_DEBUG
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_only() {
        let cli = CliOptions::try_parse_from(["dndimg", "Owlbear"]).expect("parse");
        assert_eq!(cli.subject.as_deref(), Some("Owlbear"));
        assert!(cli.subjects_file.is_none());
        assert_eq!(cli.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn subjects_file_only() {
        let cli =
            CliOptions::try_parse_from(["dndimg", "-f", "monsters.txt"]).expect("parse");
        assert!(cli.subject.is_none());
        assert_eq!(cli.subjects_file, Some(PathBuf::from("monsters.txt")));
    }

    #[test]
    fn neither_is_a_usage_error() {
        assert!(CliOptions::try_parse_from(["dndimg"]).is_err());
    }

    #[test]
    fn both_is_a_usage_error() {
        assert!(CliOptions::try_parse_from(["dndimg", "Owlbear", "-f", "monsters.txt"]).is_err());
    }
}

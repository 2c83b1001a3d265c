//! Config handling

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::log::LevelFilter;

use crate::cli::CliOptions;
use crate::constants::{DEFAULT_SUBJECTS_DELIMITER, DEFAULT_SYSTEM_PROMPT, DEFAULT_WEB_SEARCH_PROMPT};
use crate::error::DndImgError;
use crate::limiter::NonZeroPeriod;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Loads `.env` from the current directory or one of its parents.
///
/// A missing file is fine; a file that exists but can't be read or parsed is not.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    ignore_missing(dotenvy::dotenv().map(|_| ()))
}

/// Loads a specific env file, with the same missing-file rule as [`load_dotenv`].
pub fn load_dotenv_from(path: &Path) -> Result<(), dotenvy::Error> {
    ignore_missing(dotenvy::from_path(path))
}

fn ignore_missing(result: Result<(), dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match result {
        Err(err) if err.not_found() => Ok(()),
        other => other,
    }
}

/// Runtime configuration, built once at startup and never changed.
#[derive(Clone)]
pub struct Config {
    /// OpenAI API token
    pub openai_token: String,
    /// System prompt for the description stage
    pub system_prompt: String,
    /// Research/style instruction sent with each subject
    pub web_search_prompt: String,
    /// Record separator for subjects files
    pub subjects_delimiter: String,
    /// Where PNGs are written
    pub output_dir: PathBuf,
    /// Chat model name
    pub text_model: String,
    /// Image model name
    pub image_model: String,
    /// OpenAI API base URL, without trailing slash
    pub openai_base_url: String,
    /// Spacing between batch subjects
    pub rate_limit: NonZeroPeriod,
}

impl Config {
    /// Validates the parsed command line and fills in defaults.
    ///
    /// A missing or blank token is a [`DndImgError::Config`]; the caller is expected to
    /// stop before doing any work.
    pub fn from_cli(cli: &CliOptions) -> Result<Self, DndImgError> {
        let openai_token = cli
            .openai_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                DndImgError::Config("OPEN_AI_TOKEN environment variable is required".to_string())
            })?
            .to_string();

        let rate_limit = NonZeroPeriod::new(Duration::from_secs(cli.rate_limit_seconds))
            .ok_or_else(|| {
                DndImgError::Config("rate limit interval must be at least one second".to_string())
            })?;

        let subjects_delimiter = non_empty(cli.subjects_delimiter.as_deref())
            .map(unescape_delimiter)
            .unwrap_or_else(|| DEFAULT_SUBJECTS_DELIMITER.to_string());

        Ok(Self {
            openai_token,
            system_prompt: non_empty(cli.system_prompt.as_deref())
                .unwrap_or(DEFAULT_SYSTEM_PROMPT)
                .to_string(),
            web_search_prompt: non_empty(cli.web_search_prompt.as_deref())
                .unwrap_or(DEFAULT_WEB_SEARCH_PROMPT)
                .to_string(),
            subjects_delimiter,
            output_dir: cli.output_dir.clone(),
            text_model: cli.text_model.clone(),
            image_model: cli.image_model.clone(),
            openai_base_url: cli.openai_base_url.trim_end_matches('/').to_string(),
            rate_limit,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openai_token", &"<redacted>")
            .field("subjects_delimiter", &self.subjects_delimiter)
            .field("output_dir", &self.output_dir)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("rate_limit", &self.rate_limit)
            .finish_non_exhaustive()
    }
}

// Empty env vars count as unset. Not trimmed: " " is a valid delimiter.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Turns literal `\n`, `\t` and `\r` escapes into the characters they name, so a
/// delimiter can be given on the command line or in `.env`.
pub fn unescape_delimiter(raw: &str) -> String {
    raw.replace("\\r", "\r")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}

//! Error handling

use std::fmt;
use std::path::PathBuf;

use crate::pipeline::Stage;

/// Errors raised anywhere in dndimg.
///
/// `Display` only describes this level; causes are reachable through `source()`, so
/// format with anyhow's `{:#}` to get the whole chain.
#[derive(Debug)]
pub enum DndImgError {
    /// Required configuration is missing or invalid
    Config(String),
    /// The command line didn't ask for anything we can do
    Usage(String),
    /// The subjects file couldn't be read
    FileRead {
        /// File we tried to read
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
    /// A remote generation call failed or returned something unusable
    Generation(anyhow::Error),
    /// The image payload was not valid base64 or not a valid PNG
    Decode(String),
    /// Writing output failed
    Io {
        /// Path being created or written
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
}

impl DndImgError {
    /// Fatal errors end the whole run; everything else only fails one subject.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Usage(_) | Self::FileRead { .. }
        )
    }
}

impl fmt::Display for DndImgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Usage(msg) => write!(f, "Usage error: {msg}"),
            Self::FileRead { path, .. } => {
                write!(f, "Failed to read subjects file {}", path.display())
            }
            Self::Generation(_) => f.write_str("Generation failed"),
            Self::Decode(msg) => write!(f, "Failed to decode image: {msg}"),
            Self::Io { path, .. } => write!(f, "Failed to write {}", path.display()),
        }
    }
}

impl std::error::Error for DndImgError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileRead { source, .. } | Self::Io { source, .. } => Some(source),
            Self::Generation(err) => Some(&**err),
            Self::Config(_) | Self::Usage(_) | Self::Decode(_) => None,
        }
    }
}

impl From<anyhow::Error> for DndImgError {
    fn from(err: anyhow::Error) -> Self {
        DndImgError::Generation(err)
    }
}

impl From<base64::DecodeError> for DndImgError {
    fn from(err: base64::DecodeError) -> Self {
        DndImgError::Decode(format!("invalid base64: {err}"))
    }
}

impl From<image::ImageError> for DndImgError {
    fn from(err: image::ImageError) -> Self {
        DndImgError::Decode(format!("invalid PNG: {err}"))
    }
}

/// A subject failed somewhere in the pipeline.
#[derive(Debug)]
pub struct PipelineError {
    /// Subject being processed
    pub subject: String,
    /// Stage that failed
    pub stage: Stage,
    /// What went wrong
    pub source: DndImgError,
}

impl PipelineError {
    pub(crate) fn new(subject: &str, stage: Stage, source: DndImgError) -> Self {
        Self {
            subject: subject.to_string(),
            stage,
            source,
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage failed for {}", self.stage, self.subject)
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_kinds() {
        assert!(DndImgError::Config("no token".to_string()).is_fatal());
        assert!(DndImgError::Usage("nothing to do".to_string()).is_fatal());
        assert!(
            DndImgError::FileRead {
                path: PathBuf::from("subjects.txt"),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }
            .is_fatal()
        );
        assert!(!DndImgError::Decode("bad".to_string()).is_fatal());
        assert!(!DndImgError::Generation(anyhow::anyhow!("quota")).is_fatal());
    }

    #[test]
    fn pipeline_error_names_subject_and_stage() {
        let err = PipelineError::new(
            "Owlbear",
            Stage::Image,
            DndImgError::Generation(anyhow::anyhow!("rate limited")),
        );
        assert_eq!(err.to_string(), "image stage failed for Owlbear");
    }

    #[test]
    fn full_chain_names_each_cause_once() {
        let cause = anyhow::anyhow!("Connection refused (os error 111)")
            .context("Request to /chat/completions failed")
            .context("failed to generate prompt");
        let err = PipelineError::new("Owlbear", Stage::Prompt, DndImgError::Generation(cause));

        let msg = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(
            msg,
            "prompt stage failed for Owlbear: Generation failed: failed to generate prompt: \
             Request to /chat/completions failed: Connection refused (os error 111)"
        );
        assert_eq!(msg.matches("Connection refused").count(), 1);
        assert_eq!(msg.matches("failed to generate prompt").count(), 1);
    }

    #[test]
    fn io_errors_keep_their_cause_out_of_display() {
        let err = DndImgError::Io {
            path: PathBuf::from("output/owlbear.png"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Failed to write output/owlbear.png");
        assert_eq!(
            format!("{:#}", anyhow::Error::from(err)),
            "Failed to write output/owlbear.png: denied"
        );
    }
}

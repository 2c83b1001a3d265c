//! Subject pipeline: prompt, image, save; one subject or a rate limited batch.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::cli::CliOptions;
use crate::config::Config;
use crate::error::{DndImgError, PipelineError};
use crate::image_gen::ImageGenerator;
use crate::limiter::{FixedIntervalLimiter, NonZeroPeriod};
use crate::prompt::PromptGenerator;
use crate::subjects::{read_subjects_file, slug};

/// Pipeline stage a subject is in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    /// Expanding the subject into a description
    Prompt,
    /// Rendering the description
    Image,
    /// Writing the PNG to disk
    Save,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Prompt => "prompt",
            Stage::Image => "image",
            Stage::Save => "save",
        };
        f.write_str(name)
    }
}

/// Outcome of a batch run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BatchSummary {
    /// Subjects that made it all the way to disk
    pub succeeded: usize,
    /// Subjects attempted
    pub total: usize,
}

impl BatchSummary {
    /// Subjects that failed at some stage.
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}

/// Runs subjects through the generators in strict sequence.
pub struct BatchRunner<'a> {
    prompts: &'a dyn PromptGenerator,
    images: &'a dyn ImageGenerator,
    output_dir: PathBuf,
    interval: NonZeroPeriod,
}

impl<'a> BatchRunner<'a> {
    /// Creates a runner writing into `output_dir`, spacing batch subjects by `interval`.
    pub fn new(
        prompts: &'a dyn PromptGenerator,
        images: &'a dyn ImageGenerator,
        output_dir: &Path,
        interval: NonZeroPeriod,
    ) -> Self {
        Self {
            prompts,
            images,
            output_dir: output_dir.to_path_buf(),
            interval,
        }
    }

    /// Generates and saves the image for one subject, returning the written path.
    pub async fn process_one(&self, subject: &str) -> Result<PathBuf, PipelineError> {
        info!("Generating detailed description for {subject}");
        let prompt = self
            .prompts
            .generate(subject)
            .await
            .map_err(|err| PipelineError::new(subject, Stage::Prompt, err))?;

        info!("Creating image for {subject}");
        let payload = self
            .images
            .generate(&prompt)
            .await
            .map_err(|err| PipelineError::new(subject, Stage::Image, err))?;

        info!("Saving image for {subject}");
        let filename = format!("{}.png", slug(subject));
        self.images
            .save(&payload, &self.output_dir, &filename)
            .map_err(|err| PipelineError::new(subject, Stage::Save, err))
    }

    /// Processes every subject in order, waiting for the rate limiter before each one.
    ///
    /// Failures are logged and skipped; they never stop the batch.
    pub async fn process_all(&self, subjects: &[String]) -> BatchSummary {
        let mut summary = BatchSummary {
            succeeded: 0,
            total: subjects.len(),
        };
        info!("Starting batch processing, total_subjects={}", summary.total);

        let mut limiter = FixedIntervalLimiter::new(self.interval);
        for subject in subjects {
            limiter.acquire().await;

            if let Err(err) = self.process_one(subject).await {
                let err = anyhow::Error::from(err);
                error!("Failed to process subject {subject}: {err:#}");
                continue;
            }

            summary.succeeded += 1;
            info!(
                "Progress: completed={} total={}",
                summary.succeeded, summary.total
            );
        }

        info!(
            "Batch processing complete: successful={} total={} failed={}",
            summary.succeeded,
            summary.total,
            summary.failed()
        );
        summary
    }
}

/// Runs whatever the command line asked for.
///
/// Errors are fatal to the process: bad usage, an unreadable subjects file, or a
/// failed subject in single mode. Subjects failing inside a batch only show up in the
/// logs and the returned summary.
pub async fn run(
    cli: &CliOptions,
    config: &Config,
    prompts: &dyn PromptGenerator,
    images: &dyn ImageGenerator,
) -> anyhow::Result<BatchSummary> {
    let runner = BatchRunner::new(prompts, images, &config.output_dir, config.rate_limit);

    if let Some(subject) = cli.subject.as_deref().map(str::trim) {
        if subject.is_empty() {
            return Err(DndImgError::Usage("subject must not be empty".to_string()).into());
        }
        runner.process_one(subject).await?;
        return Ok(BatchSummary {
            succeeded: 1,
            total: 1,
        });
    }

    let Some(path) = cli.subjects_file.as_deref() else {
        return Err(DndImgError::Usage(
            "either a subject or subjects file must be provided".to_string(),
        )
        .into());
    };

    let subjects = read_subjects_file(path, &config.subjects_delimiter)?;
    if subjects.is_empty() {
        return Err(DndImgError::Usage(format!("no subjects found in {}", path.display())).into());
    }

    Ok(runner.process_all(&subjects).await)
}

//! Image stage: render a description and save it as PNG.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose;
use image::ImageFormat;
use tracing::info;

use crate::config::Config;
use crate::error::DndImgError;
use crate::openai::OpenAiClient;

/// Something that can turn a description into a base64-encoded PNG.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Renders one square image for `prompt`, returned as base64 text.
    async fn generate(&self, prompt: &str) -> Result<String, DndImgError>;

    /// Decodes `payload` and writes it to `<output_dir>/<filename>`.
    fn save(&self, payload: &str, output_dir: &Path, filename: &str) -> Result<PathBuf, DndImgError> {
        save_png(payload, output_dir, filename)
    }
}

/// Decodes a base64 PNG, checks it really is a PNG and re-encodes it to
/// `<output_dir>/<filename>`, replacing any existing file. Returns the written path.
pub fn save_png(payload: &str, output_dir: &Path, filename: &str) -> Result<PathBuf, DndImgError> {
    let bytes = general_purpose::STANDARD.decode(payload.trim())?;
    let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?;

    std::fs::create_dir_all(output_dir).map_err(|source| DndImgError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_dir.join(filename);
    img.save_with_format(&path, ImageFormat::Png)
        .map_err(|err| match err {
            image::ImageError::IoError(source) => DndImgError::Io {
                path: path.clone(),
                source,
            },
            other => DndImgError::Io {
                path: path.clone(),
                source: std::io::Error::other(other),
            },
        })?;

    info!("Image saved: {}", path.display());
    Ok(path)
}

/// [`ImageGenerator`] backed by the OpenAI images API.
#[derive(Clone, Debug)]
pub struct OpenAiImageGenerator {
    client: OpenAiClient,
    model: String,
}

impl OpenAiImageGenerator {
    /// Builds a generator from the shared client and config.
    pub fn new(client: OpenAiClient, config: &Config) -> Self {
        Self {
            client,
            model: config.image_model.clone(),
        }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, DndImgError> {
        self.client
            .generate_image(&self.model, prompt)
            .await
            .map_err(|err| DndImgError::Generation(err.context("failed to create image")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use std::io::Cursor;

    fn png_b64(width: u32, height: u32) -> String {
        let img = ImageBuffer::from_pixel(width, height, Rgba([200u8, 30, 30, 255]));
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).expect("encode");
        general_purpose::STANDARD.encode(bytes.into_inner())
    }

    #[test]
    fn saves_into_created_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("output");
        let path = save_png(&png_b64(8, 8), &out, "owlbear.png").expect("save");
        assert_eq!(path, out.join("owlbear.png"));
        let img = image::open(&path).expect("reopen");
        assert_eq!((img.width(), img.height()), (8, 8));
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        save_png(&png_b64(4, 4), dir.path(), "mimic.png").expect("first");
        let path = save_png(&png_b64(6, 3), dir.path(), "mimic.png").expect("second");
        let img = image::open(&path).expect("reopen");
        assert_eq!((img.width(), img.height()), (6, 3));
    }

    #[test]
    fn bad_base64_is_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = save_png("not base64!!", dir.path(), "x.png").expect_err("bad");
        assert!(matches!(err, DndImgError::Decode(msg) if msg.contains("base64")));
        assert!(!dir.path().join("x.png").exists());
    }

    #[test]
    fn non_png_is_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let payload = general_purpose::STANDARD.encode(b"definitely not a png");
        let err = save_png(&payload, dir.path(), "x.png").expect_err("bad");
        assert!(matches!(err, DndImgError::Decode(msg) if msg.contains("PNG")));
    }

    #[test]
    fn unwritable_output_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("output");
        std::fs::write(&blocker, b"a file, not a dir").expect("write");
        let err = save_png(&png_b64(2, 2), &blocker, "x.png").expect_err("io");
        assert!(matches!(err, DndImgError::Io { .. }));
    }
}

//! Text recognition for uploaded images.
//!
//! [`OcrEngine`] turns image bytes into raw recognized text. Splitting that text into lines and
//! picking the longest one is workflow logic and lives in [`crate::workflow`].

use anyhow::{Context as _, anyhow, bail};
use async_trait::async_trait;
use std::{process::Output, time::Duration};
use tokio::process::Command;
use tracing::instrument;

use crate::config::OcrConfig;

/// OCR engine interface.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize the text in `image`.
    ///
    /// `name` is the image's storage key. It is only a hint for the file format.
    async fn recognize(&self, image: &[u8], name: &str) -> anyhow::Result<String>;
}

/// OCR engine wrapping the `tesseract` CLI tool.
#[derive(Debug, Clone)]
pub struct TesseractOcrEngine {
    command: String,
    language: String,
    timeout: Duration,
}

impl TesseractOcrEngine {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            command: config.command.clone(),
            language: config.language.clone(),
            timeout: config.timeout,
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcrEngine {
    #[instrument(level = "debug", skip(self, image), fields(size = image.len()), err)]
    async fn recognize(&self, image: &[u8], name: &str) -> anyhow::Result<String> {
        // Tesseract sniffs the format itself, the extension only helps with odd formats
        let extension = mime_guess::from_path(name)
            .first()
            .and_then(|mime| mime_guess::get_mime_extensions(&mime).and_then(|exts| exts.first().copied()))
            .unwrap_or("img");

        let tmpdir = tempfile::TempDir::with_prefix("idiomcard-ocr")?;
        let input_path = tmpdir.path().join(format!("input.{extension}"));
        tokio::fs::write(&input_path, image)
            .await
            .context("cannot write tesseract input file")?;

        let run = Command::new(&self.command)
            .arg(&input_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| anyhow!("{} timed out after {:?}", self.command, self.timeout))?
            .with_context(|| format!("cannot run {}", self.command))?;
        check_for_command_failure(&self.command, &output)?;

        String::from_utf8(output.stdout).context("tesseract output is not UTF-8")
    }
}

/// Turn a non-zero exit status into an error carrying the tool's stderr.
fn check_for_command_failure(command: &str, output: &Output) -> anyhow::Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        bail!("{command} failed with {}", output.status)
    }
    bail!("{command} failed with {}: {stderr}", output.status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(command: &str) -> TesseractOcrEngine {
        TesseractOcrEngine::new(&OcrConfig {
            command: command.to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let err = engine("idiomcard-no-such-ocr-binary")
            .recognize(b"not an image", "x.png")
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("cannot run idiomcard-no-such-ocr-binary"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_command_reports_status() {
        // `false` ignores its arguments and exits non-zero
        let err = engine("false").recognize(b"not an image", "x.png").await.unwrap_err();

        assert!(err.to_string().starts_with("false failed with"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_is_returned() {
        // `echo` prints its arguments: the temp input path, then "stdout -l chi_tra"
        let text = engine("echo").recognize(b"bytes", "photo.jpg").await.unwrap();

        assert!(text.contains("idiomcard-ocr"));
        assert!(text.trim_end().ends_with("stdout -l chi_tra"));
    }
}

//! Text recognition through the `tesseract` command-line tool.
//!
//! Each image is written to a private scratch directory as PNG and handed to
//! `tesseract <image> stdout`. The scratch directory lives as long as the
//! recognizer and is removed when it is dropped.

use facesheet_core::TextRecognizer;
use image::GrayImage;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use thiserror::Error;

const SCRATCH_PREFIX: &str = "facesheet-ocr-";
const PAGE_FILE: &str = "page.png";

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("could not create OCR scratch directory: {0}")]
    Scratch(#[source] std::io::Error),
    #[error("could not write OCR input image: {0}")]
    WriteInput(#[from] image::ImageError),
    #[error("failed to run {program}: {source} (is tesseract installed?)")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Options passed through to the tesseract executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractOptions {
    /// Executable name or path.
    pub program: String,
    /// Language code(s), e.g. "eng" or "eng+deu". `None` lets tesseract choose.
    pub language: Option<String>,
    /// Page segmentation mode (`--psm`).
    pub page_segmentation: Option<u8>,
}

impl Default for TesseractOptions {
    fn default() -> Self {
        Self {
            program: "tesseract".to_string(),
            language: Some("eng".to_string()),
            page_segmentation: None,
        }
    }
}

/// OCR backed by an external tesseract process.
pub struct TesseractRecognizer {
    options: TesseractOptions,
    scratch: TempDir,
}

impl TesseractRecognizer {
    pub fn new(options: TesseractOptions) -> Result<Self, OcrError> {
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .map_err(OcrError::Scratch)?;
        tracing::debug!(
            program = %options.program,
            scratch = %scratch.path().display(),
            "tesseract recognizer ready"
        );
        Ok(Self { options, scratch })
    }

    /// Directory used for intermediate page images.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    fn command(&self, input: &Path) -> Command {
        let mut cmd = Command::new(&self.options.program);
        cmd.arg(input).arg("stdout");
        if let Some(lang) = &self.options.language {
            cmd.arg("-l").arg(lang);
        }
        if let Some(psm) = self.options.page_segmentation {
            cmd.arg("--psm").arg(psm.to_string());
        }
        cmd
    }

    fn page_path(&self) -> PathBuf {
        self.scratch.path().join(PAGE_FILE)
    }
}

impl TextRecognizer for TesseractRecognizer {
    type Error = OcrError;

    fn recognize_text(&self, image: &GrayImage) -> Result<String, OcrError> {
        let page = self.page_path();
        image.save(&page)?;

        let output = self
            .command(&page)
            .output()
            .map_err(|source| OcrError::Spawn {
                program: self.options.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                program: self.options.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

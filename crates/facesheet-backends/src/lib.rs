//! facesheet-backends — Concrete collaborators for the facesheet pipeline.
//!
//! Zip extraction, OCR through the tesseract executable, and SCRFD face
//! detection running on ONNX Runtime.

pub mod archive;
pub mod detector;
pub mod ocr;

pub use archive::{ArchiveError, ZipArchiveSource};
pub use detector::{DetectorError, DetectorOptions, ScrfdLocator};
pub use ocr::{OcrError, TesseractOptions, TesseractRecognizer};

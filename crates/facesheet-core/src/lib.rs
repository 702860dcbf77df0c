//! facesheet-core — Name search over image archives, rendered as a face contact sheet.
//!
//! Holds the record model, thumbnail cropping, the contact-sheet composer and
//! the pipeline that drives the archive, OCR and face-detection collaborators.

pub mod compose;
pub mod crop;
pub mod layout;
pub mod painter;
pub mod pipeline;
pub mod types;

pub use crop::crop_and_bounded_resize;
pub use layout::{LayoutConfig, LayoutError};
pub use painter::{FontError, FontPainter, LabelPainter};
pub use pipeline::{ArchiveSource, FaceLocator, PipelineError, TextRecognizer};
pub use types::{
    ArchiveEntry, BoundingBox, ImageRecord, RecognizedText, RecordMatch, SearchSummary, Thumbnail,
};

//! Manifest contract for the document-detection pipeline.
//!
//! The detection pipeline writes one `manifest.json` per processing run:
//! a list of pages, each with the detections found on it (label, confidence,
//! bounding box, optional crop path, optional OCR text). This crate owns the
//! serde model for that file, a tolerant reader (a broken manifest is treated
//! as absent, never as an error), and the flattening step that turns OCR
//! detections into a compact text block for grounding.

mod flatten;
mod model;

pub use flatten::{collect_manifest_text, detection_texts};
pub use model::{Detection, Manifest, ManifestPage, load_manifest};

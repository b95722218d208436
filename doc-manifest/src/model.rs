//! Serde model for the detection manifest plus a tolerant file reader.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A full document-processing run: the source file and its pages.
///
/// Every field is defaulted so that partial manifests written by older
/// pipeline versions still deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Original input file the run was produced from.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub pages: Vec<ManifestPage>,
}

/// One rasterized page with its detections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestPage {
    /// 1-based page number; absent in some legacy manifests.
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raster_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated_image: Option<String>,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// A single detected field on a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub label: String,
    /// Detector confidence in `0.0..=1.0`.
    #[serde(default)]
    pub conf: f32,
    /// Pixel box `[x1, y1, x2, y2]` on the rasterized page.
    #[serde(default)]
    pub bbox: Vec<i64>,
    /// Saved crop image for this detection, when crops were enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    /// OCR text for this detection. Absence means OCR was disabled or
    /// produced nothing; flattening must skip such detections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Reads a manifest file, treating every failure as "no manifest".
///
/// An unreadable path or malformed JSON is logged and mapped to `None`;
/// callers fall back to answering without manifest context.
pub fn load_manifest(path: impl AsRef<Path>) -> Option<Manifest> {
    let path = path.as_ref();
    let raw = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            warn!("manifest not readable at {:?}: {}", path, e);
            return None;
        }
    };
    match serde_json::from_str::<Manifest>(&raw) {
        Ok(m) => Some(m),
        Err(e) => {
            warn!("malformed manifest at {:?}: {}", path, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerates_missing_fields() {
        let m: Manifest = serde_json::from_str(r#"{"pages":[{"detections":[{}]}]}"#).unwrap();
        assert_eq!(m.pages.len(), 1);
        let d = &m.pages[0].detections[0];
        assert!(d.text.is_none());
        assert!(d.label.is_empty());
    }

    #[test]
    fn unreadable_and_malformed_are_absent() {
        assert!(load_manifest("/definitely/not/here/manifest.json").is_none());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_manifest(&path).is_none());
    }

    #[test]
    fn reads_detector_output_shape() {
        let raw = r#"{
            "file": "report.pdf",
            "pages": [{
                "page": 1,
                "raster_image": "/runs/page_01.png",
                "annotated_image": "/runs/page_01_annotated.png",
                "detections": [
                    {"label": "AMH", "conf": 0.91, "bbox": [10, 20, 120, 48],
                     "crop": "/runs/crop_AMH_001.png", "text": "2.34 ng/mL"}
                ]
            }]
        }"#;
        let m: Manifest = serde_json::from_str(raw).unwrap();
        assert_eq!(m.file.as_deref(), Some("report.pdf"));
        assert_eq!(m.pages[0].page, Some(1));
        assert_eq!(m.pages[0].detections[0].text.as_deref(), Some("2.34 ng/mL"));
    }
}

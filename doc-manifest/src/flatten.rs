//! Flattening of OCR detections into grounding text.

use crate::model::Manifest;

/// Flattens OCR detections into one compact block, page by page.
///
/// Each detection with text contributes a `"[page P] LABEL: text"` line, in
/// page order and detection order within a page. Detections without text are
/// skipped. Accumulation stops once the combined line length first exceeds
/// `cap`; the line that crosses the cap is kept.
pub fn collect_manifest_text(manifest: &Manifest, cap: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut acc = 0usize;

    for page in &manifest.pages {
        let pno = page
            .page
            .map(|p| p.to_string())
            .unwrap_or_else(|| "?".to_string());
        for det in &page.detections {
            let text = match det.text.as_deref().map(str::trim) {
                Some(t) if !t.is_empty() => t,
                _ => continue,
            };
            let label = if det.label.is_empty() {
                "FIELD"
            } else {
                det.label.as_str()
            };
            let line = format!("[page {pno}] {label}: {text}");
            acc += line.len();
            parts.push(line);
            if acc > cap {
                return parts.join("\n");
            }
        }
    }
    parts.join("\n")
}

/// Collects the raw OCR texts of all detections, in manifest order.
///
/// Used by ingestion to index each detection as its own vector record.
pub fn detection_texts(manifest: &Manifest) -> Vec<String> {
    let mut out = Vec::new();
    for page in &manifest.pages {
        for det in &page.detections {
            if let Some(t) = det.text.as_deref() {
                if !t.is_empty() {
                    out.push(t.to_string());
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Detection, ManifestPage};

    fn det(label: &str, text: Option<&str>) -> Detection {
        Detection {
            label: label.to_string(),
            conf: 0.9,
            bbox: vec![0, 0, 10, 10],
            crop: None,
            text: text.map(str::to_string),
        }
    }

    fn manifest(pages: Vec<(Option<u32>, Vec<Detection>)>) -> Manifest {
        Manifest {
            file: Some("report.pdf".into()),
            pages: pages
                .into_iter()
                .map(|(page, detections)| ManifestPage {
                    page,
                    raster_image: None,
                    annotated_image: None,
                    detections,
                })
                .collect(),
        }
    }

    #[test]
    fn lines_keep_page_and_detection_order() {
        let m = manifest(vec![
            (Some(1), vec![det("AMH", Some("2.34 ng/mL")), det("FSH", Some("7.1"))]),
            (Some(2), vec![det("LH", Some("5.2"))]),
        ]);
        assert_eq!(
            collect_manifest_text(&m, 8000),
            "[page 1] AMH: 2.34 ng/mL\n[page 1] FSH: 7.1\n[page 2] LH: 5.2"
        );
    }

    #[test]
    fn round_trips_through_json() {
        let m = manifest(vec![(Some(1), vec![det("AMH", Some("2.34 ng/mL"))])]);
        let flattened = collect_manifest_text(&m, 8000);

        let raw = serde_json::to_string(&m).unwrap();
        let back: Manifest = serde_json::from_str(&raw).unwrap();
        assert_eq!(collect_manifest_text(&back, 8000), flattened);
    }

    #[test]
    fn skips_missing_and_blank_text() {
        let m = manifest(vec![(
            Some(1),
            vec![det("AMH", None), det("FSH", Some("  ")), det("LH", Some("5.2"))],
        )]);
        assert_eq!(collect_manifest_text(&m, 8000), "[page 1] LH: 5.2");
    }

    #[test]
    fn unlabeled_detection_and_unknown_page() {
        let m = manifest(vec![(None, vec![det("", Some("free text"))])]);
        assert_eq!(collect_manifest_text(&m, 8000), "[page ?] FIELD: free text");
    }

    #[test]
    fn cap_keeps_the_crossing_line() {
        let m = manifest(vec![(
            Some(1),
            vec![det("A", Some("xxxxx")), det("B", Some("yyyyy")), det("C", Some("zzzzz"))],
        )]);
        // Each line is 17 chars; a cap of 20 is crossed by the second line,
        // which is still included, and the third is dropped.
        let out = collect_manifest_text(&m, 20);
        assert_eq!(out, "[page 1] A: xxxxx\n[page 1] B: yyyyy");
    }

    #[test]
    fn detection_texts_flatten_in_order() {
        let m = manifest(vec![
            (Some(1), vec![det("AMH", Some("a")), det("FSH", None)]),
            (Some(2), vec![det("LH", Some("b"))]),
        ]);
        assert_eq!(detection_texts(&m), vec!["a".to_string(), "b".to_string()]);
    }
}

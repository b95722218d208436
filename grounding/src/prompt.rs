//! Prompt builder: fixed system message, layered user turn, Sources footer.

use crate::cfg::GroundingConfig;
use crate::context::PrimarySource;

/// System instructions establishing role, precedence policy, and the
/// Sources line.
pub const SYSTEM_PROMPT: &str = "\
You are a clinical information assistant for a fertility clinic.

Ground your answers using this strict precedence:
1) Patient Pinecone (patient namespace) — use the 'text' field in metadata.
2) Clinic KB Pinecone (provided namespace) — use the 'text' field in metadata.
3) Patient manifest OCR (if provided).
If none contain what the user needs, provide careful general guidance and
say it may not reflect the patient's documents. Avoid diagnosis; be concise.
If any sources were used, add a short 'Sources' line naming the layers.
";

/// Builds the user turn: the question followed by whichever context block
/// the precedence decision selected, blocks separated by blank lines in
/// patient → clinic → manifest order.
pub fn build_user_prompt(question: &str, source: &PrimarySource, cfg: &GroundingConfig) -> String {
    let mut blocks: Vec<String> = vec![format!("Question:\n{question}")];

    match source {
        PrimarySource::Patient(texts) => {
            let capped = &texts[..texts.len().min(cfg.patient_text_cap)];
            blocks.push(format!("Patient Pinecone text:\n{}", capped.join("\n")));
        }
        PrimarySource::Clinic(texts) => {
            let capped = &texts[..texts.len().min(cfg.clinic_text_cap)];
            blocks.push(format!("Clinic KB text:\n{}", capped.join("\n")));
        }
        PrimarySource::Manifest(text) => {
            blocks.push(format!("Patient OCR (manifest):\n{text}"));
        }
        PrimarySource::General => {
            blocks.push(
                "No patient or clinic text was found. Provide careful general guidance."
                    .to_string(),
            );
        }
    }

    blocks.join("\n\n")
}

/// Appends the Sources footer naming the contributing layers, or the
/// general-guidance note when nothing grounded the answer.
pub fn append_sources_footer(answer: &str, used_layers: &[&str]) -> String {
    if used_layers.is_empty() {
        format!(
            "{answer}\n\n*Note: general guidance (no patient or clinic context was retrieved).*"
        )
    } else {
        format!("{answer}\n\n---\nSources: {}", used_layers.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{LAYER_CLINIC, PrimarySource};

    #[test]
    fn question_always_leads() {
        let cfg = GroundingConfig::default();
        let p = build_user_prompt("What now?", &PrimarySource::General, &cfg);
        assert!(p.starts_with("Question:\nWhat now?"));
        assert!(p.contains("Provide careful general guidance."));
    }

    #[test]
    fn clinic_block_is_labeled_and_capped() {
        let mut cfg = GroundingConfig::default();
        cfg.clinic_text_cap = 2;
        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let p = build_user_prompt("q", &PrimarySource::Clinic(texts), &cfg);
        assert!(p.contains("Clinic KB text:\na\nb"));
        assert!(!p.contains("\nc"));
    }

    #[test]
    fn footer_names_layers() {
        let out = append_sources_footer("Answer.", &[LAYER_CLINIC]);
        assert!(out.ends_with("---\nSources: Clinic KB"));
    }

    #[test]
    fn footer_marks_general_guidance() {
        let out = append_sources_footer("Answer.", &[]);
        assert!(out.contains("general guidance"));
        assert!(!out.contains("Sources:"));
    }
}

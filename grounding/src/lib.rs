//! Hybrid retrieval-and-grounding engine with a single public entry point.
//!
//! [`GroundingEngine::answer`] embeds the question once, queries the private
//! patient namespace and the shared clinic namespace, folds in manifest OCR
//! text, resolves a strict precedence chain (patient → clinic → manifest →
//! general fallback), composes one grounded prompt, calls the completion
//! backend at low temperature, and returns the answer together with a
//! diagnostics trace of which layer grounded it.
//!
//! The call never fails: embedding and completion errors become explicit
//! error-string answers with error-only diagnostics, and retrieval errors
//! degrade to empty result sets. Every external failure is converted at
//! this boundary; nothing escapes to the caller as a fault.

mod cfg;
mod context;
mod diagnostics;
mod llm;
mod prompt;

pub use cfg::GroundingConfig;
pub use context::{LAYER_CLINIC, LAYER_MANIFEST, LAYER_PATIENT};
pub use diagnostics::{Diagnostics, GroundingTrace};
pub use llm::{CompletionError, CompletionProvider};
pub use prompt::SYSTEM_PROMPT;

use std::sync::Arc;

use doc_manifest::{Manifest, collect_manifest_text};
use tracing::{debug, warn};
use vector_store::{EmbeddingsProvider, MetadataFilter, ScoredMatch, VectorStore};

use context::{PrimarySource, select_source, usable_texts};
use prompt::{append_sources_footer, build_user_prompt};

/// One grounded-answer request.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroundingRequest<'a> {
    /// Free-text question. Empty strings pass through unmodified.
    pub question: &'a str,
    /// Enables the private `patient:<id>` namespace when present.
    pub patient_id: Option<&'a str>,
    /// Latest processed manifest, used only when both vector tiers are empty.
    pub manifest: Option<&'a Manifest>,
    /// Shared namespace override; `None` selects the configured default.
    pub clinic_namespace: Option<&'a str>,
    /// Completion model override; `None` selects the configured default.
    pub model: Option<&'a str>,
}

/// Finished answer plus the trace of how it was grounded.
#[derive(Debug, Clone)]
pub struct GroundedAnswer {
    pub answer: String,
    pub diagnostics: Diagnostics,
}

/// Stateless engine; safe to share across concurrent requests.
pub struct GroundingEngine {
    store: Arc<VectorStore>,
    embedder: Arc<dyn EmbeddingsProvider>,
    completer: Arc<dyn CompletionProvider>,
    cfg: GroundingConfig,
}

impl GroundingEngine {
    pub fn new(
        store: Arc<VectorStore>,
        embedder: Arc<dyn EmbeddingsProvider>,
        completer: Arc<dyn CompletionProvider>,
        cfg: GroundingConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            completer,
            cfg,
        }
    }

    /// Answers a question against the precedence chain of knowledge layers.
    ///
    /// Always returns something displayable: a grounded answer, a clearly
    /// labeled general answer, or an error string when the embedding or
    /// completion backend is down.
    pub async fn answer(&self, req: GroundingRequest<'_>) -> GroundedAnswer {
        let clinic_ns = req.clinic_namespace.unwrap_or(&self.cfg.clinic_namespace);
        let model = req.model.unwrap_or(&self.cfg.chat_model);

        // Embed the question once; without a vector there is nothing to
        // retrieve, so this failure is fatal to the call.
        let query_vec = match self.embedder.embed(req.question).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "embedding failed; returning error answer");
                return GroundedAnswer {
                    answer: format!("Embedding error: {e}"),
                    diagnostics: Diagnostics::failure(e.to_string()),
                };
            }
        };

        // Private patient tier, unfiltered.
        let patient_ns = req.patient_id.map(|id| format!("patient:{id}"));
        let patient_matches = match &patient_ns {
            Some(ns) => self.search_or_empty(&query_vec, ns, None).await,
            None => Vec::new(),
        };

        // Shared clinic tier, always queried, PII-flagged records excluded.
        let pii_filter = MetadataFilter::equals("pii", false);
        let clinic_matches = self
            .search_or_empty(&query_vec, clinic_ns, Some(&pii_filter))
            .await;

        let patient_texts = usable_texts(&patient_matches);
        let clinic_texts = usable_texts(&clinic_matches);
        let patient_hits = patient_texts.len();
        let clinic_hits = clinic_texts.len();

        let manifest_text = req
            .manifest
            .map(|m| collect_manifest_text(m, self.cfg.manifest_char_cap))
            .unwrap_or_default();

        let source = select_source(patient_texts, clinic_texts, manifest_text);
        debug!(
            patient_hits,
            clinic_hits,
            layers = ?source.used_layers(),
            "grounding source resolved"
        );

        let user_prompt = build_user_prompt(req.question, &source, &self.cfg);
        let raw = match self
            .completer
            .complete(SYSTEM_PROMPT, &user_prompt, model, self.cfg.temperature)
            .await
        {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "completion failed; returning error answer");
                return GroundedAnswer {
                    answer: format!("Chat completion error: {e}"),
                    diagnostics: Diagnostics::failure(e.to_string()),
                };
            }
        };

        let used_layers = source.used_layers();
        let answer = append_sources_footer(&raw, &used_layers);

        let diagnostics = Diagnostics::Trace(GroundingTrace {
            question: req.question.to_string(),
            patient_ns,
            patient_hits,
            clinic_ns: clinic_ns.to_string(),
            clinic_hits,
            used_layers: used_layers.iter().map(|s| s.to_string()).collect(),
            used_manifest: matches!(source, PrimarySource::Manifest(_)),
            fallback_general: matches!(source, PrimarySource::General),
        });

        GroundedAnswer {
            answer,
            diagnostics,
        }
    }

    /// Retrieval wrapper: failures degrade to zero matches, logged not raised.
    async fn search_or_empty(
        &self,
        vector: &[f32],
        namespace: &str,
        filter: Option<&MetadataFilter>,
    ) -> Vec<ScoredMatch> {
        match self
            .store
            .search(vector, self.cfg.top_k, namespace, filter)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(namespace, error = %e, "retrieval failed; treating as empty");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_manifest::{Detection, ManifestPage};
    use serde_json::{Map, json};
    use std::sync::Mutex;
    use std::{future::Future, pin::Pin};
    use vector_store::{StoredRecord, VectorConfig, VectorError};

    /// Deterministic embedder: every text maps to the same unit vector, so
    /// any stored record with values [1, 0] scores 1.0.
    struct FixedEmbedder;

    impl EmbeddingsProvider for FixedEmbedder {
        fn embed<'a>(
            &'a self,
            _text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, VectorError>> + Send + 'a>> {
            Box::pin(async { Ok(vec![1.0, 0.0]) })
        }
    }

    struct FailingEmbedder;

    impl EmbeddingsProvider for FailingEmbedder {
        fn embed<'a>(
            &'a self,
            _text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, VectorError>> + Send + 'a>> {
            Box::pin(async { Err(VectorError::Embedding("401 bad key".into())) })
        }
    }

    /// Echo completer: returns the user prompt and records every call, so
    /// tests can assert on selected context and idempotence.
    #[derive(Default)]
    struct EchoCompleter {
        calls: Mutex<Vec<String>>,
    }

    impl CompletionProvider for EchoCompleter {
        fn complete<'a>(
            &'a self,
            _system: &'a str,
            user: &'a str,
            _model: &'a str,
            _temperature: f32,
        ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>> {
            Box::pin(async move {
                self.calls.lock().unwrap().push(user.to_string());
                Ok(user.to_string())
            })
        }
    }

    struct FailingCompleter;

    impl CompletionProvider for FailingCompleter {
        fn complete<'a>(
            &'a self,
            _system: &'a str,
            _user: &'a str,
            _model: &'a str,
            _temperature: f32,
        ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>> {
            Box::pin(async { Err(CompletionError("503 overloaded".into())) })
        }
    }

    fn record(id: &str, text: &str, pii: bool) -> StoredRecord {
        let mut metadata = Map::new();
        metadata.insert("text".into(), json!(text));
        metadata.insert("pii".into(), json!(pii));
        StoredRecord {
            id: id.into(),
            values: vec![1.0, 0.0],
            metadata,
        }
    }

    fn manifest_with(text: &str) -> Manifest {
        Manifest {
            file: Some("report.pdf".into()),
            pages: vec![ManifestPage {
                page: Some(1),
                raster_image: None,
                annotated_image: None,
                detections: vec![Detection {
                    label: "AMH".into(),
                    conf: 0.9,
                    bbox: vec![0, 0, 1, 1],
                    crop: None,
                    text: Some(text.into()),
                }],
            }],
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        store: Arc<VectorStore>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store =
                Arc::new(VectorStore::new(VectorConfig::local(dir.path())).unwrap());
            Self { _dir: dir, store }
        }

        async fn seed(&self, namespace: &str, records: &[StoredRecord]) {
            self.store.upsert(namespace, records).await.unwrap();
        }

        fn engine(&self) -> (GroundingEngine, Arc<EchoCompleter>) {
            let completer = Arc::new(EchoCompleter::default());
            let engine = GroundingEngine::new(
                self.store.clone(),
                Arc::new(FixedEmbedder),
                completer.clone(),
                GroundingConfig::default(),
            );
            (engine, completer)
        }
    }

    fn trace(out: &GroundedAnswer) -> &GroundingTrace {
        out.diagnostics.trace().expect("expected grounded trace")
    }

    #[tokio::test]
    async fn patient_layer_suppresses_clinic_and_manifest() {
        let fx = Fixture::new();
        fx.seed("patient:p01", &[record("p", "AMH was 2.34 ng/mL", true)]).await;
        fx.seed("patient_education", &[record("k", "Clinic hours are 8-16.", false)]).await;

        let (engine, _) = fx.engine();
        let manifest = manifest_with("day 5: 4BB");
        let out = engine
            .answer(GroundingRequest {
                question: "what were my results?",
                patient_id: Some("p01"),
                manifest: Some(&manifest),
                ..Default::default()
            })
            .await;

        let t = trace(&out);
        assert_eq!(t.used_layers, vec![LAYER_PATIENT.to_string()]);
        assert_eq!(t.patient_hits, 1);
        assert_eq!(t.clinic_hits, 1); // consulted, but never mixed in
        assert!(!t.used_manifest);
        assert!(!t.fallback_general);
        assert!(out.answer.contains("Sources: Patient Pinecone"));
        assert!(out.answer.contains("AMH was 2.34 ng/mL"));
        assert!(!out.answer.contains("Clinic hours"));
    }

    #[tokio::test]
    async fn clinic_layer_used_only_without_patient_texts() {
        let fx = Fixture::new();
        fx.seed("patient_education", &[record("k", "Cancellations require 48h notice.", false)])
            .await;

        let (engine, _) = fx.engine();
        let out = engine
            .answer(GroundingRequest {
                question: "What is the cancellation policy?",
                ..Default::default()
            })
            .await;

        let t = trace(&out);
        assert_eq!(t.used_layers, vec![LAYER_CLINIC.to_string()]);
        assert_eq!(t.patient_hits, 0);
        assert_eq!(t.clinic_hits, 1);
        assert!(!t.used_manifest);
        assert!(out.answer.contains("Cancellations require 48h notice."));
        assert!(out.answer.contains("Sources: Clinic KB"));
    }

    #[tokio::test]
    async fn manifest_grounds_when_both_vector_tiers_are_empty() {
        let fx = Fixture::new();
        let (engine, _) = fx.engine();
        let manifest = manifest_with("2.34 ng/mL");
        let out = engine
            .answer(GroundingRequest {
                question: "what does my report say?",
                patient_id: Some("p01"),
                manifest: Some(&manifest),
                ..Default::default()
            })
            .await;

        let t = trace(&out);
        assert_eq!(t.used_layers, vec![LAYER_MANIFEST.to_string()]);
        assert!(t.used_manifest);
        assert!(!t.fallback_general);
        assert!(out.answer.contains("[page 1] AMH: 2.34 ng/mL"));
        assert!(out.answer.contains("Sources: Manifest OCR"));
    }

    #[tokio::test]
    async fn general_fallback_when_nothing_grounds() {
        let fx = Fixture::new();
        let (engine, _) = fx.engine();
        let out = engine
            .answer(GroundingRequest {
                question: "anything at all?",
                ..Default::default()
            })
            .await;

        let t = trace(&out);
        assert!(t.used_layers.is_empty());
        assert!(t.fallback_general);
        assert!(!t.used_manifest);
        assert!(out.answer.contains("general guidance"));
        assert!(!out.answer.contains("Sources:"));
    }

    #[tokio::test]
    async fn pii_flagged_clinic_records_are_excluded() {
        let fx = Fixture::new();
        fx.seed("patient_education", &[record("leak", "patient Jane's results", true)])
            .await;

        let (engine, _) = fx.engine();
        let out = engine
            .answer(GroundingRequest {
                question: "tell me about results",
                ..Default::default()
            })
            .await;

        let t = trace(&out);
        assert_eq!(t.clinic_hits, 0);
        assert!(t.fallback_general);
        assert!(!out.answer.contains("Jane"));
    }

    #[tokio::test]
    async fn match_without_usable_text_is_dropped_not_blank() {
        let fx = Fixture::new();
        let mut metadata = Map::new();
        metadata.insert("pii".into(), json!(false));
        metadata.insert("irrelevant".into(), json!(42));
        fx.seed(
            "patient_education",
            &[StoredRecord {
                id: "noise".into(),
                values: vec![1.0, 0.0],
                metadata,
            }],
        )
        .await;

        let (engine, completer) = fx.engine();
        let out = engine
            .answer(GroundingRequest {
                question: "q",
                ..Default::default()
            })
            .await;

        assert!(trace(&out).fallback_general);
        let calls = completer.calls.lock().unwrap();
        // no blank line was smuggled into a context block
        assert!(!calls[0].contains("Clinic KB text:"));
    }

    #[tokio::test]
    async fn grounding_selection_is_idempotent() {
        let fx = Fixture::new();
        fx.seed("patient_education", &[record("k", "Policy text.", false)]).await;

        let (engine, completer) = fx.engine();
        let req = GroundingRequest {
            question: "policy?",
            ..Default::default()
        };
        let first = engine.answer(req).await;
        let second = engine.answer(req).await;

        assert_eq!(trace(&first).used_layers, trace(&second).used_layers);
        let calls = completer.calls.lock().unwrap();
        assert_eq!(calls[0], calls[1], "selected context must not vary between calls");
    }

    #[tokio::test]
    async fn example_scenario_cancellation_policy() {
        let fx = Fixture::new();
        fx.seed("patient_education", &[record("k", "Cancellations require 48h notice.", false)])
            .await;

        let (engine, _) = fx.engine();
        let out = engine
            .answer(GroundingRequest {
                question: "What is the cancellation policy?",
                patient_id: None,
                ..Default::default()
            })
            .await;

        let t = trace(&out);
        assert_eq!(t.clinic_hits, 1);
        assert_eq!(t.patient_hits, 0);
        assert!(!t.used_manifest);
        assert!(out.answer.contains("Cancellations require 48h notice."));
        assert!(out.answer.ends_with("Sources: Clinic KB"));
    }

    #[tokio::test]
    async fn embedding_failure_is_fatal_with_error_diagnostics() {
        let fx = Fixture::new();
        let engine = GroundingEngine::new(
            fx.store.clone(),
            Arc::new(FailingEmbedder),
            Arc::new(EchoCompleter::default()),
            GroundingConfig::default(),
        );
        let out = engine
            .answer(GroundingRequest {
                question: "q",
                ..Default::default()
            })
            .await;

        assert!(out.answer.starts_with("Embedding error:"));
        assert!(matches!(out.diagnostics, Diagnostics::Failure { .. }));
    }

    #[tokio::test]
    async fn completion_failure_is_reported_not_raised() {
        let fx = Fixture::new();
        fx.seed("patient_education", &[record("k", "Policy.", false)]).await;
        let engine = GroundingEngine::new(
            fx.store.clone(),
            Arc::new(FixedEmbedder),
            Arc::new(FailingCompleter),
            GroundingConfig::default(),
        );
        let out = engine
            .answer(GroundingRequest {
                question: "q",
                ..Default::default()
            })
            .await;

        assert!(out.answer.starts_with("Chat completion error:"));
        assert_eq!(
            out.diagnostics,
            Diagnostics::failure("503 overloaded")
        );
    }

    #[tokio::test]
    async fn empty_question_passes_through() {
        let fx = Fixture::new();
        let (engine, completer) = fx.engine();
        let out = engine.answer(GroundingRequest::default()).await;
        assert!(trace(&out).fallback_general);
        let calls = completer.calls.lock().unwrap();
        assert!(calls[0].starts_with("Question:\n\n"));
    }
}

//! Lightweight health checks for the OpenAI backend.
//!
//! Probes `GET {endpoint}/v1/models` with Bearer auth and best-effort checks
//! that the configured model is listed. The returned [`HealthStatus`] is
//! JSON-serializable and suitable for a `/health` endpoint.
//! [`HealthService::check`] is resilient and never fails (errors mapped to
//! `ok=false`); [`HealthService::try_openai`] returns a strict `Result`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::error_handler::{ConfigError, LlmError, Result, make_snippet};

/// A serializable health snapshot for a single model config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model identifier relevant to the probe.
    pub model: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds for the probe.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

/// A health checker that reuses a single HTTP client across probes.
pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds).
    ///
    /// # Errors
    /// Returns [`LlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        debug!(
            default_timeout_secs = timeout.as_secs(),
            "HealthService initialized"
        );
        Ok(Self { client })
    }

    /// Resilient probe: maps every failure into an `ok=false` snapshot.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let started = Instant::now();
        match self.try_openai(cfg).await {
            Ok(message) => HealthStatus {
                endpoint: cfg.endpoint.clone(),
                model: cfg.model.clone(),
                ok: true,
                latency_ms: started.elapsed().as_millis(),
                message,
            },
            Err(e) => {
                warn!(endpoint = %cfg.endpoint, model = %cfg.model, error = %e, "health probe failed");
                HealthStatus {
                    endpoint: cfg.endpoint.clone(),
                    model: cfg.model.clone(),
                    ok: false,
                    latency_ms: started.elapsed().as_millis(),
                    message: e.to_string(),
                }
            }
        }
    }

    /// Probes each distinct config once, preserving order.
    pub async fn check_many(&self, cfgs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        let mut out = Vec::with_capacity(cfgs.len());
        for cfg in cfgs {
            out.push(self.check(cfg).await);
        }
        out
    }

    /// Strict probe against `GET {endpoint}/v1/models`.
    ///
    /// # Errors
    /// - [`ConfigError::MissingApiKey`] when no key is configured
    /// - [`LlmError::HttpStatus`] for non-2xx responses
    /// - [`LlmError::Decode`] when the model list cannot be parsed
    pub async fn try_openai(&self, cfg: &LlmModelConfig) -> Result<String> {
        let key = cfg.api_key.as_deref().ok_or(ConfigError::MissingApiKey)?;
        let url = format!("{}/v1/models", cfg.endpoint.trim_end_matches('/'));

        let resp = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {key}"))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmError::HttpStatus {
                status,
                url,
                snippet: make_snippet(&text),
            });
        }

        let list: ModelList = resp
            .json()
            .await
            .map_err(|e| LlmError::Decode(format!("model list: {e}")))?;

        let found = list.data.iter().any(|m| m.id == cfg.model);
        let message = if found {
            format!("model '{}' available", cfg.model)
        } else {
            // Not all deployments enumerate every model; reachability is the
            // main signal here.
            format!("endpoint reachable; model '{}' not listed", cfg.model)
        };
        info!(endpoint = %cfg.endpoint, model = %cfg.model, "health probe ok");
        Ok(message)
    }
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

//! Thin adapter around the remote index's REST API.
//!
//! Concentrates all remote interactions behind a minimal facade so the rest
//! of the application stays decoupled from the wire format. The index speaks
//! the Pinecone data-plane protocol: `POST /query` and
//! `POST /vectors/upsert` against the index host, authenticated with an
//! `Api-Key` header.

use std::time::Duration;

use reqwest::header;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::VectorConfig;
use crate::errors::VectorError;
use crate::filters::to_index_filter;
use crate::record::{MetadataFilter, ScoredMatch, StoredRecord};

/// A facade over the remote Pinecone-protocol index client.
pub struct PineconeFacade {
    http: reqwest::Client,
    host: String,
}

impl PineconeFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// # Errors
    /// Returns [`VectorError::Config`] when no API key is configured, or
    /// when the HTTP client cannot be built.
    pub fn new(cfg: &VectorConfig) -> Result<Self, VectorError> {
        cfg.validate()?;
        let api_key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| VectorError::Config("api_key is required for remote mode".into()))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "Api-Key",
            header::HeaderValue::from_str(api_key)
                .map_err(|e| VectorError::Config(format!("invalid api key header: {e}")))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            host: cfg.index_host.trim_end_matches('/').to_string(),
        })
    }

    /// Similarity search in one namespace.
    ///
    /// Returns matches pre-sorted by descending score, as delivered by the
    /// index; this facade does not re-sort.
    ///
    /// # Errors
    /// Returns [`VectorError::Api`] on non-2xx responses and
    /// [`VectorError::Http`] on transport failures.
    pub async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredMatch>, VectorError> {
        let url = format!("{}/query", self.host);
        let body = QueryRequest {
            vector,
            top_k,
            namespace,
            include_metadata: true,
            filter: filter.map(to_index_filter),
        };

        debug!(namespace, top_k, "POST {url}");
        let resp = self.http.post(&url).json(&body).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let snippet = snippet_of(resp.text().await.unwrap_or_default());
            return Err(VectorError::Api {
                status,
                url,
                snippet,
            });
        }

        let out: QueryResponse = resp.json().await?;
        debug!(namespace, hits = out.matches.len(), "query completed");
        Ok(out
            .matches
            .into_iter()
            .map(|m| ScoredMatch {
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }

    /// Upserts a batch of records into one namespace.
    ///
    /// # Errors
    /// Returns [`VectorError::Api`] on non-2xx responses and
    /// [`VectorError::Http`] on transport failures.
    pub async fn upsert(
        &self,
        namespace: &str,
        records: &[StoredRecord],
    ) -> Result<usize, VectorError> {
        if records.is_empty() {
            debug!("no records provided for upsert");
            return Ok(0);
        }
        let url = format!("{}/vectors/upsert", self.host);
        let body = UpsertRequest {
            vectors: records,
            namespace,
        };

        info!(namespace, count = records.len(), "POST {url}");
        let resp = self.http.post(&url).json(&body).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let snippet = snippet_of(resp.text().await.unwrap_or_default());
            return Err(VectorError::Api {
                status,
                url,
                snippet,
            });
        }

        let out: UpsertResponse = resp.json().await?;
        Ok(out.upserted_count)
    }
}

fn snippet_of(body: String) -> String {
    let mut s: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if s.len() > 200 {
        let mut end = 200;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
    s
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    namespace: &'a str,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<MatchRow>,
}

#[derive(Deserialize)]
struct MatchRow {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: serde_json::Map<String, Value>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [StoredRecord],
    namespace: &'a str,
}

#[derive(Deserialize)]
struct UpsertResponse {
    #[serde(rename = "upsertedCount", default)]
    upserted_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_request_shape() {
        let f = MetadataFilter::equals("pii", false);
        let req = QueryRequest {
            vector: &[0.1, 0.2],
            top_k: 8,
            namespace: "patient_education",
            include_metadata: true,
            filter: Some(to_index_filter(&f)),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["topK"], 8);
        assert_eq!(v["includeMetadata"], true);
        assert_eq!(v["filter"], json!({ "pii": { "$eq": false } }));
    }

    #[test]
    fn facade_requires_key() {
        let cfg = VectorConfig::local("x");
        assert!(PineconeFacade::new(&cfg).is_err());
    }
}

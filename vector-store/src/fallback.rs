//! Local brute-force fallback over per-namespace JSONL files.
//!
//! When no index credentials are configured (or a remote call fails), search
//! runs cosine similarity over every record in
//! `<stub_dir>/<namespace>.jsonl`, sorts descending, and slices top-K — the
//! same signature and ordering guarantee as the remote path, degraded recall
//! and scale only. This is what makes the grounding contract testable
//! without live services.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::errors::VectorError;
use crate::filters::matches_metadata;
use crate::record::{MetadataFilter, ScoredMatch, StoredRecord};

/// Flat-file namespace index.
pub struct LocalIndex {
    dir: PathBuf,
}

impl LocalIndex {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the JSONL file backing one namespace.
    pub fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{namespace}.jsonl"))
    }

    /// Brute-force cosine search in one namespace.
    ///
    /// A missing namespace file means zero matches. Malformed lines are
    /// logged and skipped. Equality filters are applied before ranking so
    /// the fallback honors the same exclusions as the remote index.
    pub fn search(
        &self,
        namespace: &str,
        query: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Vec<ScoredMatch> {
        let records = self.read_namespace(namespace);
        let mut scored: Vec<ScoredMatch> = records
            .into_iter()
            .filter(|r| filter.is_none_or(|f| matches_metadata(f, &r.metadata)))
            .map(|r| ScoredMatch {
                score: cosine(query, &r.values),
                metadata: r.metadata,
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        debug!(namespace, hits = scored.len(), "local search completed");
        scored
    }

    /// Appends records to a namespace file, creating it (and the directory)
    /// as needed.
    ///
    /// # Errors
    /// Returns [`VectorError::Io`] / [`VectorError::Parse`] on write or
    /// serialization failures.
    pub fn append(
        &self,
        namespace: &str,
        records: &[StoredRecord],
    ) -> Result<usize, VectorError> {
        if records.is_empty() {
            return Ok(0);
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.namespace_path(namespace);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        for r in records {
            let line = serde_json::to_string(r)?;
            writeln!(file, "{line}")?;
        }
        debug!(namespace, count = records.len(), "appended to {:?}", path);
        Ok(records.len())
    }

    /// Tolerant JSONL reader: empty lines skipped, malformed lines logged.
    fn read_namespace(&self, namespace: &str) -> Vec<StoredRecord> {
        let path = self.namespace_path(namespace);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };
        let reader = BufReader::new(file);

        let mut out = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!("read error in {:?} at line {}: {}", path, i + 1, e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<StoredRecord>(&line) {
                Ok(r) => out.push(r),
                Err(e) => warn!("skipping malformed record on line {}: {}", i + 1, e),
            }
        }
        out
    }
}

/// Cosine similarity; zero-norm inputs score 0.0.
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

//! Word-window chunking for document ingestion.

/// Default window size, in words.
pub const CHUNK_MAX_WORDS: usize = 800;
/// Default overlap between consecutive windows, in words.
pub const CHUNK_OVERLAP_WORDS: usize = 120;

/// Splits text into overlapping word windows.
///
/// Windows advance by `max_words - overlap` (minimum step 1), so every word
/// appears in at least one chunk and boundary sentences appear in two.
/// Whitespace-only input yields no chunks.
pub fn split_words(text: &str, max_words: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    let step = max_words.saturating_sub(overlap).max(1);

    let mut out = Vec::new();
    let mut i = 0;
    while i < words.len() {
        let end = (i + max_words).min(words.len());
        out.push(words[i..end].join(" "));
        i += step;
    }
    out
}

//! Sentence-boundary text chunker.
//!
//! Splits normalized content into [`ContentChunk`]s no longer than a
//! configurable `max_chunk_size` (in characters). Splitting happens only
//! between sentences; a single sentence longer than the limit becomes its
//! own oversized chunk rather than being cut mid-sentence.
//!
//! Each chunk is addressed by the SHA-256 of its text, which serves as
//! both the deduplication key in the store and the citation identifier.
//!
//! # Algorithm
//!
//! 1. Normalize the content (see [`normalize_text`]).
//! 2. Split into sentences on `.`, `!` or `?` followed by whitespace. The
//!    terminator and the whitespace are consumed; empty pieces are dropped.
//! 3. Accumulate sentences into a buffer joined by `". "`.
//! 4. When the buffer is non-empty and `buffer + ". " + sentence` would
//!    exceed `max_chunk_size`, seal the buffer and start over with that
//!    sentence.
//! 5. Seal whatever remains.
//!
//! The size bound counts the `". "` separator, so a multi-sentence chunk
//! is never longer than `max_chunk_size`.
//!
//! Empty or whitespace-only content yields no chunks.
//!
//! # Example
//!
//! ```rust
//! use repo_agent_core::chunk::create_chunks;
//!
//! let chunks = create_chunks("Sentence one. Sentence two. Sentence three.", Some("test.txt"), 20);
//! assert_eq!(chunks.len(), 3);
//! assert_eq!(chunks[0].content, "Sentence one");
//! assert_eq!(chunks[2].content, "Sentence three.");
//! ```

use sha2::{Digest, Sha256};

use crate::models::ContentChunk;
use crate::normalize::normalize_text;

/// Default upper bound on chunk length, in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1000;

/// Separator re-inserted between sentences that share a chunk.
const SENTENCE_JOIN: &str = ". ";

/// SHA-256 of the exact bytes of `text`, as 64 lowercase hex characters.
///
/// No normalization happens here; callers hash text that has already
/// been through the chunker.
pub fn hash_content(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Split `content` into sentence-aligned chunks of at most
/// `max_chunk_size` characters (oversized single sentences excepted).
///
/// Every returned chunk carries `file_path`. Output is deterministic:
/// identical input yields identical chunks and digests, in order.
pub fn create_chunks(
    content: &str,
    file_path: Option<&str>,
    max_chunk_size: usize,
) -> Vec<ContentChunk> {
    let normalized = normalize_text(content);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for sentence in split_sentences(&normalized) {
        let sentence_chars = sentence.chars().count();
        let would_be = if current.is_empty() {
            sentence_chars
        } else {
            current_chars + SENTENCE_JOIN.len() + sentence_chars
        };

        if would_be > max_chunk_size && !current.is_empty() {
            chunks.push(make_chunk(&current, file_path));
            current.clear();
            current.push_str(sentence);
            current_chars = sentence_chars;
        } else {
            if !current.is_empty() {
                current.push_str(SENTENCE_JOIN);
                current_chars += SENTENCE_JOIN.len();
            }
            current.push_str(sentence);
            current_chars += sentence_chars;
        }
    }

    if !current.is_empty() {
        chunks.push(make_chunk(&current, file_path));
    }

    chunks
}

/// Split on a sentence terminator followed by at least one whitespace
/// character. The final sentence keeps its terminator, since nothing
/// follows it.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let Some(&(_, next)) = chars.peek() else {
            break;
        };
        if !next.is_whitespace() {
            continue;
        }

        sentences.push(&text[start..i]);

        let mut resume = text.len();
        while let Some(&(j, ws)) = chars.peek() {
            if ws.is_whitespace() {
                chars.next();
            } else {
                resume = j;
                break;
            }
        }
        start = resume;
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences.retain(|s| !s.is_empty());
    sentences
}

fn make_chunk(text: &str, file_path: Option<&str>) -> ContentChunk {
    ContentChunk {
        content: text.to_string(),
        file_path: file_path.map(str::to_string),
        content_hash: hash_content(text),
    }
}

//! Keyword retrieval over a repository's indexed chunks.
//!
//! # Scoring
//!
//! The query is lower-cased and split on whitespace; tokens shorter than
//! [`MIN_KEYWORD_CHARS`] are dropped and duplicates removed. A chunk's
//! score is the number of distinct keywords that occur anywhere in its
//! lower-cased text, as substrings. Repeated occurrences do not add up.
//!
//! # Ranking
//!
//! Chunks scoring zero are discarded, the rest are stably sorted by
//! descending score (ties keep store order) and truncated to `limit`.
//!
//! # Recency fallback
//!
//! Two situations fall back to the `limit` most recently created chunks:
//! a query with no usable keywords, and a query whose keywords match no
//! chunk at all. Both honor `published_only`.

use anyhow::Result;
use tracing::debug;

use crate::models::{ContextChunk, StoredChunk};
use crate::store::Store;

/// Default number of chunks returned to a provider.
pub const DEFAULT_RETRIEVAL_LIMIT: usize = 5;

/// Tokens with fewer characters than this are ignored.
pub const MIN_KEYWORD_CHARS: usize = 3;

/// Lower-cased, de-duplicated keywords of at least [`MIN_KEYWORD_CHARS`]
/// characters, in first-seen order.
pub fn extract_keywords(query: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in query.to_lowercase().split_whitespace() {
        if token.chars().count() < MIN_KEYWORD_CHARS {
            continue;
        }
        if !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
        }
    }
    keywords
}

/// Number of `keywords` contained in `text`, case-insensitively.
///
/// `keywords` are expected to be lower-case already (see [`extract_keywords`]).
pub fn score_text(text: &str, keywords: &[String]) -> usize {
    let lower = text.to_lowercase();
    keywords.iter().filter(|k| lower.contains(k.as_str())).count()
}

/// Score, filter and rank `chunks`, keeping at most `limit`.
///
/// Returns `(chunk, score)` pairs; every score is positive.
pub fn rank_chunks(
    chunks: Vec<StoredChunk>,
    keywords: &[String],
    limit: usize,
) -> Vec<(StoredChunk, usize)> {
    let mut scored: Vec<(StoredChunk, usize)> = chunks
        .into_iter()
        .filter_map(|chunk| {
            let score = score_text(&chunk.content, keywords);
            (score > 0).then_some((chunk, score))
        })
        .collect();

    // sort_by is stable, so equal scores keep store order
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(limit);
    scored
}

/// Retrieve up to `limit` context chunks for `query` from `repo_id`.
///
/// Never returns more than `limit` chunks, and never returns an
/// unpublished chunk when `published_only` is set. Store errors are
/// propagated unchanged.
pub async fn retrieve_context(
    store: &dyn Store,
    repo_id: &str,
    query: &str,
    limit: usize,
    published_only: bool,
) -> Result<Vec<ContextChunk>> {
    let keywords = extract_keywords(query);

    if keywords.is_empty() {
        debug!(repo_id, "no usable keywords, using recent chunks");
        return recent_context(store, repo_id, limit, published_only).await;
    }

    let candidates = store.list_chunks(repo_id, published_only).await?;
    let candidate_count = candidates.len();
    let ranked = rank_chunks(candidates, &keywords, limit);

    if ranked.is_empty() {
        debug!(
            repo_id,
            keywords = keywords.len(),
            candidates = candidate_count,
            "no keyword matches, using recent chunks"
        );
        return recent_context(store, repo_id, limit, published_only).await;
    }

    debug!(
        repo_id,
        keywords = keywords.len(),
        candidates = candidate_count,
        returned = ranked.len(),
        top_score = ranked[0].1,
        "keyword retrieval"
    );

    Ok(ranked
        .into_iter()
        .map(|(chunk, _)| chunk.to_context())
        .collect())
}

async fn recent_context(
    store: &dyn Store,
    repo_id: &str,
    limit: usize,
    published_only: bool,
) -> Result<Vec<ContextChunk>> {
    let recent = store.recent_chunks(repo_id, published_only, limit).await?;
    Ok(recent.iter().map(StoredChunk::to_context).collect())
}

//! Indexing pipeline: content → normalize → chunk → store.
//!
//! Runs whenever content is published. Re-indexing the same text is
//! idempotent: chunks are keyed by `(repo_id, content_hash)`, so identical
//! sentences collapse onto the existing record and only its path,
//! published flag and `updated_at` change.

use anyhow::Result;
use tracing::debug;

use crate::chunk::create_chunks;
use crate::store::Store;

/// Outcome of one indexing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexReport {
    /// Chunks produced and upserted (duplicates within the call included).
    pub chunks: usize,
}

/// Chunk `content` and upsert every chunk into `repo_id`.
///
/// The first storage failure aborts the call and is returned unchanged;
/// chunks upserted before it stay in place.
pub async fn index_repo_content(
    store: &dyn Store,
    repo_id: &str,
    content: &str,
    file_path: Option<&str>,
    is_published: bool,
    max_chunk_size: usize,
) -> Result<IndexReport> {
    let chunks = create_chunks(content, file_path, max_chunk_size);

    for chunk in &chunks {
        store.upsert_chunk(repo_id, chunk, is_published).await?;
    }

    debug!(
        repo_id,
        chunks = chunks.len(),
        is_published,
        "indexed content"
    );

    Ok(IndexReport {
        chunks: chunks.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::DEFAULT_MAX_CHUNK_SIZE;
    use crate::store::memory::InMemoryStore;

    const DOC: &str = "Intro to the project. How to build it. How to contribute! Any questions?";

    #[tokio::test]
    async fn test_reindex_is_idempotent() {
        let store = InMemoryStore::new();
        let first = index_repo_content(&store, "r1", DOC, Some("README.md"), true, 25)
            .await
            .unwrap();
        let count = store.count_chunks("r1").await.unwrap();
        assert_eq!(count, first.chunks);

        index_repo_content(&store, "r1", DOC, Some("README.md"), true, 25)
            .await
            .unwrap();
        assert_eq!(store.count_chunks("r1").await.unwrap(), count);
    }

    #[tokio::test]
    async fn test_reindex_flips_published_flag() {
        let store = InMemoryStore::new();
        index_repo_content(&store, "r1", DOC, None, false, DEFAULT_MAX_CHUNK_SIZE)
            .await
            .unwrap();
        assert!(store.list_chunks("r1", true).await.unwrap().is_empty());

        index_repo_content(&store, "r1", DOC, None, true, DEFAULT_MAX_CHUNK_SIZE)
            .await
            .unwrap();
        assert_eq!(store.list_chunks("r1", true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_whitespace_variants_dedupe() {
        let store = InMemoryStore::new();
        index_repo_content(&store, "r1", "Same  text.\n\nAgain.", None, true, 1000)
            .await
            .unwrap();
        index_repo_content(&store, "r1", "  Same text. Again. ", None, true, 1000)
            .await
            .unwrap();
        assert_eq!(store.count_chunks("r1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_content_indexes_nothing() {
        let store = InMemoryStore::new();
        let report = index_repo_content(&store, "r1", "   ", None, true, 1000)
            .await
            .unwrap();
        assert_eq!(report.chunks, 0);
        assert_eq!(store.count_chunks("r1").await.unwrap(), 0);
    }
}

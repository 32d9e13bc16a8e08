//! Indexing entry points: request → repo check → chunk → upsert.
//!
//! Wraps [`index_repo_content`] with repo resolution and the configured
//! chunk size. Used by `POST /repos/{repo_id}/index` and `repo-agent index`.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use repo_agent_core::error::IndexError;
use repo_agent_core::index::{index_repo_content, IndexReport};
use repo_agent_core::store::Store;

use crate::config::Config;
use crate::validate::ValidationError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRequest {
    pub content: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

impl IndexRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.content.is_empty() {
            return Err(ValidationError::new("content", "must not be empty"));
        }
        Ok(())
    }
}

/// Index `request.content` into `repo_id`.
pub async fn index_content(
    store: &dyn Store,
    config: &Config,
    repo_id: &str,
    request: &IndexRequest,
) -> Result<IndexReport, IndexError> {
    let repo = store
        .get_repo(repo_id)
        .await?
        .ok_or_else(|| IndexError::RepoNotFound(repo_id.to_string()))?;

    let report = index_repo_content(
        store,
        &repo.id,
        &request.content,
        request.file_path.as_deref(),
        request.is_published,
        config.chunking.max_chunk_size,
    )
    .await?;

    info!(
        repo_id = %repo.id,
        file_path = request.file_path.as_deref().unwrap_or("-"),
        chunks = report.chunks,
        is_published = request.is_published,
        "content indexed"
    );

    Ok(report)
}

/// CLI entry point: index a file (or stdin when `source` is `-`).
///
/// `file_path` overrides the path recorded on the chunks; by default the
/// source path is used.
pub async fn run_index(
    store: &dyn Store,
    config: &Config,
    repo_id: &str,
    source: &Path,
    file_path: Option<String>,
    draft: bool,
) -> Result<()> {
    let from_stdin = source.as_os_str() == "-";
    let content = if from_stdin {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read content from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read {}", source.display()))?
    };

    let recorded_path = match file_path {
        Some(p) => Some(p),
        None if from_stdin => None,
        None => Some(source.display().to_string()),
    };

    let request = IndexRequest {
        content,
        file_path: recorded_path,
        is_published: !draft,
    };
    request.validate()?;

    let report = index_content(store, config, repo_id, &request).await?;
    let total = store.count_chunks(repo_id).await?;

    println!("index {}", repo_id);
    println!("  chunks written: {}", report.chunks);
    println!("  chunks in repo: {}", total);
    println!("  published: {}", request.is_published);
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_agent_core::models::{AgentConfig, NewRepo};
    use repo_agent_core::store::memory::InMemoryStore;

    #[test]
    fn test_request_defaults_to_published() {
        let req: IndexRequest = serde_json::from_str(r#"{"content": "Hello."}"#).unwrap();
        assert!(req.is_published);
        assert!(req.file_path.is_none());

        let req: IndexRequest = serde_json::from_str(
            r#"{"content": "Hello.", "filePath": "a.md", "isPublished": false}"#,
        )
        .unwrap();
        assert!(!req.is_published);
        assert_eq!(req.file_path.as_deref(), Some("a.md"));
    }

    #[test]
    fn test_empty_content_rejected() {
        let req = IndexRequest {
            content: String::new(),
            file_path: None,
            is_published: true,
        };
        assert!(req.validate().is_err());
    }

    #[tokio::test]
    async fn test_unknown_repo() {
        let store = InMemoryStore::new();
        let req = IndexRequest {
            content: "Text.".to_string(),
            file_path: None,
            is_published: true,
        };
        let err = index_content(&store, &Config::minimal(), "missing", &req)
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::RepoNotFound(_)));
    }

    #[tokio::test]
    async fn test_uses_configured_chunk_size() {
        let store = InMemoryStore::new();
        let repo = store
            .create_repo(&NewRepo {
                owner_handle: "o".to_string(),
                name: "r".to_string(),
                description: String::new(),
                is_public: true,
                agent: AgentConfig::default(),
            })
            .await
            .unwrap();

        let mut cfg = Config::minimal();
        cfg.chunking.max_chunk_size = 20;
        let req = IndexRequest {
            content: "Sentence one. Sentence two. Sentence three.".to_string(),
            file_path: Some("test.txt".to_string()),
            is_published: true,
        };
        let report = index_content(&store, &cfg, &repo.id, &req).await.unwrap();
        assert_eq!(report.chunks, 3);
        assert_eq!(store.count_chunks(&repo.id).await.unwrap(), 3);
    }
}

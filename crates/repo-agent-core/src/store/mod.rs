//! Storage port for Repo Agent.
//!
//! The [`Store`] trait is the only way the core reaches persistence.
//! Backends: [`memory::InMemoryStore`] here, and the SQLite store in the
//! `repo-agent` application crate.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//!
//! # Contract
//!
//! - [`upsert_chunk`](Store::upsert_chunk) is keyed by `(repo_id, content_hash)`.
//!   Repeated or concurrent calls with the same key converge to one record;
//!   text, path and published flag are last-write-wins and `updated_at` is
//!   refreshed.
//! - [`append_message`](Store::append_message) is an atomic ordered append:
//!   [`list_messages`](Store::list_messages) returns messages in the order
//!   their appends completed.
//! - [`recent_chunks`](Store::recent_chunks) orders newest first by creation
//!   time, breaking ties by most recent insertion.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    AgentConfig, ContentChunk, Message, NewMessage, NewRepo, Repo, StoredChunk, Thread,
};

#[async_trait]
pub trait Store: Send + Sync {
    /// Create a repository and return it with its generated ID.
    async fn create_repo(&self, repo: &NewRepo) -> Result<Repo>;

    async fn get_repo(&self, id: &str) -> Result<Option<Repo>>;

    /// All repositories, oldest first.
    async fn list_repos(&self) -> Result<Vec<Repo>>;

    /// Replace a repo's agent settings. Returns `false` if the repo is absent.
    async fn set_agent_config(&self, repo_id: &str, agent: &AgentConfig) -> Result<bool>;

    /// Look up a thread by ID, only if it belongs to `repo_id`.
    async fn find_thread(&self, repo_id: &str, thread_id: &str) -> Result<Option<Thread>>;

    async fn create_thread(&self, repo_id: &str, title: &str) -> Result<Thread>;

    async fn append_message(&self, msg: &NewMessage) -> Result<Message>;

    /// Messages of a thread in creation order.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>>;

    /// Insert or refresh a chunk keyed by `(repo_id, content_hash)`.
    async fn upsert_chunk(&self, repo_id: &str, chunk: &ContentChunk, is_published: bool)
        -> Result<()>;

    /// All chunks of a repo, optionally published only. Order is unspecified
    /// but stable for an unchanged store.
    async fn list_chunks(&self, repo_id: &str, published_only: bool) -> Result<Vec<StoredChunk>>;

    /// Up to `limit` chunks, newest first.
    async fn recent_chunks(
        &self,
        repo_id: &str,
        published_only: bool,
        limit: usize,
    ) -> Result<Vec<StoredChunk>>;

    async fn count_chunks(&self, repo_id: &str) -> Result<usize>;
}

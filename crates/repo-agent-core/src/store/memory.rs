//! In-memory [`Store`] implementation for tests and embedding.
//!
//! Uses `HashMap` and `Vec` behind `std::sync::RwLock`. Chunks keep an
//! insertion sequence so recency ordering is total even when several
//! chunks share a creation second.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    AgentConfig, ContentChunk, Message, NewMessage, NewRepo, Repo, StoredChunk, Thread,
};

use super::Store;

struct Entry {
    chunk: StoredChunk,
    seq: u64,
}

#[derive(Default)]
struct ChunkTable {
    /// Keyed by `(repo_id, content_hash)`.
    rows: HashMap<(String, String), Entry>,
    next_seq: u64,
}

/// In-memory store. Cheap to construct; all data is lost on drop.
#[derive(Default)]
pub struct InMemoryStore {
    repos: RwLock<Vec<Repo>>,
    threads: RwLock<Vec<Thread>>,
    messages: RwLock<Vec<Message>>,
    chunks: RwLock<ChunkTable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn sorted_newest_first(mut entries: Vec<&Entry>) -> Vec<&Entry> {
    entries.sort_by(|a, b| {
        b.chunk
            .created_at
            .cmp(&a.chunk.created_at)
            .then(b.seq.cmp(&a.seq))
    });
    entries
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_repo(&self, repo: &NewRepo) -> Result<Repo> {
        let created = Repo {
            id: Uuid::new_v4().to_string(),
            owner_handle: repo.owner_handle.clone(),
            name: repo.name.clone(),
            description: repo.description.clone(),
            is_public: repo.is_public,
            agent: repo.agent.clone(),
            created_at: now(),
        };
        write(&self.repos)?.push(created.clone());
        Ok(created)
    }

    async fn get_repo(&self, id: &str) -> Result<Option<Repo>> {
        Ok(read(&self.repos)?.iter().find(|r| r.id == id).cloned())
    }

    async fn list_repos(&self) -> Result<Vec<Repo>> {
        Ok(read(&self.repos)?.clone())
    }

    async fn set_agent_config(&self, repo_id: &str, agent: &AgentConfig) -> Result<bool> {
        let mut repos = write(&self.repos)?;
        match repos.iter_mut().find(|r| r.id == repo_id) {
            Some(repo) => {
                repo.agent = agent.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_thread(&self, repo_id: &str, thread_id: &str) -> Result<Option<Thread>> {
        Ok(read(&self.threads)?
            .iter()
            .find(|t| t.id == thread_id && t.repo_id == repo_id)
            .cloned())
    }

    async fn create_thread(&self, repo_id: &str, title: &str) -> Result<Thread> {
        let thread = Thread {
            id: Uuid::new_v4().to_string(),
            repo_id: repo_id.to_string(),
            title: title.to_string(),
            visibility: "public".to_string(),
            created_at: now(),
        };
        write(&self.threads)?.push(thread.clone());
        Ok(thread)
    }

    async fn append_message(&self, msg: &NewMessage) -> Result<Message> {
        let message = Message {
            id: Uuid::new_v4().to_string(),
            thread_id: msg.thread_id.clone(),
            repo_id: msg.repo_id.clone(),
            role: msg.role,
            content: msg.content.clone(),
            citations: msg.citations.clone(),
            created_at: now(),
        };
        write(&self.messages)?.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        Ok(read(&self.messages)?
            .iter()
            .filter(|m| m.thread_id == thread_id)
            .cloned()
            .collect())
    }

    async fn upsert_chunk(
        &self,
        repo_id: &str,
        chunk: &ContentChunk,
        is_published: bool,
    ) -> Result<()> {
        let mut table = write(&self.chunks)?;
        let ts = now();
        let key = (repo_id.to_string(), chunk.content_hash.clone());

        if let Some(entry) = table.rows.get_mut(&key) {
            entry.chunk.content = chunk.content.clone();
            entry.chunk.file_path = chunk.file_path.clone();
            entry.chunk.is_published = is_published;
            entry.chunk.updated_at = ts;
            return Ok(());
        }

        let seq = table.next_seq;
        table.next_seq += 1;
        table.rows.insert(
            key,
            Entry {
                chunk: StoredChunk {
                    id: Uuid::new_v4().to_string(),
                    repo_id: repo_id.to_string(),
                    content: chunk.content.clone(),
                    file_path: chunk.file_path.clone(),
                    content_hash: chunk.content_hash.clone(),
                    is_published,
                    created_at: ts,
                    updated_at: ts,
                },
                seq,
            },
        );
        Ok(())
    }

    async fn list_chunks(&self, repo_id: &str, published_only: bool) -> Result<Vec<StoredChunk>> {
        let table = read(&self.chunks)?;
        let mut entries: Vec<&Entry> = table
            .rows
            .values()
            .filter(|e| e.chunk.repo_id == repo_id && (!published_only || e.chunk.is_published))
            .collect();
        // HashMap order is arbitrary; insertion order keeps results stable.
        entries.sort_by_key(|e| e.seq);
        Ok(entries.into_iter().map(|e| e.chunk.clone()).collect())
    }

    async fn recent_chunks(
        &self,
        repo_id: &str,
        published_only: bool,
        limit: usize,
    ) -> Result<Vec<StoredChunk>> {
        let table = read(&self.chunks)?;
        let entries: Vec<&Entry> = table
            .rows
            .values()
            .filter(|e| e.chunk.repo_id == repo_id && (!published_only || e.chunk.is_published))
            .collect();
        Ok(sorted_newest_first(entries)
            .into_iter()
            .take(limit)
            .map(|e| e.chunk.clone())
            .collect())
    }

    async fn count_chunks(&self, repo_id: &str) -> Result<usize> {
        Ok(read(&self.chunks)?
            .rows
            .values()
            .filter(|e| e.chunk.repo_id == repo_id)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::create_chunks;
    use std::sync::Arc;
    use crate::models::Role;

    fn new_repo() -> NewRepo {
        NewRepo {
            owner_handle: "alice".to_string(),
            name: "notes".to_string(),
            description: "Alice's notes".to_string(),
            is_public: true,
            agent: AgentConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_upsert_deduplicates_by_hash() {
        let store = InMemoryStore::new();
        let chunks = create_chunks("One sentence here. Another sentence there.", None, 20);
        for _ in 0..3 {
            for c in &chunks {
                store.upsert_chunk("r1", c, true).await.unwrap();
            }
        }
        assert_eq!(store.count_chunks("r1").await.unwrap(), chunks.len());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_fields() {
        let store = InMemoryStore::new();
        let mut chunk = create_chunks("Draft text.", Some("a.md"), 1000).remove(0);
        store.upsert_chunk("r1", &chunk, false).await.unwrap();
        chunk.file_path = Some("b.md".to_string());
        store.upsert_chunk("r1", &chunk, true).await.unwrap();

        let all = store.list_chunks("r1", false).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_published);
        assert_eq!(all[0].file_path.as_deref(), Some("b.md"));
    }

    #[tokio::test]
    async fn test_same_hash_in_different_repos_is_distinct() {
        let store = InMemoryStore::new();
        let chunk = create_chunks("Shared text.", None, 1000).remove(0);
        store.upsert_chunk("r1", &chunk, true).await.unwrap();
        store.upsert_chunk("r2", &chunk, true).await.unwrap();
        assert_eq!(store.count_chunks("r1").await.unwrap(), 1);
        assert_eq!(store.count_chunks("r2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_published_filter() {
        let store = InMemoryStore::new();
        let published = create_chunks("Public words.", None, 1000).remove(0);
        let draft = create_chunks("Secret words.", None, 1000).remove(0);
        store.upsert_chunk("r1", &published, true).await.unwrap();
        store.upsert_chunk("r1", &draft, false).await.unwrap();

        assert_eq!(store.list_chunks("r1", true).await.unwrap().len(), 1);
        assert_eq!(store.list_chunks("r1", false).await.unwrap().len(), 2);
        let recent = store.recent_chunks("r1", true, 10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "Public words.");
    }

    #[tokio::test]
    async fn test_recent_chunks_newest_first_and_limited() {
        let store = InMemoryStore::new();
        for text in ["First.", "Second.", "Third."] {
            let c = create_chunks(text, None, 1000).remove(0);
            store.upsert_chunk("r1", &c, true).await.unwrap();
        }
        let recent = store.recent_chunks("r1", false, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "Third.");
        assert_eq!(recent[1].content, "Second.");
    }

    #[tokio::test]
    async fn test_thread_lookup_is_repo_scoped() {
        let store = InMemoryStore::new();
        let repo = store.create_repo(&new_repo()).await.unwrap();
        let thread = store.create_thread(&repo.id, "Chat").await.unwrap();

        assert!(store.find_thread(&repo.id, &thread.id).await.unwrap().is_some());
        assert!(store.find_thread("other", &thread.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_messages_keep_append_order() {
        let store = InMemoryStore::new();
        let repo = store.create_repo(&new_repo()).await.unwrap();
        let thread = store.create_thread(&repo.id, "Chat").await.unwrap();
        for (i, role) in [Role::User, Role::Assistant, Role::User].into_iter().enumerate() {
            store
                .append_message(&NewMessage {
                    repo_id: repo.id.clone(),
                    thread_id: thread.id.clone(),
                    role,
                    content: format!("m{}", i),
                    citations: vec![],
                })
                .await
                .unwrap();
        }
        let msgs = store.list_messages(&thread.id).await.unwrap();
        let contents: Vec<&str> = msgs.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m1", "m2"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_converge() {
        let store = Arc::new(InMemoryStore::new());
        let chunks = create_chunks(
            "First sentence here. Second sentence there. Third one closes.",
            Some("a.md"),
            25,
        );
        assert_eq!(chunks.len(), 3);

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            let chunks = chunks.clone();
            handles.push(tokio::spawn(async move {
                for c in &chunks {
                    store.upsert_chunk("r1", c, i % 2 == 0).await?;
                }
                anyhow::Ok(())
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.count_chunks("r1").await.unwrap(), chunks.len());
        let mut hashes: Vec<String> = store
            .list_chunks("r1", false)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content_hash)
            .collect();
        hashes.sort();
        hashes.dedup();
        assert_eq!(hashes.len(), chunks.len());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_keep_per_writer_order() {
        let store = Arc::new(InMemoryStore::new());
        let repo = store.create_repo(&new_repo()).await.unwrap();
        let thread = store.create_thread(&repo.id, "Chat").await.unwrap();

        let mut handles = Vec::new();
        for writer in 0..8 {
            let store = Arc::clone(&store);
            let repo_id = repo.id.clone();
            let thread_id = thread.id.clone();
            handles.push(tokio::spawn(async move {
                for n in 0..5 {
                    store
                        .append_message(&NewMessage {
                            repo_id: repo_id.clone(),
                            thread_id: thread_id.clone(),
                            role: Role::User,
                            content: format!("w{}-{}", writer, n),
                            citations: vec![],
                        })
                        .await?;
                }
                anyhow::Ok(())
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let msgs = store.list_messages(&thread.id).await.unwrap();
        assert_eq!(msgs.len(), 40);
        for writer in 0..8 {
            let prefix = format!("w{}-", writer);
            let seen: Vec<&str> = msgs
                .iter()
                .filter_map(|m| m.content.strip_prefix(prefix.as_str()))
                .collect();
            assert_eq!(seen, vec!["0", "1", "2", "3", "4"], "writer {}", writer);
        }
    }

    #[tokio::test]
    async fn test_set_agent_config() {
        let store = InMemoryStore::new();
        let repo = store.create_repo(&new_repo()).await.unwrap();
        let agent = AgentConfig {
            agent_enabled: false,
            ..AgentConfig::default()
        };
        assert!(store.set_agent_config(&repo.id, &agent).await.unwrap());
        assert!(!store.set_agent_config("missing", &agent).await.unwrap());
        let fetched = store.get_repo(&repo.id).await.unwrap().unwrap();
        assert!(!fetched.agent.agent_enabled);
    }
}

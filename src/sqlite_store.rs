//! SQLite-backed [`Store`] implementation.
//!
//! Chunk upserts rely on the `UNIQUE(repo_id, content_hash)` constraint
//! with `ON CONFLICT ... DO UPDATE`, so concurrent indexing of the same
//! text converges to a single row. Message order comes from the
//! autoincrement `seq` column, which SQLite assigns atomically on insert.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use repo_agent_core::models::{
    AgentConfig, AgentMode, ContentChunk, Message, NewMessage, NewRepo, Repo, Role, StoredChunk,
    Thread,
};
use repo_agent_core::store::Store;

const REPO_COLUMNS: &str = "id, owner_handle, name, description, is_public, agent_enabled, \
                            agent_mode, model_provider, system_prompt, created_at";

const CHUNK_COLUMNS: &str =
    "id, repo_id, content_hash, content, file_path, is_published, created_at, updated_at";

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn repo_from_row(row: &SqliteRow) -> Repo {
    let mode: String = row.get("agent_mode");
    Repo {
        id: row.get("id"),
        owner_handle: row.get("owner_handle"),
        name: row.get("name"),
        description: row.get("description"),
        is_public: row.get("is_public"),
        agent: AgentConfig {
            agent_enabled: row.get("agent_enabled"),
            agent_mode: AgentMode::parse(&mode),
            model_provider: row.get("model_provider"),
            system_prompt: row.get("system_prompt"),
        },
        created_at: row.get("created_at"),
    }
}

fn chunk_from_row(row: &SqliteRow) -> StoredChunk {
    StoredChunk {
        id: row.get("id"),
        repo_id: row.get("repo_id"),
        content: row.get("content"),
        file_path: row.get("file_path"),
        content_hash: row.get("content_hash"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn message_from_row(row: &SqliteRow) -> Result<Message> {
    let role: String = row.get("role");
    let citations_json: String = row.get("citations_json");
    let citations: Vec<String> = serde_json::from_str(&citations_json)
        .with_context(|| format!("corrupt citations on message {}", row.get::<String, _>("id")))?;

    Ok(Message {
        id: row.get("id"),
        thread_id: row.get("thread_id"),
        repo_id: row.get("repo_id"),
        role: Role::parse(&role)?,
        content: row.get("content"),
        citations,
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl Store for SqliteStore {
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

        sqlx::query(
            r#"
            INSERT INTO repos (id, owner_handle, name, description, is_public, agent_enabled,
                               agent_mode, model_provider, system_prompt, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&created.id)
        .bind(&created.owner_handle)
        .bind(&created.name)
        .bind(&created.description)
        .bind(created.is_public)
        .bind(created.agent.agent_enabled)
        .bind(created.agent.agent_mode.as_str())
        .bind(&created.agent.model_provider)
        .bind(&created.agent.system_prompt)
        .bind(created.created_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to create repo {}/{}", repo.owner_handle, repo.name))?;

        Ok(created)
    }

    async fn get_repo(&self, id: &str) -> Result<Option<Repo>> {
        let row = sqlx::query(&format!("SELECT {} FROM repos WHERE id = ?", REPO_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(repo_from_row))
    }

    async fn list_repos(&self) -> Result<Vec<Repo>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM repos ORDER BY created_at ASC, rowid ASC",
            REPO_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(repo_from_row).collect())
    }

    async fn set_agent_config(&self, repo_id: &str, agent: &AgentConfig) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE repos
            SET agent_enabled = ?, agent_mode = ?, model_provider = ?, system_prompt = ?
            WHERE id = ?
            "#,
        )
        .bind(agent.agent_enabled)
        .bind(agent.agent_mode.as_str())
        .bind(&agent.model_provider)
        .bind(&agent.system_prompt)
        .bind(repo_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_thread(&self, repo_id: &str, thread_id: &str) -> Result<Option<Thread>> {
        let row = sqlx::query(
            "SELECT id, repo_id, title, visibility, created_at FROM threads WHERE id = ? AND repo_id = ?",
        )
        .bind(thread_id)
        .bind(repo_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Thread {
            id: r.get("id"),
            repo_id: r.get("repo_id"),
            title: r.get("title"),
            visibility: r.get("visibility"),
            created_at: r.get("created_at"),
        }))
    }

    async fn create_thread(&self, repo_id: &str, title: &str) -> Result<Thread> {
        let thread = Thread {
            id: Uuid::new_v4().to_string(),
            repo_id: repo_id.to_string(),
            title: title.to_string(),
            visibility: "public".to_string(),
            created_at: now(),
        };

        sqlx::query(
            "INSERT INTO threads (id, repo_id, title, visibility, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&thread.id)
        .bind(&thread.repo_id)
        .bind(&thread.title)
        .bind(&thread.visibility)
        .bind(thread.created_at)
        .execute(&self.pool)
        .await?;

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
        let citations_json = serde_json::to_string(&message.citations)?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, thread_id, repo_id, role, content, citations_json, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&message.id)
        .bind(&message.thread_id)
        .bind(&message.repo_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(&citations_json)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(message)
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let rows = sqlx::query(
            r#"
            SELECT id, thread_id, repo_id, role, content, citations_json, created_at
            FROM messages
            WHERE thread_id = ?
            ORDER BY seq ASC
            "#,
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(message_from_row).collect()
    }

    async fn upsert_chunk(
        &self,
        repo_id: &str,
        chunk: &ContentChunk,
        is_published: bool,
    ) -> Result<()> {
        let ts = now();
        sqlx::query(
            r#"
            INSERT INTO content_chunks (id, repo_id, content_hash, content, file_path,
                                        is_published, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(repo_id, content_hash) DO UPDATE SET
                content = excluded.content,
                file_path = excluded.file_path,
                is_published = excluded.is_published,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(repo_id)
        .bind(&chunk.content_hash)
        .bind(&chunk.content)
        .bind(&chunk.file_path)
        .bind(is_published)
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_chunks(&self, repo_id: &str, published_only: bool) -> Result<Vec<StoredChunk>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM content_chunks
            WHERE repo_id = ? AND (? = 0 OR is_published = 1)
            ORDER BY seq ASC
            "#,
            CHUNK_COLUMNS
        ))
        .bind(repo_id)
        .bind(published_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(chunk_from_row).collect())
    }

    async fn recent_chunks(
        &self,
        repo_id: &str,
        published_only: bool,
        limit: usize,
    ) -> Result<Vec<StoredChunk>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM content_chunks
            WHERE repo_id = ? AND (? = 0 OR is_published = 1)
            ORDER BY created_at DESC, seq DESC
            LIMIT ?
            "#,
            CHUNK_COLUMNS
        ))
        .bind(repo_id)
        .bind(published_only)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(chunk_from_row).collect())
    }

    async fn count_chunks(&self, repo_id: &str) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM content_chunks WHERE repo_id = ?")
            .bind(repo_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}

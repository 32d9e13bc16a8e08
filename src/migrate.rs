//! Database schema migrations.
//!
//! Every statement is `CREATE ... IF NOT EXISTS`, so running migrations
//! repeatedly is safe.
//!
//! | Table | Key | Notes |
//! |-------|-----|-------|
//! | `repos` | `id` | agent settings are stored inline |
//! | `threads` | `id` | scoped to a repo |
//! | `messages` | `seq` (autoincrement) | `seq` defines conversation order |
//! | `content_chunks` | `seq`, unique `(repo_id, content_hash)` | the unique pair is the dedup key |

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS repos (
        id TEXT PRIMARY KEY,
        owner_handle TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        is_public INTEGER NOT NULL DEFAULT 1,
        agent_enabled INTEGER NOT NULL DEFAULT 1,
        agent_mode TEXT NOT NULL DEFAULT 'public',
        model_provider TEXT NOT NULL DEFAULT 'stub',
        system_prompt TEXT,
        created_at INTEGER NOT NULL,
        UNIQUE(owner_handle, name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS threads (
        id TEXT PRIMARY KEY,
        repo_id TEXT NOT NULL,
        title TEXT NOT NULL,
        visibility TEXT NOT NULL DEFAULT 'public',
        created_at INTEGER NOT NULL,
        FOREIGN KEY (repo_id) REFERENCES repos(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS messages (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        thread_id TEXT NOT NULL,
        repo_id TEXT NOT NULL,
        role TEXT NOT NULL,
        content TEXT NOT NULL,
        citations_json TEXT NOT NULL DEFAULT '[]',
        created_at INTEGER NOT NULL,
        FOREIGN KEY (thread_id) REFERENCES threads(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS content_chunks (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        repo_id TEXT NOT NULL,
        content_hash TEXT NOT NULL,
        content TEXT NOT NULL,
        file_path TEXT,
        is_published INTEGER NOT NULL DEFAULT 1,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        UNIQUE(repo_id, content_hash)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_threads_repo_id ON threads(repo_id)",
    "CREATE INDEX IF NOT EXISTS idx_messages_thread_id ON messages(thread_id, seq)",
    "CREATE INDEX IF NOT EXISTS idx_chunks_repo_published ON content_chunks(repo_id, is_published)",
    "CREATE INDEX IF NOT EXISTS idx_chunks_repo_created ON content_chunks(repo_id, created_at DESC)",
];

/// Connect to the configured database and apply the schema.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Apply the schema on an existing pool.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

//! # Repo Agent CLI (`repo-agent`)
//!
//! ## Usage
//!
//! ```bash
//! repo-agent --config ./config/repo-agent.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `repo-agent init` | Create the SQLite database and run schema migrations |
//! | `repo-agent repo add` | Register a repository |
//! | `repo-agent repo list` | List repositories and their agent settings |
//! | `repo-agent repo configure <id>` | Change a repository's agent settings |
//! | `repo-agent index <repo-id> <file>` | Chunk and store content (`-` reads stdin) |
//! | `repo-agent search <repo-id> "<query>"` | Preview retrieval for a query |
//! | `repo-agent chat <repo-id> "<message>"` | Run one chat turn |
//! | `repo-agent serve` | Start the HTTP server |
//!
//! Log output goes to stderr and is controlled by `RUST_LOG`
//! (default `info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use repo_agent::config::{self, Config};
use repo_agent::repos::{AddRepoOptions, AgentUpdate};
use repo_agent::sqlite_store::SqliteStore;
use repo_agent::{chat, db, ingest, migrate, repos, server};

/// Repo Agent: retrieval-augmented chat over repository content.
#[derive(Parser)]
#[command(name = "repo-agent", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/repo-agent.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Manage repositories.
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },

    /// Index content into a repository.
    ///
    /// The text is split into sentence-aligned chunks; chunks already
    /// present in the repo are updated in place.
    Index {
        repo_id: String,

        /// File to read, or `-` for stdin.
        source: PathBuf,

        /// Path recorded on the chunks (defaults to `source`).
        #[arg(long)]
        path: Option<String>,

        /// Store the chunks unpublished.
        #[arg(long)]
        draft: bool,
    },

    /// Show which chunks a query would retrieve.
    Search {
        repo_id: String,
        query: String,

        /// Maximum number of chunks (defaults to `[retrieval].limit`).
        #[arg(long)]
        limit: Option<usize>,

        /// Include unpublished chunks.
        #[arg(long)]
        include_drafts: bool,
    },

    /// Send one message to a repository's agent.
    Chat {
        repo_id: String,
        message: String,

        /// Continue an existing thread.
        #[arg(long)]
        thread: Option<String>,
    },

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[derive(Subcommand)]
enum RepoAction {
    /// Register a repository and print its id.
    Add {
        #[arg(long)]
        owner: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        description: Option<String>,

        /// Mark the repository private.
        #[arg(long)]
        private: bool,

        /// Agent mode: `public`, `private` or `draft-assistant`.
        #[arg(long)]
        mode: Option<String>,

        /// Provider key (defaults to `[agent].default_provider`).
        #[arg(long)]
        provider: Option<String>,

        #[arg(long)]
        system_prompt: Option<String>,

        /// Create the repository with its agent turned off.
        #[arg(long)]
        disabled: bool,
    },

    /// List repositories.
    List,

    /// Update agent settings for a repository.
    Configure {
        repo_id: String,

        #[arg(long, conflicts_with = "disable")]
        enable: bool,

        #[arg(long)]
        disable: bool,

        #[arg(long)]
        mode: Option<String>,

        #[arg(long)]
        provider: Option<String>,

        #[arg(long)]
        system_prompt: Option<String>,

        /// Remove the system prompt.
        #[arg(long, conflicts_with = "system_prompt")]
        clear_system_prompt: bool,
    },
}

async fn open_store(cfg: &Config) -> anyhow::Result<SqliteStore> {
    Ok(SqliteStore::new(db::connect(cfg).await?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Repo { action } => {
            let store = open_store(&cfg).await?;
            match action {
                RepoAction::Add {
                    owner,
                    name,
                    description,
                    private,
                    mode,
                    provider,
                    system_prompt,
                    disabled,
                } => {
                    let opts = AddRepoOptions {
                        owner,
                        name,
                        description,
                        private,
                        mode,
                        provider,
                        system_prompt,
                        disabled,
                    };
                    repos::run_add_repo(&store, &cfg, opts).await?;
                }
                RepoAction::List => {
                    repos::run_list_repos(&store).await?;
                }
                RepoAction::Configure {
                    repo_id,
                    enable,
                    disable,
                    mode,
                    provider,
                    system_prompt,
                    clear_system_prompt,
                } => {
                    let enabled = match (enable, disable) {
                        (true, _) => Some(true),
                        (_, true) => Some(false),
                        _ => None,
                    };
                    let update = AgentUpdate {
                        enabled,
                        mode,
                        provider,
                        system_prompt,
                        clear_system_prompt,
                    };
                    repos::run_configure_repo(&store, &repo_id, update).await?;
                }
            }
        }
        Commands::Index {
            repo_id,
            source,
            path,
            draft,
        } => {
            let store = open_store(&cfg).await?;
            ingest::run_index(&store, &cfg, &repo_id, &source, path, draft).await?;
        }
        Commands::Search {
            repo_id,
            query,
            limit,
            include_drafts,
        } => {
            let store = open_store(&cfg).await?;
            repos::run_search(&store, &cfg, &repo_id, &query, limit, include_drafts).await?;
        }
        Commands::Chat {
            repo_id,
            message,
            thread,
        } => {
            let store = open_store(&cfg).await?;
            chat::run_chat(&store, &cfg, &repo_id, &message, thread).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}


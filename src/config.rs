//! TOML configuration parsing and validation.
//!
//! ```toml
//! [db]
//! path = "./data/repo-agent.sqlite"
//!
//! [chunking]
//! max_chunk_size = 1000
//!
//! [retrieval]
//! limit = 5
//!
//! [agent]
//! default_provider = "stub"
//!
//! [server]
//! bind = "127.0.0.1:7341"
//! ```
//!
//! Only `[db]` and `[server]` are required; the other sections fall back
//! to their defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use repo_agent_core::chunk::DEFAULT_MAX_CHUNK_SIZE;
use repo_agent_core::retrieve::DEFAULT_RETRIEVAL_LIMIT;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub agent: AgentDefaults,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Upper bound on chunk length in characters.
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

fn default_max_chunk_size() -> usize {
    DEFAULT_MAX_CHUNK_SIZE
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Context chunks handed to the provider per chat turn.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RETRIEVAL_LIMIT,
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_RETRIEVAL_LIMIT
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentDefaults {
    /// Provider key recorded on repos created without an explicit one.
    #[serde(default = "default_provider")]
    pub default_provider: String,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
        }
    }
}

fn default_provider() -> String {
    "stub".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl Config {
    /// Built-in configuration used when no file is given.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/repo-agent.sqlite"),
            },
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            agent: AgentDefaults::default(),
            server: ServerConfig {
                bind: "127.0.0.1:7341".to_string(),
            },
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.max_chunk_size == 0 {
        anyhow::bail!("chunking.max_chunk_size must be > 0");
    }

    if config.retrieval.limit < 1 {
        anyhow::bail!("retrieval.limit must be >= 1");
    }

    if config.agent.default_provider.trim().is_empty() {
        anyhow::bail!("agent.default_provider must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_applied() {
        let file = write_config(
            r#"
[db]
path = "/tmp/agent.sqlite"

[server]
bind = "127.0.0.1:0"
"#,
        );
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.chunking.max_chunk_size, 1000);
        assert_eq!(cfg.retrieval.limit, 5);
        assert_eq!(cfg.agent.default_provider, "stub");
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let file = write_config(
            r#"
[db]
path = "/tmp/agent.sqlite"

[chunking]
max_chunk_size = 0

[server]
bind = "127.0.0.1:0"
"#,
        );
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("max_chunk_size"));
    }

    #[test]
    fn test_rejects_zero_limit() {
        let file = write_config(
            r#"
[db]
path = "/tmp/agent.sqlite"

[retrieval]
limit = 0

[server]
bind = "127.0.0.1:0"
"#,
        );
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}

//! Core data models shared by the indexing and chat pipelines.
//!
//! Store rows ([`Repo`], [`Thread`], [`Message`], [`StoredChunk`]) carry
//! timestamps as Unix seconds, matching the SQLite schema. Value types
//! handed to providers ([`HistoryMessage`], [`ContextChunk`],
//! [`RepoMetadata`]) are plain projections of those rows.

use serde::{Deserialize, Serialize};

/// Repository-level setting controlling access to unpublished content.
///
/// Unrecognized strings are kept as [`AgentMode::Unknown`] rather than
/// rejected, so a misconfigured repo still answers, just without drafts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentMode {
    Public,
    Private,
    DraftAssistant,
    Unknown(String),
}

impl AgentMode {
    pub fn parse(s: &str) -> Self {
        match s {
            "public" => AgentMode::Public,
            "private" => AgentMode::Private,
            "draft-assistant" => AgentMode::DraftAssistant,
            other => AgentMode::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AgentMode::Public => "public",
            AgentMode::Private => "private",
            AgentMode::DraftAssistant => "draft-assistant",
            AgentMode::Unknown(s) => s,
        }
    }
}

impl From<String> for AgentMode {
    fn from(s: String) -> Self {
        AgentMode::parse(&s)
    }
}

impl From<AgentMode> for String {
    fn from(mode: AgentMode) -> Self {
        mode.as_str().to_string()
    }
}

impl std::fmt::Display for AgentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            other => anyhow::bail!("unknown message role: '{}'", other),
        }
    }
}

/// Per-repo agent settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub agent_enabled: bool,
    pub agent_mode: AgentMode,
    /// Provider key resolved through [`crate::provider::create_provider`].
    pub model_provider: String,
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_enabled: true,
            agent_mode: AgentMode::Public,
            model_provider: "stub".to_string(),
            system_prompt: None,
        }
    }
}

/// A content repository with its agent configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repo {
    pub id: String,
    pub owner_handle: String,
    pub name: String,
    pub description: String,
    pub is_public: bool,
    pub agent: AgentConfig,
    pub created_at: i64,
}

impl Repo {
    pub fn metadata(&self) -> RepoMetadata {
        RepoMetadata {
            owner_handle: self.owner_handle.clone(),
            repo_name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Input for [`Store::create_repo`](crate::store::Store::create_repo).
#[derive(Debug, Clone)]
pub struct NewRepo {
    pub owner_handle: String,
    pub name: String,
    pub description: String,
    pub is_public: bool,
    pub agent: AgentConfig,
}

/// A conversation scoped to one repository.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub repo_id: String,
    pub title: String,
    pub visibility: String,
    pub created_at: i64,
}

/// A persisted conversation message. Append-only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub repo_id: String,
    pub role: Role,
    pub content: String,
    /// Content digests of the chunks the message drew on.
    pub citations: Vec<String>,
    pub created_at: i64,
}

/// Input for [`Store::append_message`](crate::store::Store::append_message).
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub repo_id: String,
    pub thread_id: String,
    pub role: Role,
    pub content: String,
    pub citations: Vec<String>,
}

/// Chunker output: normalized text addressed by its SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunk {
    pub content: String,
    pub file_path: Option<String>,
    pub content_hash: String,
}

/// An indexed chunk as held by a store.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub id: String,
    pub repo_id: String,
    pub content: String,
    pub file_path: Option<String>,
    pub content_hash: String,
    pub is_published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl StoredChunk {
    pub fn to_context(&self) -> ContextChunk {
        ContextChunk {
            content: self.content.clone(),
            file_path: self.file_path.clone(),
            content_hash: self.content_hash.clone(),
        }
    }
}

/// Retrieval-time view of a chunk, handed to providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextChunk {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub content_hash: String,
}

/// One entry of the conversation history replayed to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for HistoryMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoMetadata {
    pub owner_handle: String,
    pub repo_name: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_mode_parse() {
        assert_eq!(AgentMode::parse("public"), AgentMode::Public);
        assert_eq!(AgentMode::parse("private"), AgentMode::Private);
        assert_eq!(AgentMode::parse("draft-assistant"), AgentMode::DraftAssistant);
        assert_eq!(
            AgentMode::parse("admin"),
            AgentMode::Unknown("admin".to_string())
        );
        assert_eq!(AgentMode::parse("draft-assistant").as_str(), "draft-assistant");
    }

    #[test]
    fn test_agent_mode_serde_as_string() {
        let json = serde_json::to_string(&AgentMode::DraftAssistant).unwrap();
        assert_eq!(json, "\"draft-assistant\"");
        let mode: AgentMode = serde_json::from_str("\"private\"").unwrap();
        assert_eq!(mode, AgentMode::Private);
    }

    #[test]
    fn test_role_roundtrip_names() {
        for role in [Role::User, Role::Assistant, Role::System] {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
        assert!(Role::parse("tool").is_err());
    }
}

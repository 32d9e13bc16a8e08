//! Response-generation providers.
//!
//! An [`AgentProvider`] turns a system prompt, the thread history, the
//! retrieved chunks and repo metadata into answer text plus citations.
//! The chat flow depends only on this trait, so backends can be swapped
//! per repository through the `model_provider` setting.
//!
//! # Provider Selection
//!
//! [`create_provider`] maps a configuration key to an implementation:
//!
//! | Key | Provider |
//! |-----|----------|
//! | `stub`, `random_llm` (legacy) | [`StubAgentProvider`] |
//! | `hivemind` | [`HiveMindAgentProvider`] (not yet implemented) |
//! | anything else | [`StubAgentProvider`] |
//!
//! Unknown keys never fail: a misconfigured repo still gets answers.
//!
//! ```rust
//! use repo_agent_core::provider::create_provider;
//!
//! assert_eq!(create_provider("stub").name(), "stub");
//! assert_eq!(create_provider("no-such-backend").name(), "stub");
//! assert_eq!(create_provider("hivemind").name(), "hivemind");
//! ```

mod hivemind;
mod stub;

pub use hivemind::HiveMindAgentProvider;
pub use stub::StubAgentProvider;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{ContextChunk, HistoryMessage, RepoMetadata};

/// Everything a provider sees for one turn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub system_prompt: String,
    /// Full thread history, oldest first, including the current user message.
    pub messages: Vec<HistoryMessage>,
    pub context_chunks: Vec<ContextChunk>,
    pub repo_metadata: RepoMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateResponse {
    pub content: String,
    /// Content hashes of the chunks the answer drew on.
    pub citations: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The selected backend exists in the registry but cannot answer yet.
    #[error("{provider} provider not yet implemented. Use 'stub' provider for now.")]
    Unimplemented { provider: String },

    #[error("generation failed: {0}")]
    Generation(String),
}

/// A pluggable response-generation backend.
///
/// Implementations must accept empty history and empty context without
/// failing, and must not depend on mutating the request.
#[async_trait]
pub trait AgentProvider: Send + Sync {
    /// Registry key of this provider (e.g. `"stub"`).
    fn name(&self) -> &str;

    async fn generate_response(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError>;
}

/// Known provider backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Stub,
    HiveMind,
}

impl ProviderKind {
    /// Resolve a configuration key. Unknown keys resolve to [`ProviderKind::Stub`].
    pub fn from_key(key: &str) -> Self {
        match key {
            "stub" | "random_llm" => ProviderKind::Stub,
            "hivemind" => ProviderKind::HiveMind,
            other => {
                debug!(provider = other, "unknown provider key, using stub");
                ProviderKind::Stub
            }
        }
    }
}

/// Instantiate the provider configured under `key`.
pub fn create_provider(key: &str) -> Box<dyn AgentProvider> {
    match ProviderKind::from_key(key) {
        ProviderKind::Stub => Box::new(StubAgentProvider),
        ProviderKind::HiveMind => Box::new(HiveMindAgentProvider),
    }
}

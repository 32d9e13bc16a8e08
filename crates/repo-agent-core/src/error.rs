//! Error taxonomy for the chat and indexing flows.
//!
//! Pure functions in this crate cannot fail. Everything here describes a
//! terminal condition of one request; nothing is retried internally.

use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("repo not found: {0}")]
    RepoNotFound(String),

    #[error("agent disabled for repo: {0}")]
    AgentDisabled(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("repo not found: {0}")]
    RepoNotFound(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

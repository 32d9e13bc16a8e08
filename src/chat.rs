//! Chat orchestration: one user turn in a repository thread.
//!
//! ```text
//! repo ─▶ agent enabled? ─▶ thread (find or create) ─▶ append user msg
//!      ─▶ permission gate ─▶ retrieve ─▶ history ─▶ provider
//!      ─▶ append assistant msg ─▶ full thread
//! ```
//!
//! Message order relies on the store's atomic ordered append. A provider
//! failure is returned as-is; the user message stays persisted and
//! nothing is retried.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use repo_agent_core::error::ChatError;
use repo_agent_core::models::{HistoryMessage, Message, NewMessage, Role};
use repo_agent_core::permissions::{should_filter_by_published, PermissionContext};
use repo_agent_core::provider::{create_provider, GenerateRequest};
use repo_agent_core::retrieve::retrieve_context;
use repo_agent_core::store::Store;

use crate::config::Config;
use crate::validate::{ValidationError, MAX_MESSAGE_CHARS};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

impl ChatRequest {
    /// Message must be 1 to 4000 characters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let chars = self.message.chars().count();
        if chars == 0 {
            return Err(ValidationError::new("message", "must not be empty"));
        }
        if chars > MAX_MESSAGE_CHARS {
            return Err(ValidationError::new(
                "message",
                format!("must be at most {} characters", MAX_MESSAGE_CHARS),
            ));
        }
        Ok(())
    }
}

/// Message as returned to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub citations: Vec<String>,
    pub created_at: i64,
}

impl From<Message> for ChatMessage {
    fn from(msg: Message) -> Self {
        Self {
            id: msg.id,
            role: msg.role,
            content: msg.content,
            citations: msg.citations,
            created_at: msg.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub thread_id: String,
    pub messages: Vec<ChatMessage>,
}

/// Run one chat turn against `repo_id`.
///
/// The request is assumed valid (see [`ChatRequest::validate`]).
pub async fn chat(
    store: &dyn Store,
    config: &Config,
    repo_id: &str,
    request: &ChatRequest,
) -> Result<ChatResponse, ChatError> {
    let repo = store
        .get_repo(repo_id)
        .await?
        .ok_or_else(|| ChatError::RepoNotFound(repo_id.to_string()))?;

    if !repo.agent.agent_enabled {
        return Err(ChatError::AgentDisabled(repo.id));
    }

    let existing = match request.thread_id.as_deref() {
        Some(thread_id) => store.find_thread(&repo.id, thread_id).await?,
        None => None,
    };
    let thread = match existing {
        Some(thread) => thread,
        None => {
            let title = format!("Chat with {}/{}", repo.owner_handle, repo.name);
            store.create_thread(&repo.id, &title).await?
        }
    };

    store
        .append_message(&NewMessage {
            repo_id: repo.id.clone(),
            thread_id: thread.id.clone(),
            role: Role::User,
            content: request.message.clone(),
            citations: Vec::new(),
        })
        .await?;

    // Caller identity is not resolved yet, so the gate sees an anonymous caller.
    let permission = PermissionContext::anonymous(repo.agent.agent_mode.clone(), repo.is_public);
    let published_only = should_filter_by_published(&permission);

    let context_chunks = retrieve_context(
        store,
        &repo.id,
        &request.message,
        config.retrieval.limit,
        published_only,
    )
    .await?;

    let history: Vec<HistoryMessage> = store
        .list_messages(&thread.id)
        .await?
        .iter()
        .map(HistoryMessage::from)
        .collect();

    let provider = create_provider(&repo.agent.model_provider);
    let generate = GenerateRequest {
        system_prompt: repo.agent.system_prompt.clone().unwrap_or_default(),
        messages: history,
        context_chunks,
        repo_metadata: repo.metadata(),
    };

    let response = match provider.generate_response(&generate).await {
        Ok(response) => response,
        Err(e) => {
            warn!(
                repo_id = %repo.id,
                thread_id = %thread.id,
                provider = provider.name(),
                error = %e,
                "generation failed"
            );
            return Err(e.into());
        }
    };

    store
        .append_message(&NewMessage {
            repo_id: repo.id.clone(),
            thread_id: thread.id.clone(),
            role: Role::Assistant,
            content: response.content,
            citations: response.citations,
        })
        .await?;

    let messages = store.list_messages(&thread.id).await?;

    info!(
        repo_id = %repo.id,
        thread_id = %thread.id,
        provider = provider.name(),
        chunks = generate.context_chunks.len(),
        published_only,
        messages = messages.len(),
        "chat turn complete"
    );

    Ok(ChatResponse {
        thread_id: thread.id,
        messages: messages.into_iter().map(ChatMessage::from).collect(),
    })
}

/// Replay a thread's messages, scoped to `repo_id`.
///
/// Returns `Ok(None)` when the thread does not exist in that repo.
pub async fn get_thread(
    store: &dyn Store,
    repo_id: &str,
    thread_id: &str,
) -> anyhow::Result<Option<ChatResponse>> {
    let Some(thread) = store.find_thread(repo_id, thread_id).await? else {
        return Ok(None);
    };
    let messages = store.list_messages(&thread.id).await?;
    Ok(Some(ChatResponse {
        thread_id: thread.id,
        messages: messages.into_iter().map(ChatMessage::from).collect(),
    }))
}

/// CLI entry point: run one turn and print the assistant reply.
pub async fn run_chat(
    store: &dyn Store,
    config: &Config,
    repo_id: &str,
    message: &str,
    thread_id: Option<String>,
) -> anyhow::Result<()> {
    let request = ChatRequest {
        message: message.to_string(),
        thread_id,
    };
    request.validate()?;

    let response = chat(store, config, repo_id, &request).await?;

    println!("thread: {}", response.thread_id);
    if let Some(reply) = response.messages.last() {
        println!();
        println!("{}", reply.content);
        if !reply.citations.is_empty() {
            println!();
            println!("citations:");
            for c in &reply.citations {
                println!("  {}", c);
            }
        }
    }
    Ok(())
}

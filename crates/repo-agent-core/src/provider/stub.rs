//! Deterministic keyword-triggered provider.
//!
//! Used for development, tests, and as the fallback for unknown provider
//! keys. Picks a canned answer from the last user message:
//!
//! | Trigger (case-insensitive) | Answer |
//! |----------------------------|--------|
//! | no user message, `what is this`, `explain` | repo identity and description |
//! | `context`, `content`, `chunk` | preview of the top chunk |
//! | `learning`, `hivemind` | provider status |
//! | anything else | echo plus capability note |
//!
//! Whenever context chunks are supplied, the first chunk's hash is cited.

use async_trait::async_trait;

use crate::models::{ContextChunk, Role};

use super::{AgentProvider, GenerateRequest, GenerateResponse, ProviderError};

/// Characters of the top chunk shown in a preview.
const PREVIEW_CHARS: usize = 200;

pub struct StubAgentProvider;

#[async_trait]
impl AgentProvider for StubAgentProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate_response(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError> {
        Ok(respond(request))
    }
}

fn respond(request: &GenerateRequest) -> GenerateResponse {
    let last_user = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("");
    let lower = last_user.to_lowercase();
    let chunks = &request.context_chunks;
    let citations: Vec<String> = chunks
        .first()
        .map(|c| vec![c.content_hash.clone()])
        .unwrap_or_default();

    let content = if lower.trim().is_empty()
        || lower.contains("what is this")
        || lower.contains("explain")
    {
        identity_answer(request)
    } else if lower.contains("context") || lower.contains("content") || lower.contains("chunk") {
        match chunks.first() {
            Some(top) => preview_answer(top, chunks.len()),
            None => {
                return GenerateResponse {
                    content: "I don't have any indexed content for this repo yet. \
                              Content will be indexed when you publish."
                        .to_string(),
                    citations: Vec::new(),
                }
            }
        }
    } else if lower.contains("learning") || lower.contains("hivemind") {
        "This repo's agent is currently using a **stub provider**.\n\n\
         - Current provider: Stub (deterministic responses)\n\
         - Future: Will support HiveMind provider integration\n\n\
         The agent can access published content chunks for context."
            .to_string()
    } else {
        format!(
            "Got it. You said:\n\"{}\"\n\n\
             Right now I'm a stubbed agent with RAG support. I can search through indexed \
             content chunks from this repo. A real model provider can be connected later \
             without changing the chat API.",
            last_user
        )
    };

    GenerateResponse { content, citations }
}

fn identity_answer(request: &GenerateRequest) -> String {
    let meta = &request.repo_metadata;
    let description = if meta.description.trim().is_empty() {
        "(no description yet)"
    } else {
        meta.description.as_str()
    };

    let mut parts = vec![
        format!(
            "I'm the Repo Agent for {}/{}.",
            meta.owner_handle, meta.repo_name
        ),
        format!("Description: {}", description),
    ];
    if !request.context_chunks.is_empty() {
        parts.push(format!(
            "I found {} relevant content chunks in this repo.",
            request.context_chunks.len()
        ));
    }
    parts.push("Ask me about the roadmap, changes, or how to contribute.".to_string());
    parts.join("\n\n")
}

fn preview_answer(top: &ContextChunk, total: usize) -> String {
    let preview: String = top.content.chars().take(PREVIEW_CHARS).collect();
    let mut out = format!(
        "I found {} relevant content chunk(s). Here's a preview:\n\n\"{}...\"",
        total, preview
    );
    if let Some(path) = &top.file_path {
        out.push_str(&format!("\n\n(from {})", path));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistoryMessage, RepoMetadata};

    fn request(message: Option<&str>, chunks: Vec<ContextChunk>, description: &str) -> GenerateRequest {
        GenerateRequest {
            system_prompt: String::new(),
            messages: message
                .map(|m| {
                    vec![HistoryMessage {
                        role: Role::User,
                        content: m.to_string(),
                    }]
                })
                .unwrap_or_default(),
            context_chunks: chunks,
            repo_metadata: RepoMetadata {
                owner_handle: "test".to_string(),
                repo_name: "test-repo".to_string(),
                description: description.to_string(),
            },
        }
    }

    fn chunk(content: &str, hash: &str, path: Option<&str>) -> ContextChunk {
        ContextChunk {
            content: content.to_string(),
            file_path: path.map(str::to_string),
            content_hash: hash.to_string(),
        }
    }

    async fn run(req: &GenerateRequest) -> GenerateResponse {
        StubAgentProvider.generate_response(req).await.unwrap()
    }

    #[tokio::test]
    async fn test_identity_answer() {
        let resp = run(&request(Some("What is this?"), vec![], "A test repo")).await;
        assert!(resp.content.contains("test/test-repo"));
        assert!(resp.content.contains("A test repo"));
        assert!(resp.citations.is_empty());
    }

    #[tokio::test]
    async fn test_identity_without_description_counts_chunks() {
        let resp = run(&request(
            Some("please explain"),
            vec![chunk("a", "h1", None), chunk("b", "h2", None)],
            "",
        ))
        .await;
        assert!(resp.content.contains("(no description yet)"));
        assert!(resp.content.contains("I found 2 relevant content chunks"));
        assert_eq!(resp.citations, vec!["h1"]);
    }

    #[tokio::test]
    async fn test_empty_history_gets_identity_answer() {
        let resp = run(&request(None, vec![], "A test repo")).await;
        assert!(resp.content.contains("test/test-repo"));
    }

    #[tokio::test]
    async fn test_context_preview_cites_first_chunk() {
        let resp = run(&request(
            Some("Show me context"),
            vec![chunk("This is test content", "abc123", Some("test.md"))],
            "",
        ))
        .await;
        assert!(resp.content.contains("relevant content chunk"));
        assert!(resp.content.contains("This is test content"));
        assert!(resp.content.contains("(from test.md)"));
        assert!(resp.citations.contains(&"abc123".to_string()));
    }

    #[tokio::test]
    async fn test_context_preview_truncates_on_char_boundary() {
        let long = "é".repeat(500);
        let resp = run(&request(Some("chunk please"), vec![chunk(&long, "h", None)], "")).await;
        assert!(resp.content.contains(&"é".repeat(200)));
        assert!(!resp.content.contains(&"é".repeat(201)));
    }

    #[tokio::test]
    async fn test_context_without_chunks() {
        let resp = run(&request(Some("any content?"), vec![], "")).await;
        assert!(resp.content.contains("don't have any indexed content"));
        assert!(resp.citations.is_empty());
    }

    #[tokio::test]
    async fn test_status_branch_still_cites() {
        let resp = run(&request(Some("Is HiveMind learning?"), vec![chunk("x", "h9", None)], "")).await;
        assert!(resp.content.contains("stub provider"));
        assert_eq!(resp.citations, vec!["h9"]);
    }

    #[tokio::test]
    async fn test_default_echo() {
        let resp = run(&request(Some("Hello there"), vec![], "")).await;
        assert!(resp.content.contains("\"Hello there\""));
        assert!(resp.citations.is_empty());
    }

    #[tokio::test]
    async fn test_uses_last_user_message() {
        let mut req = request(Some("what is this"), vec![], "");
        req.messages.push(HistoryMessage {
            role: Role::Assistant,
            content: "I'm the Repo Agent".to_string(),
        });
        req.messages.push(HistoryMessage {
            role: Role::User,
            content: "thanks".to_string(),
        });
        let resp = run(&req).await;
        assert!(resp.content.contains("\"thanks\""));
    }

    #[tokio::test]
    async fn test_deterministic() {
        let req = request(Some("tell me about content"), vec![chunk("abc", "h", None)], "d");
        assert_eq!(run(&req).await, run(&req).await);
    }
}

//! Permission gate for unpublished (draft) content.
//!
//! The gate turns agent mode, repo visibility and caller identity into a
//! single `published_only` flag that is threaded into retrieval.
//!
//! | Agent mode | Unpublished content |
//! |------------|---------------------|
//! | `public` | never |
//! | `private` | owner only |
//! | `draft-assistant` | owner only |
//! | anything else | never |
//!
//! `is_owner` is supplied by the caller; no identity check happens here.
//! An absent value means "not the owner".

use crate::models::AgentMode;

/// Per-request input to the gate. Never persisted.
#[derive(Debug, Clone)]
pub struct PermissionContext {
    pub agent_mode: AgentMode,
    /// Carried for callers; the current decision table does not consult it.
    pub repo_is_public: bool,
    pub user_id: Option<String>,
    pub is_owner: Option<bool>,
}

impl PermissionContext {
    /// Context for an anonymous caller.
    pub fn anonymous(agent_mode: AgentMode, repo_is_public: bool) -> Self {
        Self {
            agent_mode,
            repo_is_public,
            user_id: None,
            is_owner: None,
        }
    }
}

/// Whether the agent may read unpublished content for this request.
pub fn can_access_private_content(ctx: &PermissionContext) -> bool {
    match ctx.agent_mode {
        AgentMode::Public => false,
        AgentMode::Private | AgentMode::DraftAssistant => ctx.is_owner.unwrap_or(false),
        AgentMode::Unknown(_) => false,
    }
}

/// Whether retrieval must be restricted to published chunks.
pub fn should_filter_by_published(ctx: &PermissionContext) -> bool {
    !can_access_private_content(ctx)
}

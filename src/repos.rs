//! Repository administration and retrieval preview for the CLI.
//!
//! `repo add`, `repo list`, `repo configure` and `search` all go through
//! the [`Store`] trait, so they behave the same over SQLite and the
//! in-memory store.

use anyhow::{bail, Result};
use tracing::info;

use repo_agent_core::models::{AgentConfig, AgentMode, NewRepo};
use repo_agent_core::permissions::{should_filter_by_published, PermissionContext};
use repo_agent_core::provider::ProviderKind;
use repo_agent_core::retrieve::retrieve_context;
use repo_agent_core::store::Store;

use crate::config::Config;

/// Options for `repo add`. Unset agent fields fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct AddRepoOptions {
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    pub private: bool,
    pub mode: Option<String>,
    pub provider: Option<String>,
    pub system_prompt: Option<String>,
    pub disabled: bool,
}

/// Changes applied by `repo configure`. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct AgentUpdate {
    pub enabled: Option<bool>,
    pub mode: Option<String>,
    pub provider: Option<String>,
    pub system_prompt: Option<String>,
    pub clear_system_prompt: bool,
}

impl AgentUpdate {
    pub fn apply(&self, agent: &mut AgentConfig) {
        if let Some(enabled) = self.enabled {
            agent.agent_enabled = enabled;
        }
        if let Some(mode) = &self.mode {
            agent.agent_mode = AgentMode::parse(mode);
        }
        if let Some(provider) = &self.provider {
            agent.model_provider = provider.clone();
        }
        if self.clear_system_prompt {
            agent.system_prompt = None;
        } else if let Some(prompt) = &self.system_prompt {
            agent.system_prompt = Some(prompt.clone());
        }
    }
}

fn check_agent_settings(agent: &AgentConfig) -> Result<()> {
    if let AgentMode::Unknown(mode) = &agent.agent_mode {
        bail!(
            "unknown agent mode '{}': expected public, private or draft-assistant",
            mode
        );
    }
    if agent.model_provider.trim().is_empty() {
        bail!("model provider must not be empty");
    }
    Ok(())
}

pub async fn run_add_repo(store: &dyn Store, config: &Config, opts: AddRepoOptions) -> Result<()> {
    if opts.owner.trim().is_empty() || opts.name.trim().is_empty() {
        bail!("owner and name must not be empty");
    }

    let agent = AgentConfig {
        agent_enabled: !opts.disabled,
        agent_mode: opts
            .mode
            .as_deref()
            .map(AgentMode::parse)
            .unwrap_or(AgentMode::Public),
        model_provider: opts
            .provider
            .unwrap_or_else(|| config.agent.default_provider.clone()),
        system_prompt: opts.system_prompt,
    };
    check_agent_settings(&agent)?;

    let repo = store
        .create_repo(&NewRepo {
            owner_handle: opts.owner,
            name: opts.name,
            description: opts.description.unwrap_or_default(),
            is_public: !opts.private,
            agent,
        })
        .await?;

    info!(repo_id = %repo.id, "repo created");
    println!("{}", repo.id);
    Ok(())
}

pub async fn run_list_repos(store: &dyn Store) -> Result<()> {
    let repos = store.list_repos().await?;
    if repos.is_empty() {
        println!("No repos.");
        return Ok(());
    }

    for repo in repos {
        let chunks = store.count_chunks(&repo.id).await?;
        println!(
            "{}  {}/{}  {}  agent={} mode={} provider={} chunks={}",
            repo.id,
            repo.owner_handle,
            repo.name,
            if repo.is_public { "public" } else { "private" },
            if repo.agent.agent_enabled { "on" } else { "off" },
            repo.agent.agent_mode,
            repo.agent.model_provider,
            chunks,
        );
    }
    Ok(())
}

pub async fn run_configure_repo(store: &dyn Store, repo_id: &str, update: AgentUpdate) -> Result<()> {
    let Some(repo) = store.get_repo(repo_id).await? else {
        bail!("repo not found: {}", repo_id);
    };

    let mut agent = repo.agent.clone();
    update.apply(&mut agent);
    check_agent_settings(&agent)?;

    if !store.set_agent_config(&repo.id, &agent).await? {
        bail!("repo not found: {}", repo_id);
    }

    if ProviderKind::from_key(&agent.model_provider) == ProviderKind::Stub
        && agent.model_provider != "stub"
    {
        println!(
            "note: provider '{}' is served by the stub provider",
            agent.model_provider
        );
    }

    info!(repo_id = %repo.id, mode = %agent.agent_mode, provider = %agent.model_provider, "agent settings updated");
    println!("ok");
    Ok(())
}

/// Print the chunks the chat pipeline would retrieve for `query`.
///
/// Without `include_drafts` the result matches what an anonymous caller
/// sees; with it, the published filter is lifted.
pub async fn run_search(
    store: &dyn Store,
    config: &Config,
    repo_id: &str,
    query: &str,
    limit: Option<usize>,
    include_drafts: bool,
) -> Result<()> {
    let Some(repo) = store.get_repo(repo_id).await? else {
        bail!("repo not found: {}", repo_id);
    };

    let published_only = if include_drafts {
        false
    } else {
        let ctx = PermissionContext::anonymous(repo.agent.agent_mode.clone(), repo.is_public);
        should_filter_by_published(&ctx)
    };
    let limit = limit.unwrap_or(config.retrieval.limit);

    let chunks = retrieve_context(store, &repo.id, query, limit, published_only).await?;
    if chunks.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, chunk) in chunks.iter().enumerate() {
        let short_hash: String = chunk.content_hash.chars().take(12).collect();
        println!(
            "{}. {}  {}",
            i + 1,
            short_hash,
            chunk.file_path.as_deref().unwrap_or("-")
        );
        let preview: String = chunk.content.chars().take(200).collect();
        println!("    {}", preview);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_agent_core::store::memory::InMemoryStore;

    fn opts(owner: &str, name: &str) -> AddRepoOptions {
        AddRepoOptions {
            owner: owner.to_string(),
            name: name.to_string(),
            ..AddRepoOptions::default()
        }
    }

    #[tokio::test]
    async fn test_add_uses_configured_default_provider() {
        let store = InMemoryStore::new();
        let mut cfg = Config::minimal();
        cfg.agent.default_provider = "hivemind".to_string();

        run_add_repo(&store, &cfg, opts("acme", "docs")).await.unwrap();

        let repos = store.list_repos().await.unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].agent.model_provider, "hivemind");
        assert_eq!(repos[0].agent.agent_mode, AgentMode::Public);
        assert!(repos[0].agent.agent_enabled);
        assert!(repos[0].is_public);
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_mode() {
        let store = InMemoryStore::new();
        let mut o = opts("acme", "docs");
        o.mode = Some("secret".to_string());

        assert!(run_add_repo(&store, &Config::minimal(), o).await.is_err());
        assert!(store.list_repos().await.unwrap().is_empty());
    }

    #[test]
    fn test_update_leaves_unset_fields() {
        let mut agent = AgentConfig {
            system_prompt: Some("Be brief.".to_string()),
            ..AgentConfig::default()
        };
        AgentUpdate {
            enabled: Some(false),
            ..AgentUpdate::default()
        }
        .apply(&mut agent);

        assert!(!agent.agent_enabled);
        assert_eq!(agent.agent_mode, AgentMode::Public);
        assert_eq!(agent.model_provider, "stub");
        assert_eq!(agent.system_prompt.as_deref(), Some("Be brief."));

        AgentUpdate {
            clear_system_prompt: true,
            system_prompt: Some("ignored".to_string()),
            ..AgentUpdate::default()
        }
        .apply(&mut agent);
        assert!(agent.system_prompt.is_none());
    }

    #[tokio::test]
    async fn test_configure_persists() {
        let store = InMemoryStore::new();
        run_add_repo(&store, &Config::minimal(), opts("acme", "docs"))
            .await
            .unwrap();
        let id = store.list_repos().await.unwrap()[0].id.clone();

        run_configure_repo(
            &store,
            &id,
            AgentUpdate {
                mode: Some("draft-assistant".to_string()),
                ..AgentUpdate::default()
            },
        )
        .await
        .unwrap();

        let repo = store.get_repo(&id).await.unwrap().unwrap();
        assert_eq!(repo.agent.agent_mode, AgentMode::DraftAssistant);
    }

    #[tokio::test]
    async fn test_configure_missing_repo() {
        let store = InMemoryStore::new();
        assert!(run_configure_repo(&store, "nope", AgentUpdate::default())
            .await
            .is_err());
    }
}

//! Placeholder for the network-backed HiveMind provider.
//!
//! Registered so that selecting `hivemind` resolves cleanly; every call
//! fails with [`ProviderError::Unimplemented`].

use async_trait::async_trait;

use super::{AgentProvider, GenerateRequest, GenerateResponse, ProviderError};

pub struct HiveMindAgentProvider;

#[async_trait]
impl AgentProvider for HiveMindAgentProvider {
    fn name(&self) -> &str {
        "hivemind"
    }

    async fn generate_response(
        &self,
        _request: &GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError> {
        Err(ProviderError::Unimplemented {
            provider: "HiveMind".to_string(),
        })
    }
}

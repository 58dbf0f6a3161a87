//! Environment-backed agent factory.
//!
//! Validates the environment, then wires the OpenAI provider, the wallet
//! toolkit and an in-memory checkpoint store into a [`ToolAgent`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tunebot_core::agent::Agent;
use tunebot_core::agent::checkpoint::MemoryCheckpointStore;
use tunebot_core::agent::tool_agent::{AgentSettings, ToolAgent};
use tunebot_core::agent::toolkit::BoxToolkit;
use tunebot_core::llm::box_provider::BoxLlmProvider;
use tunebot_core::session::manager::AgentFactory;
use tunebot_types::config::ServerConfig;
use tunebot_types::error::SessionError;

use crate::env::AgentEnv;
use crate::llm::openai::OpenAiProvider;
use crate::wallet::WalletToolkit;

/// Persona and operating rules for the musician agent.
pub const SYSTEM_PROMPT: &str = "\
You are an AI Musician Agent designed to help musicians promote and manage their latest music releases using onchain technology. Your primary goal is to assist musicians in running successful campaigns for their latest singles.

Core capabilities:
- Create and manage NFT collections for music releases
- Set up and manage onchain wallets for music revenue
- Deploy social tokens for fan engagement
- Handle smart contracts for music rights
- Manage promotional campaigns for releases

If you ever need funds, you can request them from the faucet if you are on network ID 'base-sepolia'. If not, you can provide your wallet details and request funds from the user. Before executing your first action, get the wallet details to see what network you're on.

If there is a 5XX (internal) HTTP error code, ask the user to try again later. If someone asks you to do something you can't do with your currently available tools, you must say so, and encourage them to implement it themselves using the CDP SDK + Agentkit, recommend they go to docs.cdp.coinbase.com for more information.

Be concise and helpful with your responses. Focus on music industry-specific use cases and explain onchain concepts in terms that musicians would understand. Refrain from restating your tools' descriptions unless explicitly requested.";

type EnvLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Builds a [`ToolAgent`] from environment variables and [`ServerConfig`].
pub struct EnvAgentFactory {
    config: ServerConfig,
    lookup: Arc<EnvLookup>,
}

impl EnvAgentFactory {
    /// Read from the process environment.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            lookup: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    /// Read from a custom lookup instead of the process environment.
    pub fn with_lookup<F>(config: ServerConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            config,
            lookup: Arc::new(lookup),
        }
    }

    fn build(&self) -> Result<Arc<dyn Agent>, SessionError> {
        let env = AgentEnv::from_lookup(|name| (self.lookup)(name))?;

        let mut provider = OpenAiProvider::new(env.openai_api_key, &self.config.model)
            .map_err(|e| SessionError::Init(e.to_string()))?;
        if let Some(base_url) = env.openai_base_url {
            provider = provider.with_base_url(base_url);
        }

        let toolkit = WalletToolkit::new(env.network_id, env.cdp_api_key_name);

        let settings = AgentSettings {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            max_steps: self.config.max_agent_steps,
            system_prompt: SYSTEM_PROMPT.to_string(),
        };

        tracing::info!(
            model = %settings.model,
            network = %toolkit.network_id(),
            "building agent"
        );

        let agent = ToolAgent::new(
            BoxLlmProvider::new(provider),
            BoxToolkit::new(toolkit),
            Arc::new(MemoryCheckpointStore::new()),
            settings,
        );
        Ok(Arc::new(agent))
    }
}

impl AgentFactory for EnvAgentFactory {
    fn create(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<dyn Agent>, SessionError>> + Send + '_>> {
        Box::pin(async move { self.build() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tunebot_types::error::ConfigError;

    fn factory(vars: &[(&str, &str)]) -> EnvAgentFactory {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvAgentFactory::with_lookup(ServerConfig::default(), move |name| map.get(name).cloned())
    }

    #[tokio::test]
    async fn test_missing_env_is_config_error() {
        let result = factory(&[("OPENAI_API_KEY", "sk-1")]).create().await;
        match result {
            Err(SessionError::Config(ConfigError::MissingVariables(names))) => {
                assert_eq!(names, vec!["CDP_API_KEY_NAME", "CDP_API_KEY_PRIVATE_KEY"]);
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("expected a configuration error"),
        }
    }

    #[tokio::test]
    async fn test_complete_env_builds_agent_with_wallet_tool() {
        let agent = factory(&[
            ("OPENAI_API_KEY", "sk-1"),
            ("CDP_API_KEY_NAME", "key-name"),
            ("CDP_API_KEY_PRIVATE_KEY", "pem"),
            ("OPENAI_BASE_URL", "http://127.0.0.1:9/v1"),
        ])
        .create()
        .await
        .unwrap();

        let tools = agent.tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "get_wallet_details");
    }
}

//! Application state shared by the HTTP handlers.

use std::path::Path;
use std::sync::Arc;

use tunebot_core::session::manager::{AgentFactory, SessionManager, SessionSettings};
use tunebot_infra::config::load_server_config;
use tunebot_infra::factory::EnvAgentFactory;
use tunebot_types::config::ServerConfig;

/// Shared application state.
///
/// Holds the single session manager: one lazily created agent and one
/// auto-loop controller slot per process.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Load `config_path` and wire the environment-backed agent factory.
    ///
    /// The agent itself is created on the first chat or auto request.
    pub async fn init(config_path: &Path) -> Self {
        let config = load_server_config(config_path).await;
        let factory = EnvAgentFactory::new(config.clone());
        Self::with_factory(Arc::new(factory), config)
    }

    /// Wire state around an arbitrary agent factory.
    pub fn with_factory(factory: Arc<dyn AgentFactory>, config: ServerConfig) -> Self {
        let settings = SessionSettings::from(&config);
        Self {
            sessions: Arc::new(SessionManager::new(factory, settings)),
            config: Arc::new(config),
        }
    }
}

//! Environment validation for agent initialization.
//!
//! Required variables are checked in a fixed order and every missing name is
//! reported at once. Values are read through a lookup function so tests do
//! not have to mutate the process environment.

use secrecy::SecretString;

use tunebot_types::error::ConfigError;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const CDP_API_KEY_NAME: &str = "CDP_API_KEY_NAME";
pub const CDP_API_KEY_PRIVATE_KEY: &str = "CDP_API_KEY_PRIVATE_KEY";
pub const NETWORK_ID: &str = "NETWORK_ID";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

/// Network used when `NETWORK_ID` is unset.
pub const DEFAULT_NETWORK_ID: &str = "base-sepolia";

/// Required variables, in reporting order.
pub const REQUIRED_VARS: [&str; 3] = [OPENAI_API_KEY, CDP_API_KEY_NAME, CDP_API_KEY_PRIVATE_KEY];

/// Validated agent environment. Secrets never appear in `Debug` output.
#[derive(Debug)]
pub struct AgentEnv {
    pub openai_api_key: SecretString,
    pub cdp_api_key_name: String,
    pub cdp_api_key_private_key: SecretString,
    pub network_id: String,
    pub openai_base_url: Option<String>,
}

impl AgentEnv {
    /// Read and validate the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Validate using `lookup`. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let missing: Vec<String> = REQUIRED_VARS
            .into_iter()
            .filter(|name| get(*name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            tracing::error!(missing = %missing.join(", "), "required environment variables are not set");
            return Err(ConfigError::MissingVariables(missing));
        }

        let network_id = get(NETWORK_ID).unwrap_or_else(|| {
            tracing::warn!("{NETWORK_ID} not set, defaulting to {DEFAULT_NETWORK_ID}");
            DEFAULT_NETWORK_ID.to_string()
        });

        Ok(Self {
            openai_api_key: SecretString::from(get(OPENAI_API_KEY).unwrap_or_default()),
            cdp_api_key_name: get(CDP_API_KEY_NAME).unwrap_or_default(),
            cdp_api_key_private_key: SecretString::from(
                get(CDP_API_KEY_PRIVATE_KEY).unwrap_or_default(),
            ),
            network_id,
            openai_base_url: get(OPENAI_BASE_URL),
        })
    }
}

//! Wallet toolkit exposed to the agent.
//!
//! Only reports wallet metadata; key material never reaches the model.

use serde::Deserialize;
use serde_json::json;

use tunebot_core::agent::toolkit::Toolkit;
use tunebot_types::agent::ToolDefinition;
use tunebot_types::error::ToolError;

pub const GET_WALLET_DETAILS: &str = "get_wallet_details";

/// Toolkit bound to one platform key and network.
pub struct WalletToolkit {
    network_id: String,
    api_key_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct WalletDetailsArgs {}

impl WalletToolkit {
    pub fn new(network_id: String, api_key_name: String) -> Self {
        Self {
            network_id,
            api_key_name,
        }
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    fn wallet_details(&self) -> String {
        json!({
            "network_id": self.network_id,
            "api_key_name": self.api_key_name,
        })
        .to_string()
    }
}

impl Toolkit for WalletToolkit {
    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            name: GET_WALLET_DETAILS.to_string(),
            description: "Get the details of the agent's wallet, including the network it is on."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false,
            }),
        }]
    }

    async fn invoke(&self, name: &str, arguments: serde_json::Value) -> Result<String, ToolError> {
        match name {
            GET_WALLET_DETAILS => {
                let arguments = if arguments.is_null() { json!({}) } else { arguments };
                serde_json::from_value::<WalletDetailsArgs>(arguments).map_err(|e| {
                    ToolError::InvalidArguments {
                        name: name.to_string(),
                        message: e.to_string(),
                    }
                })?;
                tracing::debug!(tool = name, network = %self.network_id, "wallet tool invoked");
                Ok(self.wallet_details())
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

//! OpenAiProvider -- concrete [`LlmProvider`] for the OpenAI Chat Completions API.
//!
//! Sends non-streaming requests with function tools to `/chat/completions`
//! and maps `tool_calls` back into generic [`ToolCall`]s.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the `Authorization` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use tunebot_core::llm::provider::LlmProvider;
use tunebot_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason, ToolCall,
    Usage,
};

use super::types::{ApiErrorBody, ChatMessage, ChatRequest, ChatResponse, ChatTool};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat-completions provider.
///
/// Does not derive `Debug`; the key never appears in logs.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    capabilities: ProviderCapabilities,
}

impl OpenAiProvider {
    /// Create a provider against [`DEFAULT_BASE_URL`].
    pub fn new(api_key: SecretString, model: &str) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300)) // long tool-calling turns
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            capabilities: Self::capabilities_for_model(model),
        })
    }

    /// Override the base URL (proxies, compatible gateways, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn capabilities_for_model(model: &str) -> ProviderCapabilities {
        if model.starts_with("gpt-4o") || model.starts_with("gpt-4.1") {
            ProviderCapabilities {
                tool_calling: true,
                max_context_tokens: 128_000,
                max_output_tokens: 16_384,
            }
        } else if model.starts_with("gpt-4") {
            ProviderCapabilities {
                tool_calling: true,
                max_context_tokens: 8_192,
                max_output_tokens: 4_096,
            }
        } else {
            ProviderCapabilities {
                tool_calling: true,
                max_context_tokens: 16_384,
                max_output_tokens: 4_096,
            }
        }
    }

    fn to_chat_request(&self, request: &CompletionRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage::system(system));
        }
        messages.extend(request.messages.iter().map(ChatMessage::from));

        ChatRequest {
            model: request.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            tools: request.tools.iter().map(ChatTool::from).collect(),
        }
    }
}

/// Map a non-success status and its body to an [`LlmError`].
fn status_error(status: reqwest::StatusCode, body: &str, retry_after: Option<u64>) -> LlmError {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status.as_u16() {
        400 => LlmError::InvalidRequest(detail),
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: retry_after.map(|s| s * 1000),
        },
        503 => LlmError::Overloaded(detail),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {detail}"),
        },
    }
}

fn stop_reason(finish_reason: Option<&str>, has_calls: bool) -> StopReason {
    match finish_reason {
        Some("tool_calls") | Some("function_call") => StopReason::ToolUse,
        Some("length") => StopReason::MaxTokens,
        Some("stop") if has_calls => StopReason::ToolUse,
        Some("content_filter") => StopReason::StopSequence,
        _ if has_calls => StopReason::ToolUse,
        _ => StopReason::EndTurn,
    }
}

impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_chat_request(request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let error_body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &error_body, retry_after));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        let choice = chat.choices.into_iter().next().ok_or_else(|| {
            LlmError::Deserialization("response contained no choices".to_string())
        })?;

        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(ToolCall::from)
            .collect();

        let usage = chat
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: chat.id,
            content: choice.message.content.unwrap_or_default(),
            stop_reason: stop_reason(choice.finish_reason.as_deref(), !tool_calls.is_empty()),
            tool_calls,
            model: chat.model,
            usage,
        })
    }
}

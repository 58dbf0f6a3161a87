//! LLM provider implementations.
//!
//! Contains the concrete [`LlmProvider`](tunebot_core::llm::provider::LlmProvider)
//! used by the agent: OpenAI chat completions with function tools.

pub mod openai;

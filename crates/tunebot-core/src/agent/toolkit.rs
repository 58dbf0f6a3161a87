//! Toolkit trait definition and its object-safe wrapper.
//!
//! Mirrors the provider pattern in [`crate::llm::box_provider`]: a RPITIT
//! trait for implementors, a blanket `ToolkitDyn` with boxed futures, and
//! [`BoxToolkit`] for storage behind an `Arc`.

use std::future::Future;
use std::pin::Pin;

use tunebot_types::agent::ToolDefinition;
use tunebot_types::error::ToolError;

/// A set of tools the agent may call.
///
/// Implementations live in tunebot-infra (e.g., `WalletToolkit`).
pub trait Toolkit: Send + Sync {
    /// Definitions advertised to the model.
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Run the named tool with JSON arguments and return its textual result.
    fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> impl Future<Output = Result<String, ToolError>> + Send;
}

/// Object-safe version of [`Toolkit`] with boxed futures.
pub trait ToolkitDyn: Send + Sync {
    fn definitions(&self) -> Vec<ToolDefinition>;

    fn invoke_boxed<'a>(
        &'a self,
        name: &'a str,
        arguments: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>>;
}

impl<T: Toolkit> ToolkitDyn for T {
    fn definitions(&self) -> Vec<ToolDefinition> {
        Toolkit::definitions(self)
    }

    fn invoke_boxed<'a>(
        &'a self,
        name: &'a str,
        arguments: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>> {
        Box::pin(self.invoke(name, arguments))
    }
}

/// Type-erased toolkit.
pub struct BoxToolkit {
    inner: Box<dyn ToolkitDyn + Send + Sync>,
}

impl BoxToolkit {
    pub fn new<T: Toolkit + 'static>(toolkit: T) -> Self {
        Self {
            inner: Box::new(toolkit),
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.inner.definitions()
    }

    pub async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<String, ToolError> {
        self.inner.invoke_boxed(name, arguments).await
    }
}

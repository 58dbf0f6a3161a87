//! Session manager: command routing, lazy agent initialization, and the
//! chat/auto line streams.
//!
//! Lifecycle of a streamed response:
//! - the manager validates the command and makes sure the agent exists
//!   (both can fail before any stream is opened);
//! - a task is spawned that writes lines into a bounded channel;
//! - the receiver half is handed back as the response body;
//! - the task drops its sender when done, which closes the stream exactly once.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OnceCell, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

use tunebot_types::agent::{AUTO_STOPPED_LINE, STOP_CONFIRMATION, TURN_SEPARATOR, error_line};
use tunebot_types::command::{AgentCommand, Route};
use tunebot_types::config::ServerConfig;
use tunebot_types::error::SessionError;

use crate::agent::Agent;

use super::controller::{AutoLoopController, ControllerSlot};
use super::lines::{LineSender, TurnEnd, pump_turn};

/// Receiver half of a streamed response.
pub type LineStream = ReceiverStream<String>;

/// Lines buffered between the writer task and the client.
const LINE_BUFFER: usize = 32;

/// Builds the agent on first use.
///
/// Object-safe so the server can hold any factory behind an `Arc`.
pub trait AgentFactory: Send + Sync {
    fn create(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<dyn Agent>, SessionError>> + Send + '_>>;
}

/// Settings that shape the session protocol.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Conversation identifier passed with every turn.
    pub thread_id: String,
    /// Prompt submitted on every auto turn.
    pub auto_prompt: String,
    /// Pause between auto turns.
    pub auto_interval: Duration,
}

impl From<&ServerConfig> for SessionSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            thread_id: config.thread_id.clone(),
            auto_prompt: config.auto_prompt.clone(),
            auto_interval: config.auto_interval(),
        }
    }
}

/// Result of handling a command.
#[derive(Debug)]
pub enum SessionReply {
    /// The stop action was processed; carries the confirmation message.
    Stopped { message: String },
    /// A chat or auto stream was opened.
    Stream(LineStream),
}

/// Owns the process-wide agent handle and the auto-loop controller slot.
pub struct SessionManager {
    factory: Arc<dyn AgentFactory>,
    agent: OnceCell<Arc<dyn Agent>>,
    slot: Arc<ControllerSlot>,
    settings: SessionSettings,
}

impl SessionManager {
    pub fn new(factory: Arc<dyn AgentFactory>, settings: SessionSettings) -> Self {
        Self {
            factory,
            agent: OnceCell::new(),
            slot: Arc::new(ControllerSlot::new()),
            settings,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Whether an auto loop currently owns the controller slot.
    pub fn is_auto_running(&self) -> bool {
        self.slot.is_active()
    }

    /// Whether the agent has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.agent.initialized()
    }

    /// Route a command. Errors are reported before any stream is opened.
    pub async fn handle(&self, command: AgentCommand) -> Result<SessionReply, SessionError> {
        if let Some(action) = command.action.as_deref() {
            if !command.is_stop() {
                debug!(action, "ignoring unknown action");
            }
        }

        match command.route()? {
            Route::Stop => Ok(SessionReply::Stopped {
                message: self.stop_auto(),
            }),
            Route::Chat { message } => {
                let agent = self.agent().await?;
                Ok(SessionReply::Stream(self.spawn_chat(agent, message)))
            }
            Route::Auto => {
                let agent = self.agent().await?;
                Ok(SessionReply::Stream(self.spawn_auto(agent)))
            }
        }
    }

    /// Cancel the active auto loop, if any. Always succeeds.
    pub fn stop_auto(&self) -> String {
        if self.slot.stop() {
            info!("auto mode stop requested");
        } else {
            debug!("stop requested with no auto loop running");
        }
        STOP_CONFIRMATION.to_string()
    }

    /// The agent handle, created on first use.
    ///
    /// A failed initialization is not memoized; the next call retries.
    pub async fn agent(&self) -> Result<Arc<dyn Agent>, SessionError> {
        let agent = self
            .agent
            .get_or_try_init(|| async {
                let agent = self.factory.create().await.inspect_err(|e| {
                    warn!(error = %e, "agent initialization failed");
                })?;
                info!(tools = agent.tools().len(), "agent initialized");
                Ok::<_, SessionError>(agent)
            })
            .await?;
        Ok(Arc::clone(agent))
    }

    fn spawn_chat(&self, agent: Arc<dyn Agent>, message: String) -> LineStream {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        let thread_id = self.settings.thread_id.clone();

        tokio::spawn(async move {
            match pump_turn(agent.as_ref(), &thread_id, &message, &tx, None).await {
                TurnEnd::Completed => debug!("chat turn complete"),
                TurnEnd::Failed(e) => {
                    error!(error = %e, "chat turn failed");
                    let _ = tx.send(error_line(&e.to_string())).await;
                }
                TurnEnd::Disconnected => debug!("chat client disconnected"),
                TurnEnd::Cancelled => {}
            }
        });

        ReceiverStream::new(rx)
    }

    fn spawn_auto(&self, agent: Arc<dyn Agent>) -> LineStream {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        let (controller, previous) = self.slot.install();

        if let Some(prev) = previous {
            info!(replaced = %prev.run_id(), "auto mode restarted, previous loop cancelled");
        }
        info!(run_id = %controller.run_id(), "auto mode started");

        let slot = Arc::clone(&self.slot);
        let settings = self.settings.clone();

        tokio::spawn(async move {
            run_auto_loop(agent.as_ref(), &settings, &controller, &tx).await;
            slot.release(controller.generation());
            drop(tx);
        });

        ReceiverStream::new(rx)
    }
}

/// The unattended loop: turn, separator, interruptible pause, repeat.
async fn run_auto_loop(
    agent: &dyn Agent,
    settings: &SessionSettings,
    controller: &AutoLoopController,
    tx: &LineSender,
) {
    let token = controller.token();
    let run_id = controller.run_id();
    let mut turns: u64 = 0;

    loop {
        if token.is_cancelled() {
            break;
        }

        match pump_turn(
            agent,
            &settings.thread_id,
            &settings.auto_prompt,
            tx,
            Some(token),
        )
        .await
        {
            TurnEnd::Completed => turns += 1,
            TurnEnd::Cancelled => break,
            TurnEnd::Failed(e) => {
                error!(%run_id, error = %e, "auto turn failed");
                let _ = tx.send(error_line(&e.to_string())).await;
                return;
            }
            TurnEnd::Disconnected => {
                info!(%run_id, turns, "auto mode client disconnected");
                return;
            }
        }

        if tx.send(format!("{TURN_SEPARATOR}\n")).await.is_err() {
            info!(%run_id, turns, "auto mode client disconnected");
            return;
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tx.closed() => {
                info!(%run_id, turns, "auto mode client disconnected");
                return;
            }
            _ = tokio::time::sleep(settings.auto_interval) => {}
        }
    }

    info!(%run_id, turns, "auto mode stopped");
    let _ = tx.send(format!("{AUTO_STOPPED_LINE}\n")).await;
}

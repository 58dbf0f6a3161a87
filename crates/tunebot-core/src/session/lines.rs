//! Pumping agent output into a response line channel.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use tunebot_types::error::AgentError;

use crate::agent::Agent;

/// Writer half of a streamed response. Each item is one newline-terminated line.
pub type LineSender = mpsc::Sender<String>;

/// How a single turn ended.
#[derive(Debug)]
pub enum TurnEnd {
    /// The agent produced its last unit.
    Completed,
    /// The cancellation token fired before the turn finished.
    Cancelled,
    /// The agent call failed.
    Failed(AgentError),
    /// The response body was dropped by the client.
    Disconnected,
}

/// Run one turn and forward every output unit as a line, in order.
///
/// The wait for each unit is raced against `cancel` (when given) and against
/// the client dropping the response body.
pub async fn pump_turn(
    agent: &dyn Agent,
    thread_id: &str,
    message: &str,
    tx: &LineSender,
    cancel: Option<&CancellationToken>,
) -> TurnEnd {
    let mut units = agent.stream_turn(thread_id, message);

    loop {
        let next = tokio::select! {
            biased;
            _ = cancelled(cancel) => return TurnEnd::Cancelled,
            _ = tx.closed() => return TurnEnd::Disconnected,
            next = units.next() => next,
        };

        match next {
            None => return TurnEnd::Completed,
            Some(Ok(unit)) => {
                debug!(source = %unit.source, len = unit.text.len(), "output unit");
                if tx.send(unit.to_line()).await.is_err() {
                    return TurnEnd::Disconnected;
                }
            }
            Some(Err(e)) => return TurnEnd::Failed(e),
        }
    }
}

async fn cancelled(cancel: Option<&CancellationToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

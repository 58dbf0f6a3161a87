//! Client lifecycle: what the user may do and where received chunks go.

use thiserror::Error;

use super::Transcript;

/// What the client is currently waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientState {
    #[default]
    Idle,
    /// A chat request is in flight.
    Sending,
    /// An auto stream is open.
    AutoRunning,
}

/// Which response stream a chunk or outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Chat,
    Auto,
}

impl StreamKind {
    fn active_state(self) -> ClientState {
        match self {
            StreamKind::Chat => ClientState::Sending,
            StreamKind::Auto => ClientState::AutoRunning,
        }
    }
}

/// Why a user action was refused locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientRejection {
    #[error("message is empty")]
    EmptyInput,
    #[error("a request is already in progress")]
    Busy,
}

/// Transcript plus lifecycle state and the error banner.
#[derive(Debug, Clone, Default)]
pub struct ClientModel {
    transcript: Transcript,
    state: ClientState,
    error: Option<String>,
}

impl ClientModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    /// The persistent error banner, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a chat turn. Returns the message to send.
    pub fn begin_chat(&mut self, input: &str) -> Result<String, ClientRejection> {
        if input.trim().is_empty() {
            return Err(ClientRejection::EmptyInput);
        }
        if self.state != ClientState::Idle {
            return Err(ClientRejection::Busy);
        }
        self.state = ClientState::Sending;
        self.error = None;
        self.transcript.push_user(input);
        Ok(input.to_string())
    }

    /// Start auto mode. The transcript is cleared.
    pub fn begin_auto(&mut self) -> Result<(), ClientRejection> {
        if self.state != ClientState::Idle {
            return Err(ClientRejection::Busy);
        }
        self.state = ClientState::AutoRunning;
        self.error = None;
        self.transcript.clear();
        Ok(())
    }

    /// Append one received chunk. Chat chunks carry the agent marker; auto
    /// chunks, including the tail of a stream that outlives a stop, are raw.
    pub fn receive(&mut self, kind: StreamKind, chunk: &str) {
        match kind {
            StreamKind::Chat => self.transcript.push_agent(chunk),
            StreamKind::Auto => self.transcript.push_raw(chunk),
        }
    }

    /// A stream closed normally.
    pub fn finish(&mut self, kind: StreamKind) {
        self.settle(kind);
    }

    /// A request failed before or during streaming.
    pub fn fail(&mut self, kind: StreamKind, message: &str) {
        self.error = Some(format!("Error: {message}"));
        self.settle(kind);
    }

    /// The server acknowledged a stop request.
    pub fn stop_succeeded(&mut self, message: &str) {
        self.transcript.push_system(message);
        self.settle(StreamKind::Auto);
    }

    /// The stop request failed. The client still leaves auto mode.
    pub fn stop_failed(&mut self, message: &str) {
        self.error = Some(format!("Error stopping auto mode: {message}"));
        self.settle(StreamKind::Auto);
    }

    /// Return to idle if `kind` is what the client is waiting on.
    fn settle(&mut self, kind: StreamKind) {
        if self.state == kind.active_state() {
            self.state = ClientState::Idle;
        }
    }
}

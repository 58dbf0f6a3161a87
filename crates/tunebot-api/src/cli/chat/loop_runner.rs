//! Interactive client loop.
//!
//! Chat turns are awaited inline, so input is blocked while a request is in
//! flight. Auto mode runs in a background task that prints through the
//! readline `SharedWriter`, leaving the prompt free for `/stop`.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::StreamExt;
use tracing::debug;

use tunebot_core::transcript::{ClientModel, ClientState, StreamKind};
use tunebot_types::command::AgentCommand;

use crate::cli::client::AgentClient;

use super::banner::welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

/// Client model and renderer shared between the input loop and the auto task.
pub struct ClientSession {
    model: Mutex<ClientModel>,
    renderer: ChatRenderer,
}

impl ClientSession {
    pub fn new() -> Self {
        Self {
            model: Mutex::new(ClientModel::new()),
            renderer: ChatRenderer::new(),
        }
    }

    pub fn model(&self) -> MutexGuard<'_, ClientModel> {
        self.model.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn renderer(&self) -> &ChatRenderer {
        &self.renderer
    }

    /// Render the newest transcript entry.
    fn render_last(&self) -> String {
        let model = self.model();
        model
            .transcript()
            .last()
            .map(|entry| self.renderer.render(entry))
            .unwrap_or_default()
    }

    /// Render the error banner, if set.
    fn render_error(&self) -> String {
        self.model()
            .error()
            .map(|e| self.renderer.render_error(e))
            .unwrap_or_default()
    }

    fn render_transcript(&self) -> String {
        let model = self.model();
        model
            .transcript()
            .entries()
            .iter()
            .map(|entry| self.renderer.render(entry))
            .collect()
    }
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Send one chat message and print the response as it streams in.
pub async fn send_chat<W: Write>(
    client: &AgentClient,
    session: &ClientSession,
    out: &mut W,
    text: &str,
) {
    let message = match session.model().begin_chat(text) {
        Ok(message) => message,
        Err(e) => {
            let _ = write!(out, "{}", session.renderer().render_note(&e.to_string()));
            return;
        }
    };
    let _ = write!(out, "{}", session.render_last());

    let mut stream = match client.open_stream(&AgentCommand::chat(message)).await {
        Ok(stream) => stream,
        Err(e) => {
            session.model().fail(StreamKind::Chat, &e.to_string());
            let _ = write!(out, "{}", session.render_error());
            return;
        }
    };

    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                session.model().receive(StreamKind::Chat, &chunk);
                let _ = write!(out, "{}", session.render_last());
            }
            Err(e) => {
                session.model().fail(StreamKind::Chat, &e.to_string());
                let _ = write!(out, "{}", session.render_error());
                return;
            }
        }
    }
    session.model().finish(StreamKind::Chat);
}

/// Follow an auto stream until the server closes it.
pub async fn follow_auto<W: Write>(client: &AgentClient, session: &ClientSession, out: &mut W) {
    let mut stream = match client.open_stream(&AgentCommand::auto()).await {
        Ok(stream) => stream,
        Err(e) => {
            session.model().fail(StreamKind::Auto, &e.to_string());
            let _ = write!(out, "{}", session.render_error());
            return;
        }
    };

    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                session.model().receive(StreamKind::Auto, &chunk);
                let _ = write!(out, "{}", session.render_last());
            }
            Err(e) => {
                session.model().fail(StreamKind::Auto, &e.to_string());
                let _ = write!(out, "{}", session.render_error());
                return;
            }
        }
    }
    session.model().finish(StreamKind::Auto);
    debug!("auto stream closed");
}

/// Send the stop action and record the outcome.
pub async fn stop_auto<W: Write>(client: &AgentClient, session: &ClientSession, out: &mut W) {
    match client.stop().await {
        Ok(message) => {
            session.model().stop_succeeded(&message);
            let _ = write!(out, "{}", session.render_last());
        }
        Err(e) => {
            session.model().stop_failed(&e.to_string());
            let _ = write!(out, "{}", session.render_error());
        }
    }
}

/// Run the interactive client against `client`'s server.
pub async fn run_chat_loop(client: AgentClient) -> anyhow::Result<()> {
    let session = Arc::new(ClientSession::new());

    print!("{}", welcome_banner(client.endpoint()));
    let _ = std::io::stdout().flush();

    let prompt = format!("  {} ", console::style("You >").green().bold());
    let (mut input, mut out) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match input.read_line().await {
            InputEvent::Eof => {
                let _ = write!(out, "{}", session.renderer().render_note("Session ended."));
                break;
            }
            InputEvent::Interrupted => {
                if session.model().state() == ClientState::AutoRunning {
                    stop_auto(&client, &session, &mut out).await;
                } else {
                    let _ = write!(
                        out,
                        "{}",
                        session
                            .renderer()
                            .render_note("Press Ctrl+D to exit, or keep chatting.")
                    );
                }
            }
            InputEvent::Line(text) => {
                if text.is_empty() {
                    continue;
                }

                let Some(cmd) = commands::parse(&text) else {
                    send_chat(&client, &session, &mut out, &text).await;
                    continue;
                };

                match cmd {
                    ChatCommand::Help => {
                        let _ = write!(out, "{}", commands::help_text());
                    }
                    ChatCommand::Clear => input.clear(),
                    ChatCommand::Exit => {
                        let _ = write!(out, "{}", session.renderer().render_note("Session ended."));
                        break;
                    }
                    ChatCommand::Auto => {
                        if let Err(e) = session.model().begin_auto() {
                            let _ = write!(out, "{}", session.renderer().render_note(&e.to_string()));
                            continue;
                        }
                        let _ = write!(
                            out,
                            "{}",
                            session
                                .renderer()
                                .render_note("Auto mode started. /stop or Ctrl+C to stop.")
                        );
                        let client = client.clone();
                        let session = Arc::clone(&session);
                        let mut writer = out.clone();
                        tokio::spawn(async move {
                            follow_auto(&client, &session, &mut writer).await;
                        });
                    }
                    ChatCommand::Stop => stop_auto(&client, &session, &mut out).await,
                    ChatCommand::History => {
                        let _ = write!(out, "{}", session.render_transcript());
                    }
                    ChatCommand::Unknown(name) => {
                        let _ = write!(
                            out,
                            "{}",
                            session.renderer().render_note(&format!(
                                "Unknown command: {name}. Type /help for available commands."
                            ))
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

//! Non-interactive client commands: one-shot chat, auto follow, and stop.

use std::io::Write;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::chat::loop_runner::{ClientSession, follow_auto, send_chat, stop_auto};
use crate::cli::client::AgentClient;

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Send a single chat message and print the streamed reply.
pub async fn run_one_shot(client: &AgentClient, message: &str, quiet: bool) -> anyhow::Result<()> {
    let session = ClientSession::new();
    let mut stdout = std::io::stdout();
    let mut out = SpinnerWriter {
        inner: &mut stdout,
        spinner: (!quiet).then(|| spinner("thinking...")),
    };
    send_chat(client, &session, &mut out, message).await;
    out.clear_spinner();

    match session.model().error() {
        Some(err) => anyhow::bail!("{err}"),
        None => Ok(()),
    }
}

/// Start auto mode and print its output until the stream closes.
///
/// The first Ctrl+C sends the stop action; output continues until the
/// server ends the stream.
pub async fn run_auto(client: &AgentClient, quiet: bool) -> anyhow::Result<()> {
    let session = ClientSession::new();
    session.model().begin_auto()?;

    let mut stdout = std::io::stdout();
    let mut out = SpinnerWriter {
        inner: &mut stdout,
        spinner: (!quiet).then(|| spinner("starting auto mode...")),
    };

    {
        let follow = follow_auto(client, &session, &mut out);
        tokio::pin!(follow);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut stop_sent = false;

        loop {
            tokio::select! {
                _ = &mut follow => break,
                _ = &mut ctrl_c, if !stop_sent => {
                    stop_sent = true;
                    stop_auto(client, &session, &mut std::io::stderr()).await;
                }
            }
        }
    }
    out.clear_spinner();

    match session.model().error() {
        Some(err) => anyhow::bail!("{err}"),
        None => Ok(()),
    }
}

/// Stop a running auto loop.
pub async fn run_stop(client: &AgentClient) -> anyhow::Result<()> {
    let session = ClientSession::new();
    stop_auto(client, &session, &mut std::io::stdout()).await;

    match session.model().error() {
        Some(err) => anyhow::bail!("{err}"),
        None => Ok(()),
    }
}

/// Writer that clears a progress spinner before the first write.
struct SpinnerWriter<'a, W: Write> {
    inner: &'a mut W,
    spinner: Option<ProgressBar>,
}

impl<W: Write> SpinnerWriter<'_, W> {
    fn clear_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

impl<W: Write> Write for SpinnerWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.clear_spinner();
        let n = self.inner.write(buf)?;
        self.inner.flush()?;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

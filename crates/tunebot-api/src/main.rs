//! tunebot entry point.
//!
//! Binary name: `tunebot`
//!
//! Parses CLI arguments, loads `.env`, initializes tracing, then either
//! starts the HTTP server or runs one of the terminal client commands.

mod cli;
mod http;
mod state;

use std::sync::Arc;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use cli::client::AgentClient;
use state::AppState;
use tunebot_core::session::manager::SessionManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; variables may come from the shell.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn,tunebot=info",
        1 => "info,tunebot=debug",
        _ => "trace",
    };
    let otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    tunebot_observe::tracing_setup::init_tracing(filter, otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    match &dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => tracing::debug!("no .env file found"),
        Err(e) => tracing::warn!(error = %e, "failed to load .env"),
    }

    let result = run(cli).await;
    tunebot_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "tunebot", &mut std::io::stdout());
        }

        Commands::Serve { port, host, .. } => {
            let state = AppState::init(&cli.config).await;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            tracing::info!(
                %addr,
                model = %state.config.model,
                auto_interval_secs = state.config.auto_interval_secs,
                "server starting"
            );
            if !cli.quiet {
                println!(
                    "  {} tunebot listening on {}",
                    console::style("\u{266a}").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state.clone());

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal(Arc::clone(&state.sessions)))
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Chat { url, message } => {
            let client = AgentClient::new(&url)?;
            match message {
                Some(message) => cli::auto::run_one_shot(&client, &message, cli.quiet).await?,
                None => cli::chat::loop_runner::run_chat_loop(client).await?,
            }
        }

        Commands::Auto { url } => {
            let client = AgentClient::new(&url)?;
            cli::auto::run_auto(&client, cli.quiet).await?;
        }

        Commands::Stop { url } => {
            let client = AgentClient::new(&url)?;
            cli::auto::run_stop(&client).await?;
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
///
/// An open auto stream would keep its connection alive forever, so the loop
/// is stopped before connections are drained.
async fn shutdown_signal(sessions: Arc<SessionManager>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
    sessions.stop_auto();
}

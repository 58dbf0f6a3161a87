//! Axum router configuration with middleware.
//!
//! Routes: `POST /api/agent`, `GET /health`.
//! Middleware: CORS, request tracing.
//!
//! A built web client is served from `web/dist/` (configurable via
//! `TUNEBOT_WEB_DIR`) when that directory exists. API routes take priority;
//! unknown paths fall through to `index.html`.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Environment variable naming the static web client directory.
pub const WEB_DIR_VAR: &str = "TUNEBOT_WEB_DIR";
const DEFAULT_WEB_DIR: &str = "web/dist";

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/api/agent", post(handlers::agent::handle_agent))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let web_dir = std::env::var(WEB_DIR_VAR).unwrap_or_else(|_| DEFAULT_WEB_DIR.to_string());
    if std::path::Path::new(&web_dir).exists() {
        let index_path = format!("{web_dir}/index.html");
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "static web client serving enabled");
    }

    router
}

/// GET /health
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures_util::StreamExt;
    use serde_json::{Value, json};
    use tokio::time::timeout;

    use tunebot_core::agent::{Agent, UnitStream};
    use tunebot_core::session::manager::AgentFactory;
    use tunebot_types::agent::{OutputUnit, ToolDefinition};
    use tunebot_types::config::ServerConfig;
    use tunebot_types::error::{ConfigError, SessionError};

    use super::*;

    /// Agent that answers every turn with two units.
    struct EchoAgent;

    impl Agent for EchoAgent {
        fn stream_turn(&self, _thread_id: &str, message: &str) -> UnitStream {
            let units = vec![
                Ok(OutputUnit::agent(format!("echo: {message}"))),
                Ok(OutputUnit::tools("tool ran")),
            ];
            Box::pin(futures_util::stream::iter(units))
        }

        fn tools(&self) -> Vec<ToolDefinition> {
            Vec::new()
        }
    }

    struct TestFactory {
        missing: Vec<String>,
        calls: AtomicUsize,
    }

    impl AgentFactory for TestFactory {
        fn create(
            &self,
        ) -> Pin<Box<dyn Future<Output = Result<Arc<dyn Agent>, SessionError>> + Send + '_>>
        {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if self.missing.is_empty() {
                    Ok(Arc::new(EchoAgent) as Arc<dyn Agent>)
                } else {
                    Err(SessionError::Config(ConfigError::MissingVariables(
                        self.missing.clone(),
                    )))
                }
            })
        }
    }

    /// Serve the router on an ephemeral port and return the base URL.
    async fn spawn_server(missing: &[&str]) -> (String, Arc<TestFactory>) {
        let factory = Arc::new(TestFactory {
            missing: missing.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
        });
        let config = ServerConfig {
            auto_interval_secs: 3600,
            ..ServerConfig::default()
        };
        let state = AppState::with_factory(factory.clone(), config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        (format!("http://{addr}"), factory)
    }

    async fn post(base: &str, body: Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{base}/api/agent"))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (base, _) = spawn_server(&[]).await;
        let body: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_chat_streams_plain_text_lines() {
        let (base, _) = spawn_server(&[]).await;
        let resp = post(&base, json!({"mode": "chat", "message": "hi"})).await;

        assert_eq!(resp.status(), 200);
        assert!(
            resp.headers()["content-type"]
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );
        assert_eq!(resp.text().await.unwrap(), "echo: hi\ntool ran\n");
    }

    #[tokio::test]
    async fn test_stop_without_loop_is_idempotent() {
        let (base, factory) = spawn_server(&[]).await;
        for _ in 0..2 {
            let resp = post(&base, json!({"action": "stop"})).await;
            assert_eq!(resp.status(), 200);
            let body: Value = resp.json().await.unwrap();
            assert_eq!(body, json!({"message": "Auto mode stopped"}));
        }
        assert_eq!(factory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_mode_is_500() {
        let (base, _) = spawn_server(&[]).await;
        let resp = post(&base, json!({"mode": "party"})).await;
        assert_eq!(resp.status(), 500);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Invalid mode specified");
    }

    #[tokio::test]
    async fn test_non_string_mode_keeps_invalid_mode_message() {
        let (base, factory) = spawn_server(&[]).await;
        let resp = post(&base, json!({"mode": 123})).await;
        assert_eq!(resp.status(), 500);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Invalid mode specified");
        assert_eq!(factory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chat_without_message_is_500_not_stream() {
        let (base, factory) = spawn_server(&[]).await;
        let resp = post(&base, json!({"mode": "chat"})).await;
        assert_eq!(resp.status(), 500);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Message is required in chat mode");
        assert_eq!(factory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_configuration_lists_names() {
        let (base, _) = spawn_server(&["OPENAI_API_KEY", "CDP_API_KEY_PRIVATE_KEY"]).await;
        let resp = post(&base, json!({"mode": "chat", "message": "hi"})).await;
        assert_eq!(resp.status(), 500);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(
            body["error"],
            "Missing required environment variables: OPENAI_API_KEY, CDP_API_KEY_PRIVATE_KEY"
        );
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_shape() {
        let (base, _) = spawn_server(&[]).await;
        let resp = reqwest::Client::new()
            .post(format!("{base}/api/agent"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 500);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_auto_then_stop_ends_stream() {
        let (base, _) = spawn_server(&[]).await;
        let resp = post(&base, json!({"mode": "auto"})).await;
        assert_eq!(resp.status(), 200);

        let mut body = resp.bytes_stream();
        let mut received = String::new();
        while !received.contains("-------------------\n") {
            let chunk = timeout(Duration::from_secs(2), body.next())
                .await
                .unwrap()
                .unwrap()
                .unwrap();
            received.push_str(&String::from_utf8_lossy(&chunk));
        }

        let stop = post(&base, json!({"action": "stop"})).await;
        assert_eq!(stop.status(), 200);

        let rest = timeout(Duration::from_secs(2), async {
            let mut rest = String::new();
            while let Some(chunk) = body.next().await {
                rest.push_str(&String::from_utf8_lossy(&chunk.unwrap()));
            }
            rest
        })
        .await
        .expect("auto stream did not end after stop");

        received.push_str(&rest);
        assert!(received.starts_with("echo: Be creative"));
        assert!(received.ends_with("Auto mode stopped.\n"));
    }
}

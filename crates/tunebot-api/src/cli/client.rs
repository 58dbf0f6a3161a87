//! HTTP client for the agent endpoint.
//!
//! Streams are read as raw byte chunks and regrouped into transcript entries:
//! one per line, with fenced code blocks kept whole.

use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, bail};
use futures_util::{Stream, StreamExt};
use serde::Deserialize;

use tunebot_types::command::AgentCommand;

/// Received transcript entries: a single line, or a whole fenced code block,
/// without the trailing newline.
pub type ChunkStream = Pin<Box<dyn Stream<Item = anyhow::Result<String>> + Send>>;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct StopBody {
    message: String,
}

/// Client for `POST /api/agent`.
#[derive(Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AgentClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/agent", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, command: &AgentCommand) -> anyhow::Result<reqwest::Response> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(command)
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            bail!("HTTP error! status: {}: {message}", status.as_u16());
        }
        Ok(response)
    }

    /// Send a chat or auto command and return the response chunks.
    pub async fn open_stream(&self, command: &AgentCommand) -> anyhow::Result<ChunkStream> {
        let response = self.post(command).await?;
        let mut bytes = response.bytes_stream();

        Ok(Box::pin(async_stream::try_stream! {
            let mut buffer = LineBuffer::default();
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.context("stream interrupted")?;
                for entry in buffer.push(&chunk) {
                    yield entry;
                }
            }
            for entry in buffer.finish() {
                yield entry;
            }
        }))
    }

    /// Send the stop action and return the server's confirmation.
    pub async fn stop(&self) -> anyhow::Result<String> {
        let response = self.post(&AgentCommand::stop()).await?;
        let body: StopBody = response
            .json()
            .await
            .context("unexpected stop response")?;
        Ok(body.message)
    }
}

const FENCE: &str = "```";

/// Regroups arbitrary byte chunks into transcript entries.
///
/// Each complete line is one entry, except that the lines of a fenced code
/// block are held back and emitted together once the closing fence arrives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    fence: Option<Vec<String>>,
}

impl LineBuffer {
    /// Add bytes; returns the entries completed by them, without newlines.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut entries = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..pos]).into_owned();
            self.accept(line, &mut entries);
        }
        entries
    }

    /// Flush a trailing partial line and any unterminated code block.
    pub fn finish(&mut self) -> Vec<String> {
        let mut entries = Vec::new();
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.accept(String::from_utf8_lossy(&rest).into_owned(), &mut entries);
        }
        if let Some(block) = self.fence.take() {
            entries.push(block.join("\n"));
        }
        entries
    }

    fn accept(&mut self, line: String, entries: &mut Vec<String>) {
        let is_fence = line.trim_start().starts_with(FENCE);
        if let Some(block) = &mut self.fence {
            block.push(line);
            if is_fence {
                if let Some(block) = self.fence.take() {
                    entries.push(block.join("\n"));
                }
            }
        } else if is_fence {
            self.fence = Some(vec![line]);
        } else {
            entries.push(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffer_waits_for_newline() {
        let mut buf = LineBuffer::default();
        assert!(buf.push(b"hel").is_empty());
        assert_eq!(buf.push(b"lo\nwor"), vec!["hello"]);
        assert_eq!(buf.push(b"ld\n"), vec!["world"]);
        assert!(buf.finish().is_empty());
    }

    #[test]
    fn test_line_buffer_splits_lines_from_one_read() {
        let mut buf = LineBuffer::default();
        assert_eq!(
            buf.push(b"minted a song NFT\n-------------------\n"),
            vec!["minted a song NFT", "-------------------"]
        );
    }

    #[test]
    fn test_line_buffer_keeps_code_block_together() {
        let mut buf = LineBuffer::default();
        assert_eq!(buf.push(b"Try this:\n```js\ncon"), vec!["Try this:"]);
        assert!(buf.push(b"sole.log(1)\n").is_empty());
        assert_eq!(
            buf.push(b"```\nDone.\n"),
            vec!["```js\nconsole.log(1)\n```", "Done."]
        );
    }

    #[test]
    fn test_line_buffer_empty_line() {
        let mut buf = LineBuffer::default();
        assert_eq!(buf.push(b"\n"), vec![""]);
    }

    #[test]
    fn test_line_buffer_split_utf8() {
        let mut buf = LineBuffer::default();
        let bytes = "café\n".as_bytes();
        assert!(buf.push(&bytes[..4]).is_empty());
        assert_eq!(buf.push(&bytes[4..]), vec!["café"]);
    }

    #[test]
    fn test_line_buffer_flushes_partial_tail() {
        let mut buf = LineBuffer::default();
        buf.push(b"no newline");
        assert_eq!(buf.finish(), vec!["no newline"]);
    }

    #[test]
    fn test_line_buffer_flushes_unterminated_block() {
        let mut buf = LineBuffer::default();
        assert!(buf.push(b"```rust\nfn main() {}\n").is_empty());
        assert_eq!(buf.finish(), vec!["```rust\nfn main() {}"]);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = AgentClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3000/api/agent");
    }
}

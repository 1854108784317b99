//! HTTP transport for the streaming chat endpoint
//!
//! Every chat message is sent as an HTTP POST with a JSON body
//! `{"prompt": "..."}` and `Accept: text/event-stream`. A success status
//! hands the body to the caller as a [`ByteStream`]; anything else is
//! reported as [`ChataiError::Request`] without streaming.
//!
//! The `reqwest` client built by [`build_http_client`] keeps a cookie jar,
//! so a session cookie set by a login on the same client is sent with chat
//! requests.

use std::time::Duration;

use futures::StreamExt;
use serde::Serialize;

use crate::config::ServerConfig;
use crate::error::{ChataiError, Result};
use crate::transport::{ByteStream, ChatTransport};

/// Build the shared HTTP client
///
/// # Errors
///
/// Returns [`ChataiError::Http`] if the TLS backend cannot be initialised.
pub fn build_http_client(server: &ServerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(server.timeout_seconds))
        .cookie_store(true)
        .build()
        .map_err(ChataiError::Http)?;
    Ok(client)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
}

/// Streaming chat transport over HTTP
///
/// # Examples
///
/// ```no_run
/// use chatai::config::ServerConfig;
/// use chatai::transport::http::{build_http_client, HttpChatTransport};
///
/// # fn main() -> anyhow::Result<()> {
/// let server = ServerConfig::default();
/// let transport = HttpChatTransport::new(build_http_client(&server)?, &server);
/// assert!(transport.endpoint().ends_with("/chat/stream"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpChatTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpChatTransport {
    /// Create a transport posting to the configured chat endpoint
    pub fn new(client: reqwest::Client, server: &ServerConfig) -> Self {
        Self {
            client,
            endpoint: server.endpoint(&server.chat_path),
        }
    }

    /// Absolute URL of the chat endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ChatTransport for HttpChatTransport {
    async fn open_stream(&self, prompt: &str) -> Result<ByteStream> {
        tracing::debug!(endpoint = %self.endpoint, "Opening chat stream");

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&ChatRequest { prompt })
            .send()
            .await
            .map_err(|e| ChataiError::Transport(format!("chat request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Chat endpoint rejected request");
            return Err(ChataiError::Request {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let stream = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| anyhow::Error::from(ChataiError::Transport(e.to_string())))
        });
        Ok(Box::pin(stream))
    }
}

//! Chat transport abstraction and implementations
//!
//! A [`ChatTransport`] issues the chat request and hands back the response
//! body as an incremental byte source. Framing and decoding of that body are
//! the job of [`crate::stream`].
//!
//! - [`http::HttpChatTransport`] -- `POST` to the backend's streaming chat
//!   endpoint using `reqwest`.
//! - `fake::ScriptedTransport` -- in-process fake used in tests
//!   (cfg(test) only).

use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

use crate::error::Result;

/// Incremental response body: chunks in arrival order until exhausted
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Opens a streaming chat response for a prompt
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync + std::fmt::Debug {
    /// Send `prompt` and return the response body as a byte stream
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ChataiError::Request`] when the backend
    /// answers with a non-success status, or a transport error when the
    /// request cannot be sent. Both happen before any byte is streamed.
    async fn open_stream(&self, prompt: &str) -> Result<ByteStream>;
}

pub mod http;

#[cfg(test)]
pub mod fake;

//! Streaming response reader
//!
//! [`StreamingResponseReader`] pulls chunks from a response body one at a
//! time, frames them into records, and pushes each decoded fragment to a
//! [`Renderer`] in arrival order. Reading stops at the first of:
//!
//! 1. a record whose payload is the done sentinel (`[DONE]`),
//! 2. the natural end of the byte stream,
//! 3. a transport error, which is rendered inline and not propagated.
//!
//! Invalid UTF-8 does not stop the stream: bad bytes render as U+FFFD and a
//! single decode error is shown inline once the read is over.
//!
//! The reader never retries. Finalizing the session (re-enabling input) is
//! the caller's job, see [`crate::session::ChatSession`].

use std::fmt;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::config::StreamConfig;
use crate::error::ChataiError;
use crate::render::Renderer;
use crate::stream::framing::{Record, RecordFramer};

/// Which terminal condition ended a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The done sentinel was received
    Sentinel,
    /// The byte source was exhausted without a sentinel
    EndOfStream,
    /// The byte source failed; carries the error text
    TransportError(String),
}

/// Summary of one read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    /// How the stream ended
    pub termination: Termination,
    /// Number of fragments pushed to the renderer
    pub fragments: usize,
    /// Invalid UTF-8 sequences replaced while decoding
    pub decode_errors: usize,
}

impl StreamOutcome {
    /// Whether the stream ended without a transport error
    pub fn is_success(&self) -> bool {
        !matches!(self.termination, Termination::TransportError(_))
    }
}

/// Reads one chat response stream into a renderer
#[derive(Debug)]
pub struct StreamingResponseReader {
    framer: RecordFramer,
    sentinel: String,
    text: String,
    fragments: usize,
}

impl StreamingResponseReader {
    /// Create a reader for the configured record prefix and sentinel
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            framer: RecordFramer::new(config.record_prefix.clone()),
            sentinel: config.done_sentinel.clone(),
            text: String::new(),
            fragments: 0,
        }
    }

    /// Consume `stream` until a terminal condition, rendering as it goes
    ///
    /// Each chunk is awaited only after the previous one has been fully
    /// processed.
    ///
    /// # Examples
    ///
    /// ```
    /// use bytes::Bytes;
    /// use chatai::config::StreamConfig;
    /// use chatai::render::RecordingRenderer;
    /// use chatai::stream::{StreamingResponseReader, Termination};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
    ///     Ok(Bytes::from("data: Hel")),
    ///     Ok(Bytes::from("lo<|newline|>World\ndata: [DONE]\n")),
    /// ];
    /// let mut renderer = RecordingRenderer::new();
    /// let mut reader = StreamingResponseReader::new(&StreamConfig::default());
    /// let outcome = reader.read(futures::stream::iter(chunks), &mut renderer).await;
    ///
    /// assert_eq!(outcome.termination, Termination::Sentinel);
    /// assert_eq!(renderer.text(), "Hello\nWorld");
    /// # }
    /// ```
    pub async fn read<S, E, R>(&mut self, stream: S, renderer: &mut R) -> StreamOutcome
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: fmt::Display,
        R: Renderer + ?Sized,
    {
        futures::pin_mut!(stream);

        let termination = loop {
            match stream.next().await {
                Some(Ok(chunk)) => {
                    let records = self.framer.feed(&chunk);
                    if self.deliver(records, renderer) {
                        break Termination::Sentinel;
                    }
                }
                Some(Err(e)) => {
                    let message = e.to_string();
                    tracing::warn!(error = %message, "Chat stream interrupted");
                    renderer.error(&format!("Response interrupted: {}", message));
                    renderer.scroll_to_bottom();
                    break Termination::TransportError(message);
                }
                None => {
                    let tail = self.framer.finish();
                    if self.deliver(tail, renderer) {
                        break Termination::Sentinel;
                    }
                    break Termination::EndOfStream;
                }
            }
        };

        let decode_errors = self.framer.decode_errors();
        if decode_errors > 0 {
            let error = ChataiError::Decode(format!(
                "{} invalid UTF-8 sequence(s) in the response were replaced",
                decode_errors
            ));
            renderer.error(&error.to_string());
            renderer.scroll_to_bottom();
        }

        tracing::debug!(
            ?termination,
            fragments = self.fragments,
            "Chat stream finished"
        );

        StreamOutcome {
            termination,
            fragments: self.fragments,
            decode_errors,
        }
    }

    /// Raw text of every fragment delivered so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the reader and return the delivered text
    pub fn into_text(self) -> String {
        self.text
    }

    /// Render records in order; returns `true` once the sentinel is seen
    fn deliver<R>(&mut self, records: impl IntoIterator<Item = Record>, renderer: &mut R) -> bool
    where
        R: Renderer + ?Sized,
    {
        for record in records {
            if record.is_sentinel(&self.sentinel) {
                return true;
            }

            let fragment = record.text();
            if fragment.is_empty() {
                continue;
            }

            self.text.push_str(&fragment);
            self.fragments += 1;
            renderer.append(&fragment);
            renderer.scroll_to_bottom();
        }
        false
    }
}

//! Chat session: one send at a time, finalized on every path
//!
//! [`ChatSession::send`] runs the whole lifecycle of one user message:
//! show the prompt, disable input, open the stream, read it into the
//! renderer, then re-enable input and restore focus. At most one send is in
//! flight; a send attempted while another is active is a no-op.
//!
//! The in-flight flag is held through an [`InFlightGuard`] that clears it on
//! drop, so every exit path releases the slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::config::StreamConfig;
use crate::error::ChataiError;
use crate::render::Renderer;
use crate::stream::{StreamOutcome, StreamingResponseReader, Termination};
use crate::transport::ChatTransport;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The local user
    User,
    /// The AI backend
    Assistant,
    /// A synthetic error message
    Error,
}

/// One entry of the in-memory transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Author of the message
    pub role: Role,
    /// Message text
    pub content: String,
}

/// Result of a call to [`ChatSession::send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The prompt was blank; nothing happened
    Ignored,
    /// Another send is in flight; nothing happened
    Busy,
    /// The stream was read to a terminal condition
    Completed(StreamOutcome),
    /// The request failed before streaming; carries the message shown
    RequestFailed(String),
}

/// Holds the in-flight slot; releases it when dropped
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Interactive chat over a [`ChatTransport`]
#[derive(Debug)]
pub struct ChatSession<T: ChatTransport> {
    transport: T,
    stream_config: StreamConfig,
    in_flight: AtomicBool,
    transcript: Mutex<Vec<ChatMessage>>,
}

impl<T: ChatTransport> ChatSession<T> {
    /// Create a session over `transport`
    pub fn new(transport: T, stream_config: StreamConfig) -> Self {
        Self {
            transport,
            stream_config,
            in_flight: AtomicBool::new(false),
            transcript: Mutex::new(Vec::new()),
        }
    }

    /// Whether a send is currently in flight
    pub fn is_active(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the in-flight slot, or `None` if it is taken
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                flag: &self.in_flight,
            })
    }

    /// Copy of the transcript of the current chat
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    /// Send `prompt` and stream the reply into `renderer`
    ///
    /// Errors are rendered, never returned: a non-success status becomes a
    /// single error message, a mid-stream failure an inline indicator. In
    /// every case that gets past the busy check, input is re-enabled and
    /// focused exactly once before returning.
    pub async fn send<R>(&self, prompt: &str, renderer: &mut R) -> SendOutcome
    where
        R: Renderer + ?Sized,
    {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return SendOutcome::Ignored;
        }

        let Some(_guard) = self.try_begin() else {
            tracing::debug!("Send ignored: a response is still streaming");
            return SendOutcome::Busy;
        };

        renderer.user_message(prompt);
        renderer.scroll_to_bottom();
        self.record(Role::User, prompt);

        renderer.set_input_enabled(false);
        renderer.begin_response();

        let outcome = match self.transport.open_stream(prompt).await {
            Ok(stream) => {
                let mut reader = StreamingResponseReader::new(&self.stream_config);
                let outcome = reader.read(stream, renderer).await;
                if let Termination::TransportError(message) = &outcome.termination {
                    self.record(Role::Error, message);
                }
                let text = reader.into_text();
                if !text.is_empty() {
                    self.record(Role::Assistant, &text);
                }
                SendOutcome::Completed(outcome)
            }
            Err(e) => {
                let message = request_error_message(&e);
                tracing::warn!(error = %e, "Chat request failed");
                renderer.error(&message);
                renderer.scroll_to_bottom();
                self.record(Role::Error, &message);
                SendOutcome::RequestFailed(message)
            }
        };

        renderer.end_response();
        renderer.set_input_enabled(true);
        renderer.focus_input();

        outcome
    }

    /// Start over: clear the transcript and the display, re-enable input
    pub fn new_chat<R>(&self, renderer: &mut R)
    where
        R: Renderer + ?Sized,
    {
        if let Ok(mut transcript) = self.transcript.lock() {
            transcript.clear();
        }
        renderer.clear();
        renderer.welcome();
        renderer.set_input_enabled(true);
        renderer.focus_input();
    }

    fn record(&self, role: Role, content: &str) {
        if let Ok(mut transcript) = self.transcript.lock() {
            transcript.push(ChatMessage {
                role,
                content: content.to_string(),
            });
        }
    }
}

/// User-facing text for a request that failed before streaming
fn request_error_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<ChataiError>() {
        Some(ChataiError::Request { status, .. }) => {
            format!("Request failed (HTTP {}). Please try again.", status)
        }
        _ => format!("Could not reach the chat service: {}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RecordingRenderer, RenderEvent};
    use crate::transport::fake::{ScriptedChunk, ScriptedTransport};
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn session(transport: ScriptedTransport) -> ChatSession<ScriptedTransport> {
        ChatSession::new(transport, StreamConfig::default())
    }

    fn assert_finalized_once(renderer: &RecordingRenderer) {
        assert_eq!(renderer.count(&RenderEvent::InputEnabled(true)), 1);
        assert_eq!(renderer.count(&RenderEvent::Focus), 1);
        assert!(renderer.input_enabled);
        assert_eq!(
            renderer.events.last(),
            Some(&RenderEvent::Focus),
            "focus must be the final step"
        );
    }

    #[tokio::test]
    async fn test_send_streams_and_finalizes() {
        let chat = session(ScriptedTransport::with_chunks(&[
            "data: Hel",
            "lo<|newline|>World\n",
            "data: [DONE]\n",
        ]));
        let mut renderer = RecordingRenderer::new();

        let outcome = chat.send("  hi  ", &mut renderer).await;

        match outcome {
            SendOutcome::Completed(o) => assert_eq!(o.termination, Termination::Sentinel),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(renderer.text(), "Hello\nWorld");
        assert_eq!(renderer.events[0], RenderEvent::User("hi".to_string()));
        assert_finalized_once(&renderer);
        assert!(!chat.is_active());
        assert_eq!(
            *chat.transport.prompts.lock().unwrap(),
            vec!["hi".to_string()]
        );
    }

    #[tokio::test]
    async fn test_input_disabled_while_streaming() {
        let chat = session(ScriptedTransport::with_chunks(&["data: x\n"]));
        let mut renderer = RecordingRenderer::new();
        chat.send("hi", &mut renderer).await;

        let disabled = renderer
            .events
            .iter()
            .position(|e| *e == RenderEvent::InputEnabled(false))
            .unwrap();
        let first_append = renderer
            .events
            .iter()
            .position(|e| matches!(e, RenderEvent::Append(_)))
            .unwrap();
        assert!(disabled < first_append);
    }

    #[tokio::test]
    async fn test_end_of_stream_finalizes() {
        let chat = session(ScriptedTransport::with_chunks(&["data: only\n"]));
        let mut renderer = RecordingRenderer::new();

        let outcome = chat.send("hi", &mut renderer).await;
        assert!(matches!(
            outcome,
            SendOutcome::Completed(StreamOutcome {
                termination: Termination::EndOfStream,
                ..
            })
        ));
        assert_finalized_once(&renderer);
    }

    #[tokio::test]
    async fn test_transport_error_finalizes_exactly_once() {
        let chat = session(ScriptedTransport::with_script(vec![
            ScriptedChunk::Data(b"data: partial\n".to_vec()),
            ScriptedChunk::Fail("reset by peer".to_string()),
        ]));
        let mut renderer = RecordingRenderer::new();

        let outcome = chat.send("hi", &mut renderer).await;

        assert!(matches!(
            outcome,
            SendOutcome::Completed(StreamOutcome {
                termination: Termination::TransportError(_),
                ..
            })
        ));
        assert_eq!(renderer.errors().len(), 1);
        assert_finalized_once(&renderer);
        assert!(!chat.is_active());
    }

    #[tokio::test]
    async fn test_request_error_reported_once() {
        let chat = session(ScriptedTransport::rejecting(503));
        let mut renderer = RecordingRenderer::new();

        let outcome = chat.send("hi", &mut renderer).await;

        assert_eq!(
            outcome,
            SendOutcome::RequestFailed("Request failed (HTTP 503). Please try again.".to_string())
        );
        assert_eq!(renderer.errors().len(), 1);
        assert_eq!(renderer.text(), "");
        assert_finalized_once(&renderer);

        let transcript = chat.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].role, Role::Error);
    }

    #[tokio::test]
    async fn test_overlapping_send_is_busy() {
        let gate = Arc::new(Notify::new());
        let chat = session(ScriptedTransport::with_script(vec![
            ScriptedChunk::Data(b"data: first\n".to_vec()),
            ScriptedChunk::Gate(gate.clone()),
            ScriptedChunk::Data(b"data: [DONE]\n".to_vec()),
        ]));
        let mut first_renderer = RecordingRenderer::new();
        let mut second_renderer = RecordingRenderer::new();

        let (first, second) = tokio::join!(
            chat.send("one", &mut first_renderer),
            async {
                assert!(chat.is_active());
                let outcome = chat.send("two", &mut second_renderer).await;
                gate.notify_one();
                outcome
            }
        );

        assert_eq!(second, SendOutcome::Busy);
        assert!(second_renderer.events.is_empty());
        assert!(matches!(
            first,
            SendOutcome::Completed(StreamOutcome {
                termination: Termination::Sentinel,
                ..
            })
        ));
        assert_eq!(first_renderer.text(), "first");
        assert_finalized_once(&first_renderer);
        assert_eq!(chat.transport.requests(), 1);
        assert_eq!(
            *chat.transport.prompts.lock().unwrap(),
            vec!["one".to_string()]
        );
        assert!(!chat.is_active());
    }

    #[tokio::test]
    async fn test_send_while_active_is_noop() {
        let chat = session(ScriptedTransport::with_chunks(&["data: x\n"]));
        let mut renderer = RecordingRenderer::new();

        let guard = chat.try_begin().unwrap();
        assert!(chat.is_active());

        let outcome = chat.send("hi", &mut renderer).await;
        assert_eq!(outcome, SendOutcome::Busy);
        assert!(renderer.events.is_empty());
        assert_eq!(chat.transport.requests(), 0);

        drop(guard);
        assert!(!chat.is_active());
        assert!(matches!(
            chat.send("hi", &mut renderer).await,
            SendOutcome::Completed(_)
        ));
    }

    #[tokio::test]
    async fn test_blank_prompt_ignored() {
        let chat = session(ScriptedTransport::with_chunks(&[]));
        let mut renderer = RecordingRenderer::new();

        assert_eq!(chat.send("   ", &mut renderer).await, SendOutcome::Ignored);
        assert!(renderer.events.is_empty());
        assert_eq!(chat.transport.requests(), 0);
    }

    #[tokio::test]
    async fn test_transcript_records_exchange() {
        let chat = session(ScriptedTransport::with_chunks(&[
            "data: a\\nb\n",
            "data: [DONE]\n",
        ]));
        let mut renderer = RecordingRenderer::new();
        chat.send("question", &mut renderer).await;

        assert_eq!(
            chat.transcript(),
            vec![
                ChatMessage {
                    role: Role::User,
                    content: "question".to_string()
                },
                ChatMessage {
                    role: Role::Assistant,
                    content: "a\nb".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_new_chat_clears_and_reenables() {
        let chat = session(ScriptedTransport::with_chunks(&["data: x\n"]));
        let mut renderer = RecordingRenderer::new();
        chat.send("hi", &mut renderer).await;

        let mut fresh = RecordingRenderer::new();
        chat.new_chat(&mut fresh);

        assert!(chat.transcript().is_empty());
        assert_eq!(
            fresh.events,
            vec![
                RenderEvent::Clear,
                RenderEvent::Welcome,
                RenderEvent::InputEnabled(true),
                RenderEvent::Focus,
            ]
        );
    }

    #[test]
    fn test_request_error_message_for_other_errors() {
        let err = anyhow::Error::from(ChataiError::Transport("refused".to_string()));
        let message = request_error_message(&err);
        assert!(message.starts_with("Could not reach the chat service"));
        assert!(message.contains("refused"));
    }
}

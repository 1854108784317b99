//! chatai - terminal chat client library
//!
//! This library provides a chat client for an HTTP backend that streams AI
//! responses as `data:` records over `text/event-stream`.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `stream`: Record framing, payload unescaping, and the streaming reader
//! - `transport`: Transport abstraction and the HTTP implementation
//! - `render`: Renderer trait, formatters, and the terminal renderer
//! - `session`: One-at-a-time send lifecycle and the in-memory transcript
//! - `auth`: Login/registration forms and client
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use chatai::config::Config;
//! use chatai::render::RecordingRenderer;
//! use chatai::session::ChatSession;
//! use chatai::transport::http::{build_http_client, HttpChatTransport};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let http = build_http_client(&config.server)?;
//!     let session = ChatSession::new(
//!         HttpChatTransport::new(http, &config.server),
//!         config.stream.clone(),
//!     );
//!     let mut renderer = RecordingRenderer::new();
//!     session.send("Hello", &mut renderer).await;
//!     println!("{}", renderer.text());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod session;
pub mod stream;
pub mod transport;

// Re-export commonly used types
pub use config::Config;
pub use error::{ChataiError, Result};
pub use render::{RecordingRenderer, Renderer, TerminalRenderer};
pub use session::{ChatSession, SendOutcome};
pub use stream::{StreamOutcome, StreamingResponseReader, Termination};

//! Chat response stream handling
//!
//! The backend answers a chat request with a `text/event-stream` body made
//! of newline-terminated `data: <payload>` records. This module turns the raw
//! byte chunks of that body into decoded text fragments:
//!
//! - [`framing::RecordFramer`] reassembles records that straddle chunk
//!   boundaries (including split UTF-8 sequences).
//! - [`escape::unescape_payload`] decodes the in-band newline escapes.
//! - [`reader::StreamingResponseReader`] drives the sequential pull loop and
//!   pushes fragments to a [`crate::render::Renderer`].

pub mod escape;
pub mod framing;
pub mod reader;

pub use escape::{unescape_payload, NEWLINE_TOKEN};
pub use framing::{Record, RecordFramer};
pub use reader::{StreamOutcome, StreamingResponseReader, Termination};

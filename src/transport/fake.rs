//! In-process fake transport for tests

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::Notify;

use crate::error::{ChataiError, Result};
use crate::transport::{ByteStream, ChatTransport};

/// One scripted response element
#[derive(Debug, Clone)]
pub enum ScriptedChunk {
    /// A body chunk delivered as-is
    Data(Vec<u8>),
    /// A mid-stream transport failure
    Fail(String),
    /// Hold the stream open until the handle is notified
    Gate(Arc<Notify>),
}

/// Transport that replays a fixed script and records prompts
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    chunks: Vec<ScriptedChunk>,
    reject_status: Option<u16>,
    /// Prompts passed to `open_stream`, in order
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    /// Replay text chunks
    pub fn with_chunks(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks
                .iter()
                .map(|c| ScriptedChunk::Data(c.as_bytes().to_vec()))
                .collect(),
            ..Default::default()
        }
    }

    /// Replay an arbitrary script
    pub fn with_script(chunks: Vec<ScriptedChunk>) -> Self {
        Self {
            chunks,
            ..Default::default()
        }
    }

    /// Reject every request with `status`
    pub fn rejecting(status: u16) -> Self {
        Self {
            reject_status: Some(status),
            ..Default::default()
        }
    }

    /// Number of requests opened
    pub fn requests(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl ChatTransport for ScriptedTransport {
    async fn open_stream(&self, prompt: &str) -> Result<ByteStream> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if let Some(status) = self.reject_status {
            return Err(ChataiError::Request {
                status,
                body: String::new(),
            }
            .into());
        }

        let stream = futures::stream::iter(self.chunks.clone()).then(|chunk| async move {
            match chunk {
                ScriptedChunk::Data(bytes) => Ok(Bytes::from(bytes)),
                ScriptedChunk::Fail(msg) => Err(ChataiError::Transport(msg).into()),
                ScriptedChunk::Gate(gate) => {
                    gate.notified().await;
                    Ok(Bytes::new())
                }
            }
        });
        Ok(Box::pin(stream))
    }
}

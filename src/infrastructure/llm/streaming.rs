//! Server-Sent Events parsing for chat-completions streams
//!
//! Each event is a block of lines terminated by a blank line. Its `data:`
//! lines hold one JSON chunk whose `choices[0].delta.content` is the next
//! piece of text. The literal payload `[DONE]` ends the stream.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tracing::{debug, warn};

use super::errors::LlmApiError;
use super::types::ChatCompletionChunk;

/// Byte stream type accepted by the parser
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// What one SSE event block contained
#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    /// Text delta
    Text(String),
    /// `[DONE]` sentinel
    Done,
    /// Nothing to yield (comments, role-only or empty deltas)
    Skip,
}

/// Parser turning a chat-completions SSE byte stream into text deltas
pub struct SseStreamParser {
    inner: ByteStream,
    buffer: Vec<u8>,
    finished: bool,
}

impl SseStreamParser {
    /// Create a new SSE parser from a byte stream
    pub fn new(stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(stream),
            buffer: Vec::new(),
            finished: false,
        }
    }

    /// Take the next complete event block out of the buffer
    fn next_block(&mut self) -> Option<String> {
        let end = self.buffer.windows(2).position(|w| w == b"\n\n")?;
        let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
        Some(String::from_utf8_lossy(&block[..end]).into_owned())
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        // CRLF framing is normalized to LF; JSON payloads escape their own CRs
        self.buffer.extend(bytes.iter().copied().filter(|b| *b != b'\r'));
    }
}

/// Parse one event block
fn parse_block(block: &str) -> Result<SseEvent, LlmApiError> {
    let data: Vec<&str> = block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();

    if data.is_empty() {
        return Ok(SseEvent::Skip);
    }

    let payload = data.join("\n");
    let payload = payload.trim();

    if payload == "[DONE]" {
        return Ok(SseEvent::Done);
    }
    if payload.is_empty() {
        return Ok(SseEvent::Skip);
    }

    let chunk: ChatCompletionChunk = serde_json::from_str(payload).map_err(|err| {
        warn!(error = %err, data = payload, "failed to parse SSE event");
        LlmApiError::JsonError(err)
    })?;

    if let Some(error) = chunk.error {
        return Err(LlmApiError::StreamError(error.message));
    }

    Ok(match chunk.delta_text() {
        Some(text) if !text.is_empty() => SseEvent::Text(text.to_string()),
        _ => SseEvent::Skip,
    })
}

impl Stream for SseStreamParser {
    type Item = Result<String, LlmApiError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if self.finished {
                return Poll::Ready(None);
            }

            if let Some(block) = self.next_block() {
                match parse_block(&block) {
                    Ok(SseEvent::Text(text)) => return Poll::Ready(Some(Ok(text))),
                    Ok(SseEvent::Done) => {
                        debug!("stream completed");
                        self.finished = true;
                        return Poll::Ready(None);
                    }
                    Ok(SseEvent::Skip) => continue,
                    Err(err) => return Poll::Ready(Some(Err(err))),
                }
            }

            match self.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => self.push_bytes(&bytes),
                Poll::Ready(Some(Err(err))) => {
                    self.finished = true;
                    return Poll::Ready(Some(Err(LlmApiError::from(err))));
                }
                Poll::Ready(None) => {
                    // Flush a final event that lacked its blank-line terminator
                    self.finished = true;
                    let rest = String::from_utf8_lossy(&self.buffer).into_owned();
                    self.buffer.clear();
                    if rest.trim().is_empty() {
                        return Poll::Ready(None);
                    }
                    return match parse_block(&rest) {
                        Ok(SseEvent::Text(text)) => Poll::Ready(Some(Ok(text))),
                        Ok(_) => Poll::Ready(None),
                        Err(err) => Poll::Ready(Some(Err(err))),
                    };
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

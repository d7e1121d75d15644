//! Streaming response events
//!
//! Events produced while a chat completion streams back from a provider.
//! The request-shaping layer treats these as opaque cargo: it forwards them
//! in the order and cardinality the provider produced them.

use futures::Stream;
use std::pin::Pin;

/// A single event from a streaming LLM response
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Text content delta
    Text(String),
    /// Reasoning/thinking content delta (models with extended thinking)
    Reasoning(String),
    /// Tool call delta
    ToolCall {
        index: usize,
        id: Option<String>,
        name: Option<String>,
        arguments: String,
    },
    /// Usage info (sent at end of stream)
    Usage {
        input: u64,
        output: u64,
        reasoning: Option<u64>,
    },
    /// Transport or API failure surfaced mid-stream
    Error(String),
    /// Stream finished
    Done,
}

/// Lazy, single-pass sequence of response events
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

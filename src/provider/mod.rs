//! LLM Provider layer
//!
//! OpenAI-compatible provider that handles streaming chat completions,
//! plus the per-provider request metadata (default headers) the rest of
//! the runtime injects through the agent layer.

mod client;
mod config;
mod defaults;

pub use client::*;
pub use config::*;
pub use defaults::*;

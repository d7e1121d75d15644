//! Agent core - owns the streaming call function
//!
//! An agent holds exactly one mutable collaborator: the function used to
//! start a streaming model call. Setup-time decoration may swap that
//! function for a wrapper; when nothing needs injecting the original
//! reference is kept, so callers can detect "no wrapping" by identity.

use crate::config::Config;
use crate::events::EventStream;
use crate::options::CallOptions;
use crate::provider::{ProviderClient, ProviderError};
use async_openai::types::{ChatCompletionRequestMessage, ChatCompletionTool};
use std::sync::Arc;

use super::extra_params::apply_extra_params_to_agent;

/// Conversation state for one model call: messages plus tool definitions
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    pub messages: Vec<ChatCompletionRequestMessage>,
    pub tools: Vec<ChatCompletionTool>,
}

/// Streaming call function: `(model, context, options)` to event stream
pub type StreamFn =
    Arc<dyn Fn(&str, ChatContext, Option<CallOptions>) -> EventStream + Send + Sync>;

/// The runtime object that owns the streaming call function
#[derive(Clone)]
pub struct Agent {
    /// Agent name (used in logs)
    pub name: String,
    /// Streaming call function; replaced in place when decoration applies
    pub stream_fn: StreamFn,
}

impl Agent {
    /// Create an agent around an existing stream function
    pub fn new(name: impl Into<String>, stream_fn: StreamFn) -> Self {
        Self {
            name: name.into(),
            stream_fn,
        }
    }

    /// Create an agent whose stream function calls the provider client
    pub fn from_provider(name: impl Into<String>, provider: Arc<ProviderClient>) -> Self {
        let stream_fn: StreamFn =
            Arc::new(move |model, context, options| provider.stream_chat(model, context, options));
        Self::new(name, stream_fn)
    }

    /// Create an agent from runtime configuration
    ///
    /// Wires the provider client and applies provider default headers and
    /// config-supplied extra parameters to the stream function.
    pub fn from_config(name: impl Into<String>, config: &Config) -> Result<Self, ProviderError> {
        let provider_config = config.llm.provider_config();
        let client = ProviderClient::new(provider_config)?;
        let mut agent = Self::from_provider(name, Arc::new(client));

        apply_extra_params_to_agent(
            &mut agent,
            config.llm.extra_params.as_ref(),
            config.llm.provider.as_str(),
            &config.llm.model,
        );

        Ok(agent)
    }

    /// Start a streaming call through the (possibly wrapped) stream function
    pub fn stream(
        &self,
        model: &str,
        context: ChatContext,
        options: Option<CallOptions>,
    ) -> EventStream {
        (self.stream_fn)(model, context, options)
    }
}

//! Per-call request options
//!
//! `CallOptions` is what a caller hands to an agent's stream function for one
//! invocation. The provider layer reads the transport knobs when building the
//! wire request; the `headers` map rides along verbatim. Injection layers only
//! fill fields the caller left unset.

use indexmap::IndexMap;

/// Ordered header-name to value mapping
pub type Headers = IndexMap<String, String>;

/// Options for a single streaming call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    /// Additional HTTP headers for this call
    pub headers: Option<Headers>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Maximum tokens for the response
    pub max_tokens: Option<u32>,
    /// Ask the server to cache the prompt (llama.cpp / LM Studio)
    pub cache_prompt: Option<bool>,
}

impl CallOptions {
    /// Set a single header, creating the map if needed
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    /// Look up a header value by name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()
            .and_then(|h| h.get(name))
            .map(String::as_str)
    }
}

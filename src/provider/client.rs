//! OpenAI-compatible provider client
//!
//! Issues streaming chat completions over raw HTTP/SSE so reasoning_content
//! (extended thinking) is captured. Per-call options carry extra headers and
//! body knobs; headers set there override the client's own wire defaults.

use super::ProviderConfig;
use crate::agent::ChatContext;
use crate::auth::AuthConfig;
use crate::events::{EventStream, StreamEvent};
use crate::options::CallOptions;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{env} not found in environment or auth.json for provider {provider}")]
    MissingApiKey { provider: String, env: String },
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("invalid header {0}")]
    InvalidHeader(String),
}

// Internal types for parsing streaming responses
#[derive(Debug, serde::Deserialize)]
struct StreamChunkDelta {
    content: Option<String>,
    reasoning_content: Option<String>,
    tool_calls: Option<Vec<StreamToolCallChunk>>,
    #[allow(dead_code)]
    role: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct StreamToolCallChunk {
    index: usize,
    id: Option<String>,
    function: Option<StreamFunctionChunk>,
}

#[derive(Debug, serde::Deserialize)]
struct StreamFunctionChunk {
    name: Option<String>,
    arguments: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct StreamChoice {
    delta: StreamChunkDelta,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct CompletionTokensDetails {
    reasoning_tokens: Option<u64>,
}

#[derive(Debug, serde::Deserialize)]
struct StreamUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    completion_tokens_details: Option<CompletionTokensDetails>,
}

#[derive(Debug, serde::Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
    usage: Option<StreamUsage>,
}

/// OpenAI-compatible client for streaming chat completions
#[derive(Clone)]
pub struct ProviderClient {
    config: ProviderConfig,
    http_client: reqwest::Client,
}

impl ProviderClient {
    /// Create a new provider client from config
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        // Don't keep connections alive; servers like llama.cpp treat a
        // closed connection as request cancellation
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Get the provider config
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Get API key from environment or auth.json
    fn api_key(&self) -> Result<String, ProviderError> {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        if let Ok(key) = std::env::var(&self.config.api_key_env) {
            return Ok(key);
        }

        if let Ok(auth) = AuthConfig::load() {
            if let Some(key) = auth.api_key(&self.config.id()) {
                return Ok(key.to_string());
            }
        }

        Err(ProviderError::MissingApiKey {
            provider: self.config.name.clone(),
            env: self.config.api_key_env.clone(),
        })
    }

    /// Start a streaming chat completion
    ///
    /// The request is driven by a background task; dropping the returned
    /// stream tears the call down. Must be called within a Tokio runtime.
    /// Failures surface as a `StreamEvent::Error` item followed by `Done`.
    pub fn stream_chat(
        &self,
        model: &str,
        context: ChatContext,
        options: Option<CallOptions>,
    ) -> EventStream {
        let client = self.clone();
        let model = model.to_string();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            if let Err(e) = client.run_stream(&model, context, options, &tx).await {
                let _ = tx.send(StreamEvent::Error(e.to_string()));
                let _ = tx.send(StreamEvent::Done);
            }
        });

        Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        }))
    }

    async fn run_stream(
        &self,
        model: &str,
        context: ChatContext,
        options: Option<CallOptions>,
        tx: &mpsc::UnboundedSender<StreamEvent>,
    ) -> Result<(), ProviderError> {
        let api_key = self.api_key()?;
        let options = options.unwrap_or_default();
        let body = build_request_body(model, &context, &options);
        let headers = wire_headers(&api_key, &options)?;

        tracing::debug!(
            target: "llm",
            provider = %self.config.id(),
            model = model,
            message_count = context.messages.len(),
            "Starting streaming chat completion"
        );

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.config.base_url))
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(target: "llm", status = %status, error = %body, "Chat completion returned error");
            return Err(ProviderError::Api { status, body });
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            // Process complete SSE lines
            while let Some(pos) = buffer.find('\n') {
                let line = buffer[..pos].trim().to_string();
                buffer = buffer[pos + 1..].to_string();

                if line.is_empty() || line.starts_with(':') {
                    continue;
                }

                let Some(data) = line.strip_prefix("data: ") else {
                    continue;
                };
                if data == "[DONE]" {
                    break;
                }

                if let Ok(chunk) = serde_json::from_str::<StreamChunk>(data) {
                    for event in chunk_events(chunk) {
                        if tx.send(event).is_err() {
                            // Consumer dropped the stream; stop reading
                            return Ok(());
                        }
                    }
                }
            }
        }

        let _ = tx.send(StreamEvent::Done);
        Ok(())
    }
}

/// Build the JSON request body from the context and per-call options
fn build_request_body(
    model: &str,
    context: &ChatContext,
    options: &CallOptions,
) -> serde_json::Value {
    let mut body = serde_json::json!({
        "model": model,
        "messages": context.messages,
        "stream": true,
        "stream_options": {"include_usage": true},
        // llama.cpp/LM Studio: enable prompt caching for faster responses
        "cache_prompt": options.cache_prompt.unwrap_or(true),
    });

    if !context.tools.is_empty() {
        body["tools"] = serde_json::json!(context.tools);
    }
    if let Some(temperature) = options.temperature {
        body["temperature"] = serde_json::json!(temperature);
    }
    if let Some(max_tokens) = options.max_tokens {
        body["max_tokens"] = serde_json::json!(max_tokens);
    }

    body
}

/// Build the wire headers: auth and content type first, then per-call
/// headers, which override on name collision
fn wire_headers(api_key: &str, options: &CallOptions) -> Result<HeaderMap, ProviderError> {
    let mut headers = HeaderMap::new();

    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| ProviderError::InvalidHeader(AUTHORIZATION.to_string()))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(extra) = &options.headers {
        for (name, value) in extra {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ProviderError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| ProviderError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value);
        }
    }

    Ok(headers)
}

/// Translate a parsed SSE chunk into stream events
fn chunk_events(chunk: StreamChunk) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    if let Some(usage) = &chunk.usage {
        let reasoning = usage
            .completion_tokens_details
            .as_ref()
            .and_then(|d| d.reasoning_tokens);
        events.push(StreamEvent::Usage {
            input: usage.prompt_tokens,
            output: usage.completion_tokens,
            reasoning,
        });
    }

    for choice in chunk.choices {
        if let Some(reasoning) = choice.delta.reasoning_content {
            if !reasoning.is_empty() {
                events.push(StreamEvent::Reasoning(reasoning));
            }
        }
        if let Some(content) = choice.delta.content {
            if !content.is_empty() {
                events.push(StreamEvent::Text(content));
            }
        }
        if let Some(tool_calls) = choice.delta.tool_calls {
            for tc in tool_calls {
                events.push(StreamEvent::ToolCall {
                    index: tc.index,
                    id: tc.id,
                    name: tc.function.as_ref().and_then(|f| f.name.clone()),
                    arguments: tc
                        .function
                        .as_ref()
                        .and_then(|f| f.arguments.clone())
                        .unwrap_or_default(),
                });
            }
        }
    }

    events
}

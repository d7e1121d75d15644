//! Extra request parameters and provider default headers
//!
//! Some providers want identifying metadata on every request, and deployments
//! can pin extra request-shaping values in configuration. Rather than teach
//! every call site those quirks, the agent's stream function is wrapped once
//! at setup time. The wrapper fills gaps in the per-call options and then
//! delegates; it never overrides a value the caller set for that call, and it
//! forwards the delegate's event stream untouched.
//!
//! Precedence, most specific wins: per-call value > extra-params value >
//! provider default.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::options::{CallOptions, Headers};
use crate::provider::default_headers;

use super::base::{Agent, StreamFn};

/// Request-shaping values applied to every call of an agent
///
/// Usually supplied through configuration. Header entries override provider
/// defaults for the same name; all entries yield to per-call values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtraParams {
    /// Extra HTTP headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens for the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Ask the server to cache the prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_prompt: Option<bool>,
}

impl ExtraParams {
    /// True when no field would contribute anything to a call
    ///
    /// A present-but-empty value is treated the same as an absent one, so it
    /// never triggers wrapping on its own.
    pub fn is_empty(&self) -> bool {
        self.headers.as_ref().is_none_or(|h| h.is_empty())
            && self.temperature.is_none()
            && self.max_tokens.is_none()
            && self.cache_prompt.is_none()
    }
}

/// Outcome of deciding whether a stream function needs wrapping
pub enum Decoration {
    /// Nothing to inject; keep the existing function
    Unchanged,
    /// Replacement function carrying the injected values
    Wrapped(StreamFn),
}

/// Decide whether the stream function needs wrapping, and build the wrapper
///
/// Returns `Unchanged` when neither the provider rules nor the extra params
/// contribute anything, so callers keep the original function identity.
pub fn decorate_stream_fn(
    stream_fn: &StreamFn,
    extra_params: Option<&ExtraParams>,
    provider: &str,
    model: &str,
) -> Decoration {
    // Headers to inject when the caller left them unset: provider defaults,
    // overridden by extra-params headers for the same name
    let mut injected = default_headers(provider, model);
    if let Some(headers) = extra_params.and_then(|p| p.headers.as_ref()) {
        for (name, value) in headers {
            injected.insert(name.clone(), value.clone());
        }
    }

    // Non-header fields merge whole-field, caller wins
    let fill = extra_params
        .map(|p| ExtraParams {
            headers: None,
            ..p.clone()
        })
        .filter(|p| !p.is_empty());

    if injected.is_empty() && fill.is_none() {
        return Decoration::Unchanged;
    }

    tracing::debug!(
        provider = provider,
        model = model,
        injected_headers = injected.len(),
        "Wrapping stream function with request defaults"
    );

    let original = Arc::clone(stream_fn);
    let wrapped: StreamFn = Arc::new(move |model: &str, context, options| {
        let mut options = options.unwrap_or_default();

        if !injected.is_empty() {
            let headers = options.headers.get_or_insert_with(Headers::new);
            for (name, value) in &injected {
                if !headers.contains_key(name) {
                    headers.insert(name.clone(), value.clone());
                }
            }
        }

        if let Some(fill) = &fill {
            options.temperature = options.temperature.or(fill.temperature);
            options.max_tokens = options.max_tokens.or(fill.max_tokens);
            options.cache_prompt = options.cache_prompt.or(fill.cache_prompt);
        }

        (original)(model, context, Some(options))
    });

    Decoration::Wrapped(wrapped)
}

/// Apply provider defaults and extra params to an agent's stream function
///
/// Replaces `agent.stream_fn` in place when decoration applies; otherwise the
/// function reference is left untouched. Applying this twice stacks wrappers,
/// which is wasteful but harmless: each layer only fills unset values.
pub fn apply_extra_params_to_agent(
    agent: &mut Agent,
    extra_params: Option<&ExtraParams>,
    provider: &str,
    model: &str,
) {
    match decorate_stream_fn(&agent.stream_fn, extra_params, provider, model) {
        Decoration::Unchanged => {}
        Decoration::Wrapped(stream_fn) => agent.stream_fn = stream_fn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ChatContext;
    use crate::events::StreamEvent;
    use futures::StreamExt;
    use std::sync::Mutex;

    type Captured = Arc<Mutex<Vec<Option<CallOptions>>>>;

    /// Agent whose stream function records its options and replays `events`
    fn capturing_agent(captured: &Captured, events: Vec<StreamEvent>) -> Agent {
        let captured = Arc::clone(captured);
        let stream_fn: StreamFn = Arc::new(move |_model: &str, _context, options| {
            captured.lock().unwrap().push(options);
            let stream: crate::events::EventStream =
                Box::pin(futures::stream::iter(events.clone()));
            stream
        });
        Agent::new("test", stream_fn)
    }

    async fn consume(agent: &Agent, options: Option<CallOptions>) {
        let mut stream = agent.stream("gpt-4o", ChatContext::default(), options);
        while stream.next().await.is_some() {}
    }

    fn captured_headers(captured: &Captured, call: usize) -> Headers {
        captured.lock().unwrap()[call]
            .clone()
            .unwrap_or_default()
            .headers
            .unwrap_or_default()
    }

    fn text_events() -> Vec<StreamEvent> {
        vec![StreamEvent::Text("test".to_string()), StreamEvent::Done]
    }

    #[tokio::test]
    async fn test_adds_ide_headers_for_github_copilot() {
        let captured: Captured = Arc::default();
        let mut agent = capturing_agent(&captured, text_events());

        apply_extra_params_to_agent(&mut agent, None, "github-copilot", "gpt-4o");
        consume(&agent, Some(CallOptions::default())).await;

        assert_eq!(captured.lock().unwrap().len(), 1);
        let expected: Headers = [
            ("User-Agent", "GitHubCopilotChat/0.35.0"),
            ("Editor-Version", "vscode/1.107.0"),
            ("Editor-Plugin-Version", "copilot-chat/0.35.0"),
            ("Copilot-Integration-Id", "vscode-chat"),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
        assert_eq!(captured_headers(&captured, 0), expected);
    }

    #[tokio::test]
    async fn test_preserves_existing_headers_when_adding_copilot_headers() {
        let captured: Captured = Arc::default();
        let mut agent = capturing_agent(&captured, text_events());

        apply_extra_params_to_agent(&mut agent, None, "github-copilot", "gpt-4o");
        consume(
            &agent,
            Some(CallOptions::default().with_header("X-Custom", "value")),
        )
        .await;

        let headers = captured_headers(&captured, 0);
        assert_eq!(
            headers.get("User-Agent").map(String::as_str),
            Some("GitHubCopilotChat/0.35.0")
        );
        assert_eq!(headers.get("X-Custom").map(String::as_str), Some("value"));
        // All four defaults plus the custom header
        assert_eq!(headers.len(), 5);
    }

    #[tokio::test]
    async fn test_per_call_header_wins_over_default() {
        let captured: Captured = Arc::default();
        let mut agent = capturing_agent(&captured, text_events());

        apply_extra_params_to_agent(&mut agent, None, "github-copilot", "gpt-4o");
        consume(
            &agent,
            Some(CallOptions::default().with_header("User-Agent", "my-agent/1.0")),
        )
        .await;

        let headers = captured_headers(&captured, 0);
        assert_eq!(headers.get("User-Agent").map(String::as_str), Some("my-agent/1.0"));
        assert_eq!(
            headers.get("Editor-Version").map(String::as_str),
            Some("vscode/1.107.0")
        );
    }

    #[test]
    fn test_does_not_wrap_for_other_providers() {
        let captured: Captured = Arc::default();
        let mut agent = capturing_agent(&captured, text_events());
        let before = Arc::clone(&agent.stream_fn);

        apply_extra_params_to_agent(&mut agent, None, "anthropic", "claude-3-opus");

        // No extra params and no default rule: same function identity
        assert!(Arc::ptr_eq(&before, &agent.stream_fn));
    }

    #[test]
    fn test_empty_extra_params_do_not_wrap() {
        let captured: Captured = Arc::default();
        let mut agent = capturing_agent(&captured, text_events());
        let before = Arc::clone(&agent.stream_fn);

        let params = ExtraParams {
            headers: Some(Headers::new()),
            ..Default::default()
        };
        apply_extra_params_to_agent(&mut agent, Some(&params), "anthropic", "claude-3-opus");

        assert!(Arc::ptr_eq(&before, &agent.stream_fn));
    }

    #[test]
    fn test_decoration_outcomes() {
        let captured: Captured = Arc::default();
        let agent = capturing_agent(&captured, text_events());

        assert!(matches!(
            decorate_stream_fn(&agent.stream_fn, None, "anthropic", "claude-3-opus"),
            Decoration::Unchanged
        ));
        assert!(matches!(
            decorate_stream_fn(&agent.stream_fn, None, "github-copilot", "gpt-4o"),
            Decoration::Wrapped(_)
        ));
    }

    #[tokio::test]
    async fn test_adds_attribution_headers_for_openrouter() {
        let captured: Captured = Arc::default();
        let mut agent = capturing_agent(&captured, text_events());

        apply_extra_params_to_agent(&mut agent, None, "openrouter", "anthropic/claude-3-opus");
        consume(&agent, Some(CallOptions::default())).await;

        let headers = captured_headers(&captured, 0);
        assert_eq!(
            headers.get("HTTP-Referer").map(String::as_str),
            Some("https://openclaw.ai")
        );
        assert_eq!(headers.get("X-Title").map(String::as_str), Some("OpenClaw"));
    }

    #[tokio::test]
    async fn test_extra_params_beat_defaults_but_lose_to_per_call() {
        let captured: Captured = Arc::default();
        let mut agent = capturing_agent(&captured, text_events());

        let params = ExtraParams {
            headers: Some(
                [("HTTP-Referer".to_string(), "https://fork.example".to_string())]
                    .into_iter()
                    .collect(),
            ),
            ..Default::default()
        };
        apply_extra_params_to_agent(
            &mut agent,
            Some(&params),
            "openrouter",
            "anthropic/claude-3-opus",
        );

        // No per-call value: the extra-params header shadows the default
        consume(&agent, None).await;
        let headers = captured_headers(&captured, 0);
        assert_eq!(
            headers.get("HTTP-Referer").map(String::as_str),
            Some("https://fork.example")
        );
        assert_eq!(headers.get("X-Title").map(String::as_str), Some("OpenClaw"));

        // Per-call value: beats both injected layers
        consume(
            &agent,
            Some(CallOptions::default().with_header("HTTP-Referer", "https://call.example")),
        )
        .await;
        let headers = captured_headers(&captured, 1);
        assert_eq!(
            headers.get("HTTP-Referer").map(String::as_str),
            Some("https://call.example")
        );
    }

    #[tokio::test]
    async fn test_non_header_fields_fill_unset_options() {
        let captured: Captured = Arc::default();
        let mut agent = capturing_agent(&captured, text_events());

        let params = ExtraParams {
            temperature: Some(0.2),
            max_tokens: Some(512),
            ..Default::default()
        };
        // No default rule for this provider; the non-header fields alone
        // trigger wrapping
        apply_extra_params_to_agent(&mut agent, Some(&params), "anthropic", "claude-3-opus");

        consume(
            &agent,
            Some(CallOptions {
                temperature: Some(0.9),
                ..Default::default()
            }),
        )
        .await;

        let options = captured.lock().unwrap()[0].clone().unwrap();
        assert_eq!(options.temperature, Some(0.9));
        assert_eq!(options.max_tokens, Some(512));
        assert_eq!(options.headers, None);
    }

    #[tokio::test]
    async fn test_events_pass_through_unchanged() {
        let events = vec![
            StreamEvent::Text("one".to_string()),
            StreamEvent::Error("boom".to_string()),
            StreamEvent::Done,
        ];
        let captured: Captured = Arc::default();
        let mut agent = capturing_agent(&captured, events.clone());

        apply_extra_params_to_agent(&mut agent, None, "github-copilot", "gpt-4o");

        let observed: Vec<_> = agent
            .stream("gpt-4o", ChatContext::default(), None)
            .collect()
            .await;
        assert_eq!(observed, events);
    }

    #[tokio::test]
    async fn test_double_decoration_keeps_per_call_precedence() {
        let captured: Captured = Arc::default();
        let mut agent = capturing_agent(&captured, text_events());

        apply_extra_params_to_agent(&mut agent, None, "github-copilot", "gpt-4o");
        apply_extra_params_to_agent(&mut agent, None, "github-copilot", "gpt-4o");

        consume(
            &agent,
            Some(CallOptions::default().with_header("User-Agent", "my-agent/1.0")),
        )
        .await;

        let headers = captured_headers(&captured, 0);
        assert_eq!(headers.get("User-Agent").map(String::as_str), Some("my-agent/1.0"));
        assert_eq!(
            headers.get("Copilot-Integration-Id").map(String::as_str),
            Some("vscode-chat")
        );
    }
}

//! Claw Agent - embedded LLM agent runtime with provider-aware request shaping
//!
//! This crate provides:
//! - An `Agent` that owns a replaceable streaming call function
//! - Provider default headers and extra-parameter injection, applied by
//!   wrapping that function at setup time
//! - An OpenAI-compatible streaming provider client that honors the merged
//!   per-call options

pub mod auth;
pub mod config;
pub mod telemetry;

// Agent system
pub mod agent;
pub mod events;
pub mod options;
pub mod provider;

pub use auth::AuthConfig;
pub use config::{Config, LlmConfig, LlmProvider, TelemetryConfig};
pub use telemetry::{init_logging, Telemetry};

pub use agent::{
    apply_extra_params_to_agent, decorate_stream_fn, Agent, ChatContext, Decoration, ExtraParams,
    StreamFn,
};
pub use events::{EventStream, StreamEvent};
pub use options::{CallOptions, Headers};
pub use provider::{default_headers, ProviderClient, ProviderConfig, ProviderError};

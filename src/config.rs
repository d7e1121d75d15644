//! Configuration for the agent runtime

use crate::agent::ExtraParams;
use crate::auth::AuthConfig;
use crate::provider::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the runtime
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Telemetry settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider type (openrouter, openai, anthropic, github-copilot, custom)
    pub provider: LlmProvider,

    /// Base URL for the API (for custom endpoints like LM Studio)
    pub base_url: Option<String>,

    /// Model name/ID
    pub model: String,

    /// Request-shaping values applied to every call (headers, sampling knobs)
    #[serde(default)]
    pub extra_params: Option<ExtraParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub enum LlmProvider {
    #[default]
    OpenRouter,
    OpenAI,
    Anthropic,
    GitHubCopilot,
    /// Custom OpenAI-compatible endpoint (e.g., LM Studio, vLLM)
    Custom,
}

impl LlmProvider {
    /// Provider id used for default-header lookup
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenRouter => "openrouter",
            LlmProvider::OpenAI => "openai",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::GitHubCopilot => "github-copilot",
            LlmProvider::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Directory for log files; console-only logging when unset
    pub log_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenRouter,
            base_url: None,
            model: "anthropic/claude-sonnet-4".to_string(),
            extra_params: None,
        }
    }
}

impl LlmConfig {
    /// Resolve the provider config for this LLM configuration
    pub fn provider_config(&self) -> ProviderConfig {
        let mut config = match self.provider {
            LlmProvider::OpenRouter => ProviderConfig::openrouter(),
            LlmProvider::OpenAI => ProviderConfig::openai(),
            LlmProvider::Anthropic => ProviderConfig::anthropic(),
            LlmProvider::GitHubCopilot => ProviderConfig::github_copilot(),
            LlmProvider::Custom => ProviderConfig::custom(
                "Custom",
                self.base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:1234/v1".to_string()),
                "CLAW_API_KEY",
                &self.model,
            ),
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        config.default_model = self.model.clone();
        config
    }
}

impl Config {
    /// Create config for OpenRouter
    pub fn openrouter(model: &str) -> Self {
        Self {
            llm: LlmConfig {
                provider: LlmProvider::OpenRouter,
                model: model.to_string(),
                ..Default::default()
            },
            telemetry: TelemetryConfig::default(),
        }
    }

    /// Create config for the GitHub Copilot chat backend
    pub fn github_copilot(model: &str) -> Self {
        Self {
            llm: LlmConfig {
                provider: LlmProvider::GitHubCopilot,
                model: model.to_string(),
                ..Default::default()
            },
            telemetry: TelemetryConfig::default(),
        }
    }

    /// Set verbose logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.telemetry.verbose = verbose;
        self
    }

    /// Set per-call extra parameters
    pub fn with_extra_params(mut self, extra_params: ExtraParams) -> Self {
        self.llm.extra_params = Some(extra_params);
        self
    }

    /// Create config from a provider name in auth.json
    ///
    /// Looks up the provider in auth.json and uses its base_url when present.
    /// The model is specified separately.
    pub fn from_provider(provider: &str, model: &str) -> anyhow::Result<Self> {
        let auth = AuthConfig::load()?;

        let entry = auth
            .get(provider)
            .ok_or_else(|| anyhow::anyhow!("Provider '{}' not found in auth.json", provider))?;

        let llm_provider = if entry.base_url().is_some() {
            LlmProvider::Custom
        } else {
            match provider.to_lowercase().as_str() {
                "openrouter" => LlmProvider::OpenRouter,
                "openai" => LlmProvider::OpenAI,
                "anthropic" => LlmProvider::Anthropic,
                "github-copilot" => LlmProvider::GitHubCopilot,
                _ => LlmProvider::Custom,
            }
        };

        Ok(Self {
            llm: LlmConfig {
                provider: llm_provider,
                base_url: entry.base_url().map(String::from),
                model: model.to_string(),
                extra_params: None,
            },
            telemetry: TelemetryConfig::default(),
        })
    }

    /// List available providers from auth.json
    pub fn list_providers() -> anyhow::Result<Vec<String>> {
        let auth = AuthConfig::load()?;
        Ok(auth.providers().cloned().collect())
    }
}

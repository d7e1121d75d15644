//! Provider default request headers
//!
//! Some providers expect identifying metadata on every request: the Copilot
//! chat backend wants the editor-integration headers of the VS Code client it
//! was built for, and OpenRouter uses attribution headers for its app
//! rankings. The table is keyed by provider id; unknown providers get an
//! empty map, which is a valid outcome and not an error.

use crate::options::Headers;

/// IDE-integration headers the Copilot chat backend expects
const COPILOT_DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("User-Agent", "GitHubCopilotChat/0.35.0"),
    ("Editor-Version", "vscode/1.107.0"),
    ("Editor-Plugin-Version", "copilot-chat/0.35.0"),
    ("Copilot-Integration-Id", "vscode-chat"),
];

/// App attribution headers for OpenRouter
const OPENROUTER_DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("HTTP-Referer", "https://openclaw.ai"),
    ("X-Title", "OpenClaw"),
];

/// Resolve the default headers for a provider/model pair
///
/// The model id is accepted so a future rule can vary headers per model;
/// no current rule consults it.
pub fn default_headers(provider: &str, _model: &str) -> Headers {
    let table: &[(&str, &str)] = match provider {
        "github-copilot" => COPILOT_DEFAULT_HEADERS,
        "openrouter" => OPENROUTER_DEFAULT_HEADERS,
        _ => &[],
    };

    table
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

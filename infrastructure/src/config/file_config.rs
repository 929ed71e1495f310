//! Configuration file schema
//!
//! Shape of `relay.toml` / the global config file. Execution tuning lives
//! in the application layer's [`ExecutionParams`]; this file nests it under
//! `[execution]` and adds the backend connection section.

use relay_application::config::ExecutionParams;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// `[backend]` section: how to reach the chat-completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    pub endpoint: String,
    /// Name of the environment variable holding the API key. The key itself
    /// never appears in config files.
    pub api_key_env: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// Complete file configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub backend: BackendSection,
    pub execution: ExecutionParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_execution_params() {
        let config = FileConfig::default();
        assert_eq!(config.execution.routing_threshold, 0.7);
        assert_eq!(config.backend.model, DEFAULT_MODEL);
    }

    #[test]
    fn partial_toml_overrides_merge_with_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [backend]
            model = "gpt-4o-mini"

            [execution]
            tool_loop_max_iterations = 3
            "#,
        )
        .expect("parse");

        assert_eq!(config.backend.model, "gpt-4o-mini");
        assert_eq!(config.backend.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.execution.tool_loop_max_iterations, 3);
        assert_eq!(config.execution.routing_threshold, 0.7);
    }
}

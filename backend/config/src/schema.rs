//! streamchat configuration schema.
//!
//! Typed for serde YAML/JSON deserialization. Every field is optional in the
//! file; `defaults::apply_all_defaults` fills in what is missing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use streamchat_core::{ChatError, GenerationParameters};
use streamchat_endpoint::Framing;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for streamchat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamChatConfig {
    /// Inference endpoint connection
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Initial generation controls
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Suggested prompts shown by `/prompts`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<Vec<String>>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Sent as `Authorization: Bearer <token>` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framing: Option<Framing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
    /// Bound on a whole request including the streamed body. Unset = no bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl EndpointConfig {
    pub fn framing(&self) -> Framing {
        self.framing.unwrap_or_default()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.connect_timeout_secs
                .unwrap_or(crate::defaults::DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_new_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerationConfig {
    /// Validated parameters, falling back to the core defaults for unset fields.
    pub fn parameters(&self) -> Result<GenerationParameters, ChatError> {
        let defaults = GenerationParameters::default();
        GenerationParameters::new(
            self.max_new_tokens.unwrap_or(defaults.max_new_tokens()),
            self.temperature.unwrap_or(defaults.temperature()),
        )
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling log files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl StreamChatConfig {
    pub fn prompts(&self) -> &[String] {
        self.prompts.as_deref().unwrap_or_default()
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(crate::defaults::DEFAULT_LOG_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_yaml() {
        let yaml = r#"
endpoint:
  url: https://runtime.example.com/endpoints/falcon-7b/invocations
  framing: sse
  requestTimeoutSecs: 120
generation:
  maxNewTokens: 256
  temperature: 0.7
prompts:
  - what is life?
"#;
        let cfg: StreamChatConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.endpoint.framing(), Framing::Sse);
        assert_eq!(cfg.endpoint.request_timeout(), Some(Duration::from_secs(120)));
        assert_eq!(cfg.generation.parameters().unwrap().max_new_tokens(), 256);
        assert_eq!(cfg.prompts(), ["what is life?".to_string()]);
    }

    #[test]
    fn empty_generation_uses_core_defaults() {
        let params = GenerationConfig::default().parameters().unwrap();
        assert_eq!(params, GenerationParameters::default());
    }

    #[test]
    fn out_of_range_generation_is_rejected() {
        let generation = GenerationConfig {
            max_new_tokens: Some(4096),
            temperature: None,
        };
        assert!(generation.parameters().is_err());
    }
}

//! Config validation: schema checks with user-friendly error messages.

use crate::schema::StreamChatConfig;
use streamchat_core::{MAX_NEW_TOKENS_RANGE, TEMPERATURE_RANGE};
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// How strict to be about the endpoint section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRequirement {
    /// A URL must be configured (talking to a real endpoint).
    Required,
    /// No URL needed (offline echo mode, `config show`).
    Optional,
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &StreamChatConfig, endpoint: EndpointRequirement) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_endpoint(config, endpoint, &mut report);
    validate_generation(config, &mut report);
    validate_prompts(config, &mut report);
    report
}

fn validate_endpoint(
    config: &StreamChatConfig,
    requirement: EndpointRequirement,
    report: &mut ValidationReport,
) {
    let ep = &config.endpoint;
    match ep.url.as_deref().map(str::trim) {
        None | Some("") => {
            if requirement == EndpointRequirement::Required {
                report.error(
                    "endpoint.url",
                    "Endpoint URL is required; set it in the config or via STREAMCHAT_ENDPOINT_URL",
                );
            }
        }
        Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
            report.error("endpoint.url", format!("'{url}' must start with http:// or https://"));
        }
        Some(url) if url.starts_with("http://") && ep.api_token.is_some() => {
            report.warn("endpoint.url", "API token will be sent over plain http");
        }
        Some(_) => {}
    }

    if ep.connect_timeout_secs == Some(0) {
        report.error("endpoint.connectTimeoutSecs", "connectTimeoutSecs must be > 0");
    }
    if ep.request_timeout_secs == Some(0) {
        report.error("endpoint.requestTimeoutSecs", "requestTimeoutSecs must be > 0");
    }
}

fn validate_generation(config: &StreamChatConfig, report: &mut ValidationReport) {
    let generation = &config.generation;
    if let Some(tokens) = generation.max_new_tokens {
        if !MAX_NEW_TOKENS_RANGE.contains(&tokens) {
            report.error(
                "generation.maxNewTokens",
                format!(
                    "maxNewTokens must be between {} and {}",
                    MAX_NEW_TOKENS_RANGE.start(),
                    MAX_NEW_TOKENS_RANGE.end()
                ),
            );
        }
    }
    if let Some(temperature) = generation.temperature {
        if !TEMPERATURE_RANGE.contains(&temperature) {
            report.error(
                "generation.temperature",
                format!(
                    "temperature must be between {} and {}",
                    TEMPERATURE_RANGE.start(),
                    TEMPERATURE_RANGE.end()
                ),
            );
        }
    }
}

fn validate_prompts(config: &StreamChatConfig, report: &mut ValidationReport) {
    for (i, prompt) in config.prompts().iter().enumerate() {
        if prompt.trim().is_empty() {
            report.warn(format!("prompts[{i}]"), "Suggested prompt is empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_valid_offline() {
        let report = validate(&StreamChatConfig::default(), EndpointRequirement::Optional);
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn missing_url_is_error_when_required() {
        let report = validate(&StreamChatConfig::default(), EndpointRequirement::Required);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "endpoint.url");
    }

    #[test]
    fn bad_scheme_and_ranges_are_errors() {
        let mut cfg = StreamChatConfig::default();
        cfg.endpoint.url = Some("ftp://example".to_string());
        cfg.generation.max_new_tokens = Some(5);
        cfg.generation.temperature = Some(3.0);
        let report = validate(&cfg, EndpointRequirement::Optional);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["endpoint.url", "generation.maxNewTokens", "generation.temperature"]
        );
    }

    #[test]
    fn blank_prompt_is_warning() {
        let mut cfg = StreamChatConfig::default();
        cfg.endpoint.url = Some("https://ok".to_string());
        cfg.prompts = Some(vec!["fine".to_string(), "  ".to_string()]);
        let report = validate(&cfg, EndpointRequirement::Required);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "prompts[1]");
    }
}

//! Config defaults: applies sensible default values to parsed config.

use crate::io::config_dir;
use crate::schema::{LoggingConfig, StreamChatConfig};

/// Default endpoint connect timeout (seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default log level. Chat output goes to stdout, so keep stderr quiet.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Prompts suggested when the config does not list any.
pub const DEFAULT_PROMPTS: &[&str] = &[
    "what is SageMaker inference?",
    "provide the steps to make a pizza",
    "what is life?",
];

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: StreamChatConfig) -> StreamChatConfig {
    let config = apply_endpoint_defaults(config);
    let config = apply_generation_defaults(config);
    let config = apply_prompt_defaults(config);
    apply_logging_defaults(config)
}

fn apply_endpoint_defaults(mut config: StreamChatConfig) -> StreamChatConfig {
    let endpoint = &mut config.endpoint;
    endpoint.framing.get_or_insert_with(Default::default);
    endpoint
        .connect_timeout_secs
        .get_or_insert(DEFAULT_CONNECT_TIMEOUT_SECS);
    config
}

/// Fill unset generation controls. Values that are set but out of range are
/// left alone for validation to report.
fn apply_generation_defaults(mut config: StreamChatConfig) -> StreamChatConfig {
    let defaults = streamchat_core::GenerationParameters::default();
    let generation = &mut config.generation;
    generation
        .max_new_tokens
        .get_or_insert(defaults.max_new_tokens());
    generation.temperature.get_or_insert(defaults.temperature());
    config
}

fn apply_prompt_defaults(mut config: StreamChatConfig) -> StreamChatConfig {
    if config.prompts.is_none() {
        config.prompts = Some(DEFAULT_PROMPTS.iter().map(|p| p.to_string()).collect());
    }
    config
}

fn apply_logging_defaults(mut config: StreamChatConfig) -> StreamChatConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.dir.is_none() {
        logging.dir = Some(config_dir().join("logs").display().to_string());
    }
    config
}

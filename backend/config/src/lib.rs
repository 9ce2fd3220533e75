//! `streamchat-config`: streamchat configuration management.
//!
//! Provides:
//! - Typed config schema (endpoint, generation controls, prompts, logging)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution and `STREAMCHAT_*` overrides
//! - Default value application
//! - Validation with path-addressed errors and warnings
//! - Secret redaction for display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use redact::{redact, redacted_yaml};
pub use schema::{EndpointConfig, GenerationConfig, LoggingConfig, StreamChatConfig};
pub use validation::{validate, ConfigValidationError, EndpointRequirement, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load, substitute env vars, apply overrides and defaults, then validate.
///
/// This is the main entry point for loading a config at runtime. Validation
/// errors abort; warnings are logged.
pub async fn load_and_prepare(path: &Path, endpoint: EndpointRequirement) -> Result<StreamChatConfig> {
    let env: HashMap<String, String> = std::env::vars().collect();
    let raw_config = load_config(path).await?;
    prepare(raw_config, &env, endpoint)
}

/// The pure part of [`load_and_prepare`], with an explicit environment.
pub fn prepare(
    raw_config: StreamChatConfig,
    env: &HashMap<String, String>,
    endpoint: EndpointRequirement,
) -> Result<StreamChatConfig> {
    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;
    let config: StreamChatConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_env_overrides(config, env);
    let config = apply_all_defaults(config);

    let report = validate(&config, endpoint);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if let Some(first) = report.errors.first() {
        for error in &report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
        bail!("{first}");
    }

    Ok(config)
}

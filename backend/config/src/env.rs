//! Environment variable substitution and overrides for config values.
//!
//! Supports `${VAR_NAME}` syntax in string values, resolved at load time.
//! Only uppercase `[A-Z_][A-Z0-9_]*` variable names are matched.
//! `$${VAR}` escapes to a literal `${VAR}`.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{LoggingConfig, StreamChatConfig};

/// Matches `${VAR}` and its escaped form `$${VAR}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$)?\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Overrides the endpoint URL, like `endpoint_name` in a deployment env.
pub const ENV_ENDPOINT_URL: &str = "STREAMCHAT_ENDPOINT_URL";
/// Overrides the bearer token sent to the endpoint.
pub const ENV_API_TOKEN: &str = "STREAMCHAT_API_TOKEN";
/// Overrides the log level.
pub const ENV_LOG_LEVEL: &str = "STREAMCHAT_LOG";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config JSON value tree using the
/// process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in ENV_VAR_PATTERN.captures_iter(s) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&s[last..whole.start()]);
        last = whole.end();

        let var_name = &caps[2];
        if caps.get(1).is_some() {
            out.push_str(&format!("${{{var_name}}}"));
            continue;
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => out.push_str(val),
            _ => bail!(MissingEnvVarError {
                var_name: var_name.to_string(),
                config_path: path.to_string(),
            }),
        }
    }
    out.push_str(&s[last..]);
    Ok(out)
}

/// Check whether a string contains any env var references.
pub fn contains_env_var_reference(s: &str) -> bool {
    ENV_VAR_PATTERN
        .captures_iter(s)
        .any(|caps| caps.get(1).is_none())
}

/// Apply `STREAMCHAT_*` overrides from the given environment.
///
/// Overrides win over the file. Empty values are ignored.
pub fn apply_env_overrides(
    mut config: StreamChatConfig,
    env: &HashMap<String, String>,
) -> StreamChatConfig {
    let get = |key: &str| env.get(key).filter(|v| !v.is_empty()).cloned();

    if let Some(url) = get(ENV_ENDPOINT_URL) {
        config.endpoint.url = Some(url);
    }
    if let Some(token) = get(ENV_API_TOKEN) {
        config.endpoint.api_token = Some(token);
    }
    if let Some(level) = get(ENV_LOG_LEVEL) {
        config
            .logging
            .get_or_insert_with(LoggingConfig::default)
            .level = Some(level);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_inside_strings() {
        let v = json!({"endpoint": {"url": "https://${HOST}/endpoints/${NAME}/invocations"}});
        let env = env(&[("HOST", "runtime.example.com"), ("NAME", "falcon-7b")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(
            result["endpoint"]["url"],
            "https://runtime.example.com/endpoints/falcon-7b/invocations"
        );
    }

    #[test]
    fn error_names_var_and_path() {
        let v = json!({"endpoint": {"apiToken": "${MISSING_TOKEN}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("MISSING_TOKEN"));
        assert!(err.contains("endpoint.apiToken"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"prompts": ["echo $${HOME} please"]});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["prompts"][0], "echo ${HOME} please");
        assert!(!contains_env_var_reference("echo $${HOME}"));
        assert!(contains_env_var_reference("${HOME}"));
    }

    #[test]
    fn overrides_win_over_file() {
        let mut cfg = StreamChatConfig::default();
        cfg.endpoint.url = Some("http://file".to_string());
        let cfg = apply_env_overrides(
            cfg,
            &env(&[(ENV_ENDPOINT_URL, "http://env"), (ENV_API_TOKEN, ""), (ENV_LOG_LEVEL, "debug")]),
        );
        assert_eq!(cfg.endpoint.url.as_deref(), Some("http://env"));
        assert!(cfg.endpoint.api_token.is_none());
        assert_eq!(cfg.log_level(), "debug");
    }
}

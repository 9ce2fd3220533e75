//! Config redaction: produce safe-to-share config snapshots by masking secrets.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::schema::StreamChatConfig;

/// Keys whose string values are secrets.
static SECRET_KEYS: &[&str] = &[
    "apiToken",
    "api_token",
    "apiKey",
    "api_key",
    "token",
    "secret",
    "password",
    "authorization",
];

/// Redact a config JSON value, masking every sensitive string.
///
/// The resulting value is safe to log or print with `config show`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SECRET_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => {
            // First 4 chars are kept as a hint; short secrets are fully masked.
            let hint: String = if s.chars().count() > 8 {
                s.chars().take(4).collect()
            } else {
                String::new()
            };
            Value::String(format!("{hint}***"))
        }
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Render the config as YAML with secrets masked.
pub fn redacted_yaml(config: &StreamChatConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    serde_yaml::to_string(&redact(&value)).context("Failed to render config as YAML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_api_token_with_hint() {
        let v = json!({ "endpoint": { "apiToken": "hf_abcdefghijklmnop" } });
        let token = redact(&v)["endpoint"]["apiToken"].as_str().unwrap().to_string();
        assert_eq!(token, "hf_a***");
    }

    #[test]
    fn short_secret_fully_masked() {
        let v = json!({ "password": "hunter2" });
        assert_eq!(redact(&v)["password"], "***");
    }

    #[test]
    fn passthrough_non_sensitive() {
        let v = json!({ "endpoint": { "url": "https://x" }, "prompts": ["what is life?"] });
        assert_eq!(redact(&v), v);
    }

    #[test]
    fn yaml_never_contains_token() {
        let mut cfg = StreamChatConfig::default();
        cfg.endpoint.api_token = Some("supersecretvalue123".to_string());
        let yaml = redacted_yaml(&cfg).unwrap();
        assert!(!yaml.contains("supersecretvalue123"));
        assert!(yaml.contains("supe***"));
    }
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use streamchat_config::env::ENV_ENDPOINT_URL;
use streamchat_config::{
    config_dir, config_file_path, load_config, prepare, validate, EndpointRequirement,
    StreamChatConfig,
};
use streamchat_core::InferenceEndpoint;
use streamchat_endpoint::{EchoEndpoint, HttpEndpoint};

use crate::terminal_output::note_warn;
use crate::GlobalArgs;

/// Pause between echoed words, so streaming is visible offline.
const ECHO_DELAY: Duration = Duration::from_millis(40);

/// Config file path: `--config`, else the default location.
pub fn config_path(global: &GlobalArgs) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()))
}

/// Load the effective config and start logging with its settings.
///
/// `--endpoint` is applied as the highest-priority endpoint URL override.
pub async fn load(global: &GlobalArgs, requirement: EndpointRequirement) -> Result<StreamChatConfig> {
    let path = config_path(global);
    let raw = load_config(&path).await?;

    let mut env: HashMap<String, String> = std::env::vars().collect();
    if let Some(url) = &global.endpoint {
        env.insert(ENV_ENDPOINT_URL.to_string(), url.clone());
    }
    let config = prepare(raw, &env, requirement)
        .with_context(|| format!("Invalid configuration ({})", path.display()))?;

    logging::init_logger(log_dir(&config), config.log_level());
    debug!(path = %path.display(), level = config.log_level(), "Configuration loaded");

    // The subscriber was not up while the config was prepared.
    for warning in validate(&config, requirement).warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }

    Ok(config)
}

/// The configured log directory, created if missing. On failure the user is
/// warned and only console logging is installed.
fn log_dir(config: &StreamChatConfig) -> Option<&Path> {
    let dir = Path::new(config.logging.as_ref()?.dir.as_deref()?);
    match std::fs::create_dir_all(dir) {
        Ok(()) => Some(dir),
        Err(e) => {
            note_warn(&format!(
                "Cannot create log directory {}: {e}; file logging disabled",
                dir.display()
            ));
            None
        }
    }
}

/// Build the endpoint a session talks to.
pub fn build_endpoint(config: &StreamChatConfig, echo: bool) -> Result<Box<dyn InferenceEndpoint>> {
    if echo {
        return Ok(Box::new(EchoEndpoint::new().with_delay(ECHO_DELAY)));
    }

    let url = config.endpoint.url.as_deref().context(
        "No endpoint URL configured; set endpoint.url, STREAMCHAT_ENDPOINT_URL or --endpoint",
    )?;
    let mut endpoint = HttpEndpoint::new(url)
        .with_framing(config.endpoint.framing())
        .with_timeouts(config.endpoint.connect_timeout(), config.endpoint.request_timeout())?;
    if let Some(token) = &config.endpoint.api_token {
        endpoint = endpoint.with_api_token(token);
    }
    Ok(Box::new(endpoint))
}

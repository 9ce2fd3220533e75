//! One-shot submission: stream a single reply to stdout.

use anyhow::{Context, Result};

use streamchat_config::StreamChatConfig;
use streamchat_core::{ChatSession, InferenceEndpoint};

use crate::chat_cmd::submit_turn;

pub async fn run(
    config: &StreamChatConfig,
    endpoint: &dyn InferenceEndpoint,
    prompt: &str,
    max_new_tokens: Option<u32>,
    temperature: Option<f32>,
) -> Result<()> {
    let mut parameters = config.generation.parameters()?;
    if let Some(n) = max_new_tokens {
        parameters.set_max_new_tokens(n)?;
    }
    if let Some(t) = temperature {
        parameters.set_temperature(t)?;
    }

    let mut session = ChatSession::new(parameters);
    submit_turn(&mut session, endpoint, prompt)
        .await
        .context("Generation failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamchat_endpoint::EchoEndpoint;

    #[tokio::test]
    async fn rejects_out_of_range_overrides_before_sending() {
        let err = run(
            &StreamChatConfig::default(),
            &EchoEndpoint::new(),
            "what is life?",
            Some(5000),
            None,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("max_new_tokens"));
    }

    #[tokio::test]
    async fn empty_prompt_fails() {
        let err = run(&StreamChatConfig::default(), &EchoEndpoint::new(), "", None, None)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("empty"));
    }
}

use std::convert::Infallible;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use streamchat_core::{ChatError, EventStream, GenerationRequest, InferenceEndpoint};

use crate::framing::{frame_byte_stream, Framing};

/// Offline endpoint that streams the input back one word at a time.
///
/// The reply is encoded as JSON lines and goes through the same framing path
/// as a real HTTP body. At most `max_new_tokens` words are returned.
pub struct EchoEndpoint {
    delay: Duration,
}

impl EchoEndpoint {
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    /// Pause between fragments, to make progressive rendering visible.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for EchoEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_lines(request: &GenerationRequest) -> Vec<Vec<u8>> {
    let limit = request.parameters.max_new_tokens() as usize;
    request
        .inputs
        .split_inclusive(char::is_whitespace)
        .take(limit)
        .map(|word| {
            let mut line = serde_json::json!({ "outputs": [word] }).to_string().into_bytes();
            line.push(b'\n');
            line
        })
        .collect()
}

#[async_trait]
impl InferenceEndpoint for EchoEndpoint {
    fn name(&self) -> &str {
        "echo"
    }

    async fn invoke(&self, request: &GenerationRequest) -> Result<EventStream, ChatError> {
        let delay = self.delay;
        let body = futures::stream::iter(encode_lines(request)).then(move |line| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok::<_, Infallible>(line)
        });
        Ok(frame_byte_stream(body, Framing::JsonLines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamchat_core::{ChatSession, GenerationParameters};

    #[tokio::test]
    async fn test_echo_streams_words() {
        let mut session = ChatSession::default();
        let mut partials: Vec<String> = Vec::new();
        let turn = session
            .submit(&EchoEndpoint::new(), "what is life?", &mut |text: &str| {
                partials.push(text.to_string())
            })
            .await
            .unwrap();

        assert_eq!(turn.model_text, "what is life?");
        assert_eq!(partials, vec!["what ", "what is ", "what is life?"]);
    }

    #[test]
    fn test_echo_respects_token_limit() {
        let words = "w ".repeat(50);
        let request = GenerationRequest::new(words, GenerationParameters::new(10, 1.0).unwrap());
        assert_eq!(encode_lines(&request).len(), 10);
    }
}

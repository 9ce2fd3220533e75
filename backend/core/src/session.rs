//! Chat session: generation controls plus the append-only conversation history.

use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::consumer::StreamingResponseConsumer;
use crate::error::ChatError;
use crate::traits::{InferenceEndpoint, RenderSink};
use crate::types::{ConversationTurn, GenerationParameters, GenerationRequest};

/// Session-scoped state for one conversation.
///
/// Submissions take `&mut self`, so a second submission cannot start while a
/// stream is still being consumed.
#[derive(Debug)]
pub struct ChatSession {
    id: Uuid,
    parameters: GenerationParameters,
    history: Vec<ConversationTurn>,
}

impl ChatSession {
    pub fn new(parameters: GenerationParameters) -> Self {
        Self {
            id: Uuid::new_v4(),
            parameters,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn parameters(&self) -> GenerationParameters {
        self.parameters
    }

    pub fn set_max_new_tokens(&mut self, value: u32) -> Result<(), ChatError> {
        self.parameters.set_max_new_tokens(value)
    }

    pub fn set_temperature(&mut self, value: f32) -> Result<(), ChatError> {
        self.parameters.set_temperature(value)
    }

    /// Completed turns, oldest first.
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Drop every recorded turn. Generation controls are kept.
    pub fn clear(&mut self) {
        info!(session = %self.id, turns = self.history.len(), "Clearing conversation");
        self.history.clear();
    }

    /// Run one submission end to end.
    ///
    /// The sink sees every partial output as it streams in. The turn is only
    /// recorded if the endpoint stream ends without error; on error the sink
    /// keeps whatever it was last shown and the history is unchanged.
    pub async fn submit<E, S>(
        &mut self,
        endpoint: &E,
        input: &str,
        sink: &mut S,
    ) -> Result<&ConversationTurn, ChatError>
    where
        E: InferenceEndpoint + ?Sized,
        S: RenderSink + ?Sized,
    {
        if input.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        let request = GenerationRequest::new(input, self.parameters);
        let start = Instant::now();
        debug!(
            session = %self.id,
            endpoint = endpoint.name(),
            max_new_tokens = self.parameters.max_new_tokens(),
            temperature = self.parameters.temperature(),
            "Submitting request"
        );

        let events = endpoint.invoke(&request).await?;
        let output = match StreamingResponseConsumer::consume_stream(events, sink).await {
            Ok(output) => output,
            Err(e) => {
                warn!(session = %self.id, error = %e, "Stream aborted; turn discarded");
                return Err(e);
            }
        };

        info!(
            session = %self.id,
            chars = output.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Turn completed"
        );
        let index = self.history.len();
        self.history.push(ConversationTurn::new(input, output));
        Ok(&self.history[index])
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(GenerationParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::StreamEvent;
    use crate::traits::EventStream;
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::sync::Mutex;

    /// Replays canned event lists, one per invocation, and records requests.
    struct ScriptedEndpoint {
        scripts: Mutex<Vec<Vec<Result<StreamEvent, ChatError>>>>,
        requests: Mutex<Vec<serde_json::Value>>,
    }

    impl ScriptedEndpoint {
        fn new(mut scripts: Vec<Vec<Result<StreamEvent, ChatError>>>) -> Self {
            scripts.reverse();
            Self {
                scripts: Mutex::new(scripts),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InferenceEndpoint for ScriptedEndpoint {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn invoke(&self, request: &GenerationRequest) -> Result<EventStream, ChatError> {
            self.requests
                .lock()
                .unwrap()
                .push(serde_json::to_value(request).unwrap());
            let script = self.scripts.lock().unwrap().pop().unwrap_or_default();
            Ok(futures::stream::iter(script).boxed())
        }
    }

    fn chunk(delta: &str) -> Result<StreamEvent, ChatError> {
        Ok(StreamEvent::payload(
            serde_json::json!({ "outputs": [delta] }).to_string(),
        ))
    }

    #[tokio::test]
    async fn test_history_keeps_submission_order() {
        let endpoint = ScriptedEndpoint::new(vec![vec![chunk("first")], vec![chunk("second")]]);
        let mut session = ChatSession::default();

        session.submit(&endpoint, "A", &mut |_: &str| {}).await.unwrap();
        session.submit(&endpoint, "B", &mut |_: &str| {}).await.unwrap();

        let users: Vec<_> = session.history().iter().map(|t| t.user_text.as_str()).collect();
        let models: Vec<_> = session.history().iter().map(|t| t.model_text.as_str()).collect();
        assert_eq!(users, vec!["A", "B"]);
        assert_eq!(models, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_request_uses_current_parameters() {
        let endpoint = ScriptedEndpoint::new(vec![vec![chunk("ok")]]);
        let mut session = ChatSession::default();
        session.set_max_new_tokens(64).unwrap();
        session.set_temperature(1.5).unwrap();

        session.submit(&endpoint, "hi", &mut |_: &str| {}).await.unwrap();

        let sent = endpoint.requests.lock().unwrap()[0].clone();
        assert_eq!(sent["inputs"], "hi");
        assert_eq!(sent["parameters"]["max_new_tokens"], 64);
        assert_eq!(sent["parameters"]["temperature"], 1.5);
        assert_eq!(sent["parameters"]["return_full_text"], false);
    }

    #[tokio::test]
    async fn test_empty_stream_records_empty_turn() {
        let endpoint = ScriptedEndpoint::new(vec![vec![Ok(StreamEvent::empty())]]);
        let mut session = ChatSession::default();
        let turn = session.submit(&endpoint, "quiet", &mut |_: &str| {}).await.unwrap();
        assert_eq!(turn.model_text, "");
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_stream_is_not_recorded() {
        let endpoint = ScriptedEndpoint::new(vec![vec![
            chunk("half"),
            Ok(StreamEvent::payload("{}")),
        ]]);
        let mut session = ChatSession::default();
        let mut shown = String::new();
        let result = session
            .submit(&endpoint, "q", &mut |text: &str| shown = text.to_string())
            .await;

        assert!(matches!(result, Err(ChatError::MalformedChunk { .. })));
        assert_eq!(shown, "half");
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_rejected_before_invoke() {
        let endpoint = ScriptedEndpoint::new(vec![]);
        let mut session = ChatSession::default();
        let result = session.submit(&endpoint, "", &mut |_: &str| {}).await;
        assert!(matches!(result, Err(ChatError::EmptyInput)));
        assert!(endpoint.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_empties_history() {
        let endpoint = ScriptedEndpoint::new(vec![vec![chunk("x")]]);
        let mut session = ChatSession::default();
        session.submit(&endpoint, "a", &mut |_: &str| {}).await.unwrap();
        session.clear();
        assert!(session.history().is_empty());
        assert_eq!(session.parameters(), GenerationParameters::default());
    }
}

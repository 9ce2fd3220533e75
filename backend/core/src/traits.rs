use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::ChatError;
use crate::event::StreamEvent;
use crate::types::GenerationRequest;

/// Events of one streamed response, in arrival order.
///
/// An `Err` item means the transport failed; the stream is not polled again
/// after it.
pub type EventStream = BoxStream<'static, Result<StreamEvent, ChatError>>;

/// A remote inference endpoint that answers a request with a chunked stream.
#[async_trait]
pub trait InferenceEndpoint: Send + Sync {
    /// Endpoint name for logs (e.g., "http", "echo").
    fn name(&self) -> &str;

    /// Send the request and return the response as an event stream.
    async fn invoke(&self, request: &GenerationRequest) -> Result<EventStream, ChatError>;
}

/// Receives the complete output-so-far after every fragment.
pub trait RenderSink {
    fn on_partial(&mut self, text: &str);
}

impl<F> RenderSink for F
where
    F: FnMut(&str),
{
    fn on_partial(&mut self, text: &str) {
        self(text)
    }
}

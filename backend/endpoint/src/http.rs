use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::debug;

use streamchat_core::{ChatError, EventStream, GenerationRequest, InferenceEndpoint};

use crate::framing::{frame_byte_stream, Framing};

/// Default connect timeout for the endpoint.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Hosted inference endpoint reached over HTTP with a streamed response body.
pub struct HttpEndpoint {
    client: Client,
    url: String,
    api_token: Option<String>,
    framing: Framing,
}

impl HttpEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            api_token: None,
            framing: Framing::default(),
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Rebuild the HTTP client with the given timeouts. `request` bounds the
    /// whole exchange including the streamed body; `None` leaves it unbounded.
    pub fn with_timeouts(mut self, connect: Duration, request: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().connect_timeout(connect);
        if let Some(request) = request {
            builder = builder.timeout(request);
        }
        self.client = builder.build().context("Failed to build HTTP client")?;
        Ok(self)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }
}

#[async_trait]
impl InferenceEndpoint for HttpEndpoint {
    fn name(&self) -> &str {
        "http"
    }

    async fn invoke(&self, request: &GenerationRequest) -> Result<EventStream, ChatError> {
        debug!(url = %self.url, framing = %self.framing, "Invoking inference endpoint");

        let mut builder = self
            .client
            .post(&self.url)
            .header(ACCEPT, self.framing.accept())
            .json(request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ChatError::Transport(format!("request to {} failed: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        Ok(frame_byte_stream(response.bytes_stream(), self.framing))
    }
}

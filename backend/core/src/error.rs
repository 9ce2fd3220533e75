use thiserror::Error;

/// Top-level error type for a streamchat submission.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("event {index}: payload is not valid UTF-8: {source}")]
    Decode {
        index: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("event {index}: malformed chunk: {reason}")]
    MalformedChunk { index: usize, reason: String },

    #[error("input text is empty")]
    EmptyInput,

    #[error("invalid generation parameter: {0}")]
    InvalidParameter(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChatError {
    /// Whether this error was raised while decoding a chunk, as opposed to
    /// before the stream started or by the transport underneath it.
    pub fn is_chunk_error(&self) -> bool {
        matches!(self, ChatError::Decode { .. } | ChatError::MalformedChunk { .. })
    }
}

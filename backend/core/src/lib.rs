pub mod consumer;
pub mod error;
pub mod event;
pub mod session;
pub mod traits;
pub mod transcript;
pub mod types;

pub use consumer::StreamingResponseConsumer;
pub use error::ChatError;
pub use event::{decode_fragment, PayloadPart, StreamEvent};
pub use session::ChatSession;
pub use traits::{EventStream, InferenceEndpoint, RenderSink};
pub use types::{
    ConversationTurn, GenerationParameters, GenerationRequest, MAX_NEW_TOKENS_RANGE,
    TEMPERATURE_RANGE,
};

//! `streamchat-endpoint`: inference endpoint collaborators.
//!
//! Provides:
//! - `HttpEndpoint`: POSTs a generation request and streams the chunked body
//! - `EchoEndpoint`: offline endpoint for demos and tests
//! - response framing (`json-lines` / `sse`) into `StreamEvent`s

pub mod echo;
pub mod framing;
pub mod http;

pub use echo::EchoEndpoint;
pub use framing::{frame_byte_stream, Framing, LineFramer};
pub use http::{HttpEndpoint, DEFAULT_CONNECT_TIMEOUT};

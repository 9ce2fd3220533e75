use serde::Deserialize;

use crate::error::ChatError;

/// One unit of a streamed inference response.
///
/// An event carries at most one payload part; events without one (keep-alives,
/// SSE comments, metadata frames) are skipped by the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamEvent {
    pub payload_part: Option<PayloadPart>,
}

/// Raw bytes of a single response fragment, not yet UTF-8 validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPart {
    pub bytes: Vec<u8>,
}

impl StreamEvent {
    pub fn payload(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            payload_part: Some(PayloadPart {
                bytes: bytes.into(),
            }),
        }
    }

    pub fn empty() -> Self {
        Self { payload_part: None }
    }

    /// The fragment bytes, if this event carries a non-empty payload.
    pub fn fragment(&self) -> Option<&[u8]> {
        self.payload_part
            .as_ref()
            .map(|p| p.bytes.as_slice())
            .filter(|b| !b.is_empty())
    }
}

/// Decoded shape of a fragment: `{"outputs": ["delta", ...]}`. Only the
/// first output is read, so later entries may hold anything.
#[derive(Debug, Deserialize)]
struct OutputChunk {
    outputs: Vec<serde_json::Value>,
}

/// Decode one fragment into its text delta.
///
/// `index` is the position of the event in the stream and is only used for
/// error reporting.
pub fn decode_fragment(index: usize, bytes: &[u8]) -> Result<String, ChatError> {
    let text =
        std::str::from_utf8(bytes).map_err(|source| ChatError::Decode { index, source })?;

    let chunk: OutputChunk =
        serde_json::from_str(text).map_err(|e| ChatError::MalformedChunk {
            index,
            reason: e.to_string(),
        })?;

    match chunk.outputs.first() {
        Some(serde_json::Value::String(delta)) => Ok(delta.clone()),
        Some(other) => Err(ChatError::MalformedChunk {
            index,
            reason: format!("first output is not a string: {other}"),
        }),
        None => Err(ChatError::MalformedChunk {
            index,
            reason: "`outputs` is empty".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_first_output() {
        let delta = decode_fragment(0, br#"{"outputs":["Hel","ignored"]}"#).unwrap();
        assert_eq!(delta, "Hel");
    }

    #[test]
    fn test_later_outputs_are_not_inspected() {
        let delta = decode_fragment(0, br#"{"outputs":["Hel", null]}"#).unwrap();
        assert_eq!(delta, "Hel");
    }

    #[test]
    fn test_non_string_first_output_is_malformed() {
        let err = decode_fragment(2, br#"{"outputs":[42]}"#).unwrap_err();
        assert!(matches!(err, ChatError::MalformedChunk { index: 2, .. }));
    }

    #[test]
    fn test_decode_keeps_whitespace() {
        let delta = decode_fragment(0, br#"{"outputs":["  spaced \n"]}"#).unwrap();
        assert_eq!(delta, "  spaced \n");
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let err = decode_fragment(3, &[0x7b, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ChatError::Decode { index: 3, .. }));
    }

    #[test]
    fn test_missing_outputs_is_malformed() {
        let err = decode_fragment(1, b"{}").unwrap_err();
        assert!(matches!(err, ChatError::MalformedChunk { index: 1, .. }));
    }

    #[test]
    fn test_empty_outputs_is_malformed() {
        let err = decode_fragment(0, br#"{"outputs":[]}"#).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_not_json_is_malformed() {
        let err = decode_fragment(0, b"data: hi").unwrap_err();
        assert!(err.is_chunk_error());
    }

    #[test]
    fn test_zero_length_payload_is_no_fragment() {
        assert!(StreamEvent::payload(Vec::new()).fragment().is_none());
        assert!(StreamEvent::empty().fragment().is_none());
        assert_eq!(StreamEvent::payload("x").fragment(), Some(&b"x"[..]));
    }
}

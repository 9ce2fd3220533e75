//! Response framing
//!
//! Cuts a chunked HTTP body into [`StreamEvent`]s. Chunk boundaries are
//! arbitrary, so bytes are buffered until a full line is available. Payload
//! bytes are passed through untouched; UTF-8 validation is the consumer's job.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use streamchat_core::{ChatError, EventStream, StreamEvent};

/// How the endpoint delimits fragments in its response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framing {
    /// One JSON fragment per line; blank lines are keep-alives.
    #[default]
    JsonLines,
    /// Server-Sent Events; each `data:` line is a fragment.
    Sse,
}

impl Framing {
    /// Value for the `Accept` request header.
    pub fn accept(&self) -> &'static str {
        match self {
            Framing::JsonLines => "application/jsonlines",
            Framing::Sse => "text/event-stream",
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framing::JsonLines => write!(f, "json-lines"),
            Framing::Sse => write!(f, "sse"),
        }
    }
}

impl FromStr for Framing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json-lines" | "jsonlines" | "ndjson" => Ok(Framing::JsonLines),
            "sse" | "event-stream" => Ok(Framing::Sse),
            other => Err(format!("unknown framing '{other}'; use 'json-lines' or 'sse'")),
        }
    }
}

const SSE_DONE: &[u8] = b"[DONE]";

/// Incremental line splitter producing one event per complete line.
#[derive(Debug)]
pub struct LineFramer {
    framing: Framing,
    buffer: Vec<u8>,
    done: bool,
}

impl LineFramer {
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            buffer: Vec::new(),
            done: false,
        }
    }

    /// True once an SSE `[DONE]` marker was seen. Later input is ignored.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one body chunk; returns the events for every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = self.frame_line(&line[..line.len() - 1]) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing line that had no terminating newline.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        let line = std::mem::take(&mut self.buffer);
        self.frame_line(&line).into_iter().collect()
    }

    fn frame_line(&mut self, line: &[u8]) -> Option<StreamEvent> {
        if self.done {
            return None;
        }
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        match self.framing {
            Framing::JsonLines => {
                if line.is_empty() {
                    Some(StreamEvent::empty())
                } else {
                    Some(StreamEvent::payload(line))
                }
            }
            Framing::Sse => {
                let Some(data) = line.strip_prefix(b"data:") else {
                    return Some(StreamEvent::empty());
                };
                let data = data.strip_prefix(b" ").unwrap_or(data);
                if data == SSE_DONE {
                    self.done = true;
                    return None;
                }
                Some(StreamEvent::payload(data))
            }
        }
    }
}

struct FrameState {
    body: futures::stream::BoxStream<'static, Result<Vec<u8>, String>>,
    framer: LineFramer,
    pending: VecDeque<StreamEvent>,
    finished: bool,
}

/// Adapt a body byte stream into an [`EventStream`].
///
/// A body error becomes a single `ChatError::Transport` item and ends the
/// stream. A body that simply ends is a clean end of stream.
pub fn frame_byte_stream<S, B, E>(body: S, framing: Framing) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let body = body
        .map(|item| item.map(|b| b.as_ref().to_vec()).map_err(|e| e.to_string()))
        .boxed();
    let state = FrameState {
        body,
        framer: LineFramer::new(framing),
        pending: VecDeque::new(),
        finished: false,
    };

    futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(event) = st.pending.pop_front() {
                return Some((Ok(event), st));
            }
            if st.finished || st.framer.is_done() {
                return None;
            }
            match st.body.next().await {
                Some(Ok(chunk)) => {
                    let events = st.framer.push(&chunk);
                    st.pending.extend(events);
                }
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(ChatError::Transport(e)), st));
                }
                None => {
                    st.finished = true;
                    let events = st.framer.finish();
                    st.pending.extend(events);
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn payloads(events: &[StreamEvent]) -> Vec<Option<String>> {
        events
            .iter()
            .map(|e| e.fragment().map(|b| String::from_utf8_lossy(b).into_owned()))
            .collect()
    }

    #[test]
    fn test_json_lines_across_chunk_boundaries() {
        let mut framer = LineFramer::new(Framing::JsonLines);
        let mut events = framer.push(br#"{"outputs":["He"#);
        assert!(events.is_empty());
        events.extend(framer.push(b"l\"]}\n\r\n{\"outputs\":[\"lo\"]}\r\n"));
        events.extend(framer.finish());
        assert_eq!(
            payloads(&events),
            vec![
                Some(r#"{"outputs":["Hel"]}"#.to_string()),
                None,
                Some(r#"{"outputs":["lo"]}"#.to_string()),
            ]
        );
    }

    #[test]
    fn test_trailing_line_is_flushed() {
        let mut framer = LineFramer::new(Framing::JsonLines);
        assert!(framer.push(b"{\"outputs\":[\"end\"]}").is_empty());
        let events = framer.finish();
        assert_eq!(events.len(), 1);
        assert!(framer.finish().is_empty());
    }

    #[test]
    fn test_split_multibyte_is_not_validated_here() {
        let mut framer = LineFramer::new(Framing::JsonLines);
        let bytes = "é\n".as_bytes();
        assert!(framer.push(&bytes[..1]).is_empty());
        let events = framer.push(&bytes[1..]);
        assert_eq!(events[0].fragment(), Some("é".as_bytes()));
    }

    #[test]
    fn test_sse_data_and_done() {
        let mut framer = LineFramer::new(Framing::Sse);
        let events = framer.push(
            b": keep-alive\nevent: token\ndata: {\"outputs\":[\"a\"]}\n\ndata:{\"outputs\":[\"b\"]}\ndata: [DONE]\ndata: {\"outputs\":[\"c\"]}\n",
        );
        assert_eq!(
            payloads(&events),
            vec![
                None,
                None,
                Some(r#"{"outputs":["a"]}"#.to_string()),
                None,
                Some(r#"{"outputs":["b"]}"#.to_string()),
            ]
        );
        assert!(framer.is_done());
        assert!(framer.finish().is_empty());
    }

    #[test]
    fn test_framing_parse() {
        assert_eq!("SSE".parse::<Framing>().unwrap(), Framing::Sse);
        assert_eq!("ndjson".parse::<Framing>().unwrap(), Framing::JsonLines);
        assert!("xml".parse::<Framing>().is_err());
        assert_eq!(Framing::JsonLines.to_string(), "json-lines");
    }

    #[tokio::test]
    async fn test_frame_byte_stream_ends_on_transport_error() {
        let body = futures::stream::iter(vec![
            Ok(b"{\"outputs\":[\"x\"]}\n{\"outp".to_vec()),
            Err("connection reset".to_string()),
            Ok(b"uts\":[\"y\"]}\n".to_vec()),
        ]);
        let items: Vec<_> = frame_byte_stream(body, Framing::JsonLines).collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(ChatError::Transport(_))));
    }

    #[tokio::test]
    async fn test_frame_byte_stream_clean_end() {
        let body = futures::stream::iter(vec![
            Ok::<_, Infallible>("data: {\"outputs\":[\"a\"]}\n"),
            Ok("data: [DONE]\n"),
        ]);
        let items: Vec<_> = frame_byte_stream(body, Framing::Sse).collect().await;
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].as_ref().unwrap().fragment(),
            Some(&br#"{"outputs":["a"]}"#[..])
        );
    }
}

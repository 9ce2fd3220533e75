//! Streaming response consumer.
//!
//! Turns a sequence of [`StreamEvent`]s into a growing output string and
//! hands the full output-so-far to a [`RenderSink`] after every fragment.

use futures::{pin_mut, Stream, StreamExt};
use tracing::{debug, trace};

use crate::error::ChatError;
use crate::event::{decode_fragment, StreamEvent};
use crate::traits::RenderSink;

/// Accumulates the text of one streamed response.
///
/// A consumer is scoped to a single submission. The output only ever grows:
/// each fragment is appended verbatim and nothing is trimmed or reordered.
#[derive(Debug, Default)]
pub struct StreamingResponseConsumer {
    output: String,
    events_seen: usize,
    fragments_seen: usize,
}

impl StreamingResponseConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one event. Returns `true` if it carried a fragment.
    ///
    /// On error the accumulated output is left as it was before this event.
    pub fn accept<S>(&mut self, event: &StreamEvent, sink: &mut S) -> Result<bool, ChatError>
    where
        S: RenderSink + ?Sized,
    {
        let index = self.events_seen;
        self.events_seen += 1;

        let Some(bytes) = event.fragment() else {
            trace!(index, "Skipping event without payload");
            return Ok(false);
        };

        let delta = decode_fragment(index, bytes)?;
        self.output.push_str(&delta);
        self.fragments_seen += 1;
        sink.on_partial(&self.output);
        Ok(true)
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn events_seen(&self) -> usize {
        self.events_seen
    }

    pub fn fragments_seen(&self) -> usize {
        self.fragments_seen
    }

    /// Freeze the accumulated output.
    pub fn finish(self) -> String {
        debug!(
            events = self.events_seen,
            fragments = self.fragments_seen,
            chars = self.output.len(),
            "Stream consumed"
        );
        self.output
    }

    /// Drive the consumer over an already materialized event sequence.
    pub fn consume<I, S>(events: I, sink: &mut S) -> Result<String, ChatError>
    where
        I: IntoIterator<Item = StreamEvent>,
        S: RenderSink + ?Sized,
    {
        let mut consumer = Self::new();
        for event in events {
            consumer.accept(&event, sink)?;
        }
        Ok(consumer.finish())
    }

    /// Drive the consumer over an async event stream, pulling one event at a
    /// time. A transport error item aborts consumption like a chunk error.
    pub async fn consume_stream<St, S>(events: St, sink: &mut S) -> Result<String, ChatError>
    where
        St: Stream<Item = Result<StreamEvent, ChatError>>,
        S: RenderSink + ?Sized,
    {
        pin_mut!(events);
        let mut consumer = Self::new();
        while let Some(event) = events.next().await {
            consumer.accept(&event?, sink)?;
        }
        Ok(consumer.finish())
    }
}

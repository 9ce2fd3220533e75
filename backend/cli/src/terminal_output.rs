//! Terminal output utilities: ANSI formatting, notes, progressive stream writing.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use streamchat_core::RenderSink;

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";

static COLOR_DISABLED: AtomicBool = AtomicBool::new(false);

/// Turn off color for the rest of the process (`--plain`).
pub fn disable_color() {
    COLOR_DISABLED.store(true, Ordering::Relaxed);
}

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    !COLOR_DISABLED.load(Ordering::Relaxed)
        && std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Wrap `text` in the given style when color is on.
pub fn paint(style: &str, text: &str) -> String {
    if supports_color() {
        format!("{style}{text}{RESET}")
    } else {
        text.to_string()
    }
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

/// Print a formatted INFO note to stdout.
pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

/// Print a formatted WARNING note to stderr.
pub fn note_warn(msg: &str) {
    if supports_color() {
        eprintln!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        eprintln!("WARN: {msg}");
    }
}

/// Print a formatted ERROR note to stderr.
pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

/// Print a formatted SUCCESS note.
pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Streaming writer
// ---------------------------------------------------------------------------

/// Write chunks to a buffered writer, flushing after each.
pub fn stream_write(writer: &mut impl Write, chunk: &str) -> std::io::Result<()> {
    writer.write_all(chunk.as_bytes())?;
    writer.flush()
}

/// Render sink that prints each partial output progressively.
///
/// Every partial extends the previous one, so only the new suffix is written.
pub struct TerminalSink<W: Write> {
    writer: W,
    printed: usize,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, printed: 0 }
    }

    /// Bytes of output written so far.
    pub fn printed(&self) -> usize {
        self.printed
    }

    /// End the streamed line, if anything was streamed.
    pub fn finish_line(&mut self) {
        if self.printed > 0 {
            let _ = stream_write(&mut self.writer, "\n");
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn on_partial(&mut self, text: &str) {
        let Some(suffix) = text.get(self.printed..) else {
            return;
        };
        if stream_write(&mut self.writer, suffix).is_ok() {
            self.printed = text.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_writes_only_new_suffix() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.on_partial("Hel");
        sink.on_partial("Hello");
        sink.on_partial("Hello world");
        assert_eq!(sink.printed(), 11);
        sink.finish_line();
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "Hello world\n");
    }

    #[test]
    fn sink_handles_multibyte_fragments() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.on_partial("piz");
        sink.on_partial("pizza 🍕");
        sink.on_partial("pizza 🍕!");
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "pizza 🍕!");
    }

    #[test]
    fn empty_stream_prints_no_newline() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.finish_line();
        assert!(sink.into_inner().is_empty());
    }
}

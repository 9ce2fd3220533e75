//! Conversation transcript export.
//!
//! Writes the history of a session as pretty JSON or Markdown.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::types::ConversationTurn;

/// Output format of an exported transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    Json,
    Markdown,
}

impl TranscriptFormat {
    /// `.json` exports JSON; any other extension exports Markdown.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TranscriptFormat::Json,
            _ => TranscriptFormat::Markdown,
        }
    }
}

#[derive(Serialize)]
struct TranscriptDocument<'a> {
    session_id: Uuid,
    turns: &'a [ConversationTurn],
}

pub fn render_json(session_id: Uuid, turns: &[ConversationTurn]) -> Result<String> {
    serde_json::to_string_pretty(&TranscriptDocument { session_id, turns })
        .context("Failed to serialize transcript")
}

pub fn render_markdown(session_id: Uuid, turns: &[ConversationTurn]) -> String {
    let mut out = format!("# Conversation {session_id}\n");
    for turn in turns {
        out.push_str(&format!(
            "\n## You ({})\n\n{}\n\n## Model\n\n{}\n",
            turn.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            turn.user_text,
            turn.model_text,
        ));
    }
    out
}

/// Write the transcript to `path`, creating parent directories as needed.
pub async fn export(path: &Path, session_id: Uuid, turns: &[ConversationTurn]) -> Result<()> {
    let body = match TranscriptFormat::from_path(path) {
        TranscriptFormat::Json => render_json(session_id, turns)?,
        TranscriptFormat::Markdown => render_markdown(session_id, turns),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("Failed to write transcript: {}", path.display()))?;

    info!(path = %path.display(), turns = turns.len(), "Exported transcript");
    Ok(())
}

/// Loading of Messenger conversation exports.
///
/// An export folder holds one or more `message_N.json` files. Each file has the
/// same layout: an optional title, the participants and a page of messages.
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::encoding::repair_conversation;
use crate::model::{Conversation, Message};
use crate::timefmt::format_timestamp;

#[derive(Debug, Deserialize)]
struct ExportFile {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    participants: Vec<Participant>,
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct Participant {
    name: String,
}

/// JSON files directly inside `dir`, sorted by file name.
pub fn discover_export_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read export directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list export directory: {}", dir.display()))?
            .path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if path.is_file() && is_json {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        bail!("No JSON files found in {}", dir.display());
    }

    Ok(files)
}

/// Parse one export file.
fn load_export_file(path: &Path) -> Result<ExportFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read export file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON from: {}", path.display()))
}

/// Load and repair every export file in `dir`.
///
/// `on_file` is called before each file is read, e.g. to drive a progress
/// indicator. Messages keep file order, then in-file order.
pub fn load_conversation_dir(dir: &Path, mut on_file: impl FnMut(&Path)) -> Result<Conversation> {
    let files = discover_export_files(dir)?;
    tracing::info!("Loading {} export files from {}", files.len(), dir.display());

    let mut conversation = Conversation::default();
    for path in &files {
        on_file(path);
        let export = load_export_file(path)?;
        tracing::debug!(
            "{}: {} messages, newest at {}",
            path.display(),
            export.messages.len(),
            export
                .messages
                .iter()
                .map(|m| m.timestamp_ms)
                .max()
                .map(format_timestamp)
                .unwrap_or_else(|| "-".to_string())
        );

        if conversation.title.is_none() {
            conversation.title = export.title;
        }
        for participant in export.participants {
            if !conversation.participants.contains(&participant.name) {
                conversation.participants.push(participant.name);
            }
        }
        conversation.messages.extend(export.messages);
    }

    Ok(repair_conversation(conversation))
}

/// Conversation data as it comes out of a Messenger export.
use serde::{Deserialize, Serialize};

/// A single message from the export.
///
/// `content` is `None` for media-only or unsent messages. Those still count
/// towards message totals but are ignored for length and first-message stats.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Message {
    #[serde(rename = "sender_name")]
    pub sender: String,
    pub timestamp_ms: i64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reactions: Option<Vec<ReactionRaw>>,
}

/// A reaction as stored on a message. The message sender is the recipient.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReactionRaw {
    pub reaction: String,
    pub actor: String,
}

/// One (actor, icon, recipient) triple derived from a message's reactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub icon: String,
    pub actor: String,
    pub recipient: String,
}

/// A loaded conversation: every export file merged into one message list.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    pub title: Option<String>,
    pub participants: Vec<String>,
    pub messages: Vec<Message>,
}

impl Message {
    /// Convenience constructor, mostly for tests and fixtures.
    pub fn new(sender: &str, timestamp_ms: i64, content: Option<&str>) -> Self {
        Self {
            sender: sender.to_string(),
            timestamp_ms,
            content: content.map(str::to_string),
            reactions: None,
        }
    }

    pub fn with_reaction(mut self, icon: &str, actor: &str) -> Self {
        self.reactions
            .get_or_insert_with(Vec::new)
            .push(ReactionRaw {
                reaction: icon.to_string(),
                actor: actor.to_string(),
            });
        self
    }
}

/// Reaction extraction and reaction statistics.
///
/// Received statistics look at reactions attached to a set of messages.
/// Given statistics look at reactions a single user put on anyone's messages.
use crate::encoding::repair_text;
use crate::model::{Message, ReactionEvent};
use crate::ranking::mode;

/// Reaction statistics from the receiving side.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedReactions {
    pub total: usize,
    pub most_common_icon: Option<String>,
    /// Empty when there are no reactions.
    pub top_reactor: String,
}

/// Reaction statistics from the giving side, for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct GivenReactions {
    pub total: usize,
    pub favourite_icon: Option<String>,
    pub favourite_recipient: Option<String>,
}

/// Turn a message's reactions into events. The message sender is the recipient.
///
/// This is the only place icon and actor get repaired; the export loader
/// leaves reactions untouched.
pub fn extract_reactions(message: &Message) -> Vec<ReactionEvent> {
    message
        .reactions
        .iter()
        .flatten()
        .map(|raw| ReactionEvent {
            icon: repair_text(&raw.reaction),
            actor: repair_text(&raw.actor),
            recipient: message.sender.clone(),
        })
        .collect()
}

/// Extract reaction events from all messages, in message order.
pub fn extract_all(messages: &[Message]) -> Vec<ReactionEvent> {
    messages.iter().flat_map(extract_reactions).collect()
}

/// Reactions received by the given messages.
pub fn received_stats(events: &[ReactionEvent]) -> ReceivedReactions {
    ReceivedReactions {
        total: events.len(),
        most_common_icon: mode(events.iter().map(|e| e.icon.as_str())).map(str::to_string),
        top_reactor: mode(events.iter().map(|e| e.actor.as_str()))
            .map(str::to_string)
            .unwrap_or_default(),
    }
}

/// Reactions given by `user`, regardless of who received them.
pub fn given_stats(events: &[ReactionEvent], user: &str) -> GivenReactions {
    let given: Vec<&ReactionEvent> = events.iter().filter(|e| e.actor == user).collect();

    GivenReactions {
        total: given.len(),
        favourite_icon: mode(given.iter().map(|e| e.icon.as_str())).map(str::to_string),
        favourite_recipient: mode(given.iter().map(|e| e.recipient.as_str()))
            .map(str::to_string),
    }
}

/// Text repair for Messenger exports.
///
/// The export writes UTF-8 text byte-by-byte as if each byte were a Latin-1
/// code point, so "ł" arrives as "Å\u{82}". Re-encoding as Latin-1 and decoding
/// as UTF-8 recovers the original string.
use crate::model::{Conversation, Message};

/// Repair a double-encoded string.
///
/// Returns the input unchanged when it cannot be Latin-1 encoded (some char is
/// above U+00FF) or when the resulting bytes are not valid UTF-8. Both cases
/// mean the text was never corrupted.
pub fn repair_text(input: &str) -> String {
    let mut bytes = Vec::with_capacity(input.len());
    for ch in input.chars() {
        match u8::try_from(u32::from(ch)) {
            Ok(byte) => bytes.push(byte),
            Err(_) => return input.to_string(),
        }
    }

    match String::from_utf8(bytes) {
        Ok(repaired) => repaired,
        Err(_) => input.to_string(),
    }
}

/// Repair the sender and content of a message.
///
/// Reactions are left as exported: `reactions::extract_reactions` repairs icon
/// and actor when it turns them into events. Repairing twice would turn a name
/// that legitimately reads "Ã©" into "é".
pub fn repair_message(message: Message) -> Message {
    Message {
        sender: repair_text(&message.sender),
        content: message.content.as_deref().map(repair_text),
        ..message
    }
}

/// Repair the title, participant names and all messages of a conversation.
pub fn repair_conversation(conversation: Conversation) -> Conversation {
    Conversation {
        title: conversation.title.as_deref().map(repair_text),
        participants: conversation
            .participants
            .iter()
            .map(|p| repair_text(p))
            .collect(),
        messages: conversation
            .messages
            .into_iter()
            .map(repair_message)
            .collect(),
    }
}

/// Replace Polish diacritics with plain ASCII letters.
///
/// Used for labels that end up in fixed-width layouts. Characters outside the
/// table are kept as they are.
pub fn strip_polish(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'ł' => 'l',
            'ą' => 'a',
            'ę' => 'e',
            'ż' | 'ź' => 'z',
            'ó' => 'o',
            'ś' => 's',
            'ć' => 'c',
            'ń' => 'n',
            other => other,
        })
        .collect()
}

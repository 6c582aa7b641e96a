/// Statistics aggregation and generation module.
///
/// Turns repaired messages into conversation-level stats, the per-user table
/// and the badge rankings, and wraps everything into a `Report`.
use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::model::Message;
use crate::ranking::{count_first_seen, rank_by_count, rank_by_metric, rank_counts, round2};
use crate::reactions::{extract_all, given_stats, received_stats};
use crate::stats::*;
use crate::timefmt::{date_from_millis, month_key};
use crate::tokenize::{most_common, tokenize_messages, Stopwords};
use crate::window::WindowScope;

/// Number of entries kept per badge.
pub const BADGE_SIZE: usize = 3;

/// Everything besides the messages that shapes a report.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub stopwords: Stopwords,
    pub window: WindowScope,
    /// How many entries to keep in `top_words`
    pub top_words: usize,
    /// N-gram size for `top_words` (1, 2 or 3)
    pub ngram: usize,
    /// Date stamped into the report; today's local date when unset
    pub generated_at: Option<NaiveDate>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            stopwords: Stopwords::default(),
            window: WindowScope::life(),
            top_words: 5,
            ngram: 1,
            generated_at: None,
        }
    }
}

/// Builds the full report for a conversation.
///
/// Messages are expected to be repaired already. They are restricted to
/// `options.window` before any statistic is computed.
pub fn build_report(
    title: Option<String>,
    messages: &[Message],
    options: &AnalyzeOptions,
) -> Result<Report> {
    let messages = options.window.filter_messages(messages);
    tracing::info!(
        "Building report over {} messages (window: {})",
        messages.len(),
        options.window
    );

    let tokens = tokenize_messages(&messages, &options.stopwords);
    let top_words = most_common(&tokens, options.ngram, options.top_words)?;

    let conversation = build_conversation_stats(&messages);
    let users = build_user_stats(&messages);
    let badges = build_badges(&users);
    let activity = build_activity(&messages);
    let generated_at = options
        .generated_at
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    tracing::debug!(
        "Report ready: {} users, {} tokens, {} reactions",
        users.len(),
        tokens.len(),
        conversation.total_reactions_received
    );

    Ok(Report {
        schema_version: SCHEMA_VERSION,
        generated_at: generated_at.format("%Y-%m-%d").to_string(),
        title,
        window: options.window.key.clone(),
        conversation,
        users,
        badges,
        activity,
        top_words,
    })
}

/// Aggregate statistics over a set of messages.
///
/// Works for the whole conversation as well as for one sender's subset.
pub fn build_conversation_stats(messages: &[Message]) -> ConversationStats {
    let (busiest_day, messages_on_busiest_day) = match busiest_day(messages) {
        Some((day, count)) => (Some(day), count),
        None => (None, 0),
    };

    let first = first_message(messages);
    let received = received_stats(&extract_all(messages));

    ConversationStats {
        total_messages: messages.len(),
        avg_message_length: avg_message_length(messages),
        busiest_day,
        messages_on_busiest_day,
        first_message_text: first.and_then(|m| m.content.clone()),
        first_message_sender: first.map(|m| m.sender.clone()),
        total_reactions_received: received.total,
        most_common_reaction_received: received.most_common_icon,
        top_reactor: received.top_reactor,
    }
}

/// Per-user statistics for every sender with more than one message.
///
/// Received-side stats come from the sender's own messages; given-side stats
/// come from every reaction in the conversation where the sender is the actor.
pub fn build_user_stats(messages: &[Message]) -> UserTable {
    let events = extract_all(messages);
    let senders = count_first_seen(messages.iter().map(|m| m.sender.as_str()));

    let mut table = UserTable::new();
    for (sender, count) in senders {
        if count <= 1 {
            tracing::debug!("Skipping '{}' with a single message", sender);
            continue;
        }

        let own: Vec<Message> = messages
            .iter()
            .filter(|m| m.sender == sender)
            .cloned()
            .collect();
        let given = given_stats(&events, sender);

        table.insert(
            sender.to_string(),
            UserStats {
                conversation: build_conversation_stats(&own),
                favourite_reaction_given: given.favourite_icon,
                favourite_recipient: given.favourite_recipient,
                total_reactions_given: given.total,
            },
        );
    }

    table
}

/// Top three users for each badge.
pub fn build_badges(users: &UserTable) -> Badges {
    Badges {
        messenger: count_entries(top_counts(users, |s| s.conversation.total_messages)),
        storyteller: decimal_entries(top_decimals(users, |s| {
            Some(s.conversation.avg_message_length)
        })),
        entertainer: decimal_entries(top_decimals(users, reaction_ratio)),
        sensitivist: count_entries(top_counts(users, |s| s.total_reactions_given)),
    }
}

/// Reactions received per message sent, unrounded. `None` without messages.
fn reaction_ratio(stats: &UserStats) -> Option<f64> {
    if stats.conversation.total_messages == 0 {
        return None;
    }
    Some(
        stats.conversation.total_reactions_received as f64
            / stats.conversation.total_messages as f64,
    )
}

/// Messages per month and per sender, the inputs for activity charts.
pub fn build_activity(messages: &[Message]) -> Activity {
    let mut by_month: BTreeMap<String, usize> = BTreeMap::new();
    for message in messages {
        if let Some(key) = month_key(message.timestamp_ms) {
            *by_month.entry(key).or_insert(0) += 1;
        }
    }

    let by_sender = rank_counts(count_first_seen(messages.iter().map(|m| m.sender.as_str())))
        .into_iter()
        .map(|(sender, messages)| SenderCount {
            sender: sender.to_string(),
            messages,
        })
        .collect();

    Activity {
        by_month: by_month.into_iter().collect(),
        by_sender,
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Mean word count over messages with content, rounded to 2 decimals.
/// 0.0 when no message has content.
fn avg_message_length(messages: &[Message]) -> f64 {
    let lengths: Vec<usize> = messages
        .iter()
        .filter_map(|m| m.content.as_deref())
        .map(crate::tokenize::word_count)
        .collect();

    if lengths.is_empty() {
        return 0.0;
    }

    let total: usize = lengths.iter().sum();
    round2(total as f64 / lengths.len() as f64)
}

/// Day with the most messages. Ties go to the earliest date.
fn busiest_day(messages: &[Message]) -> Option<(chrono::NaiveDate, usize)> {
    let mut by_day: BTreeMap<chrono::NaiveDate, usize> = BTreeMap::new();
    for message in messages {
        match date_from_millis(message.timestamp_ms) {
            Some(day) => *by_day.entry(day).or_insert(0) += 1,
            None => tracing::warn!(
                "Skipping out-of-range timestamp {} from '{}'",
                message.timestamp_ms,
                message.sender
            ),
        }
    }

    rank_counts(by_day.into_iter().collect()).into_iter().next()
}

/// Earliest message with content. Ties go to input order.
fn first_message(messages: &[Message]) -> Option<&Message> {
    messages
        .iter()
        .filter(|m| m.content.is_some())
        .min_by_key(|m| m.timestamp_ms)
}

/// Users ranked by an integer metric, best first, cut to the badge size.
fn top_counts<'a>(
    users: &'a UserTable,
    metric: impl Fn(&UserStats) -> usize,
) -> Vec<(&'a str, usize)> {
    let mut rows: Vec<(&str, usize)> = users
        .iter()
        .map(|(user, stats)| (user.as_str(), metric(stats)))
        .collect();
    rank_by_count(&mut rows);
    rows.truncate(BADGE_SIZE);
    rows
}

/// Users ranked by a decimal metric, best first, cut to the badge size.
/// Users for whom the metric is undefined are left out.
fn top_decimals<'a>(
    users: &'a UserTable,
    metric: impl Fn(&UserStats) -> Option<f64>,
) -> Vec<(&'a str, f64)> {
    let mut rows: Vec<(&str, f64)> = users
        .iter()
        .filter_map(|(user, stats)| metric(stats).map(|value| (user.as_str(), value)))
        .collect();
    rank_by_metric(&mut rows);
    rows.truncate(BADGE_SIZE);
    rows
}

fn count_entries(rows: Vec<(&str, usize)>) -> Vec<BadgeEntry> {
    rows.into_iter()
        .map(|(user, value)| BadgeEntry {
            user: user.to_string(),
            value: value.to_string(),
        })
        .collect()
}

/// Values are rounded for display only; ranking uses the exact metric.
fn decimal_entries(rows: Vec<(&str, f64)>) -> Vec<BadgeEntry> {
    rows.into_iter()
        .map(|(user, value)| BadgeEntry {
            user: user.to_string(),
            value: format_decimal(value),
        })
        .collect()
}

/// Render a metric the way reports always showed it: "3.0", "3.5", "1.33".
fn format_decimal(value: f64) -> String {
    let rounded = round2(value);
    if rounded.fract() == 0.0 {
        format!("{:.1}", rounded)
    } else {
        format!("{}", rounded)
    }
}

use crate::encoding::strip_polish;
use crate::stats::*;
use anyhow::Result;
use unicode_width::UnicodeWidthStr;

/// Width of a badge column in the badge table.
const BADGE_COLUMN_WIDTH: usize = 24;

/// Rendering switches.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Replace Polish diacritics in names and labels with plain ASCII
    pub ascii_labels: bool,
}

/// Render a report to Markdown
pub fn render(report: &Report, options: &RenderOptions) -> Result<String> {
    let mut output = String::new();

    // 1. Title and metadata
    render_header(&mut output, report);

    // 2. Summary
    render_summary(&mut output, &report.conversation);

    // 3. First message
    render_first_message(&mut output, &report.conversation, options);

    // 4. Top words
    if !report.top_words.is_empty() {
        render_top_words(&mut output, &report.top_words);
    }

    // 5. Badges
    render_badges(&mut output, &report.badges, options);

    // 6. Participants
    if !report.users.is_empty() {
        render_users(&mut output, &report.users, options);
    }

    // 7. Activity
    if !report.activity.by_month.is_empty() {
        render_activity(&mut output, &report.activity);
    }

    Ok(output)
}

fn render_header(output: &mut String, report: &Report) {
    match report.title {
        Some(ref title) => output.push_str(&format!("# 💬 Conversation recap — {}\n", title)),
        None => output.push_str("# 💬 Conversation recap\n"),
    }

    if report.window != "life" {
        output.push_str(&format!("*Window: {}*\n", report.window));
    }
    output.push_str(&format!("*Generated: {}*\n\n", report.generated_at));
}

fn render_summary(output: &mut String, stats: &ConversationStats) {
    output.push_str("### 📊 Summary\n");
    output.push_str(&format!(
        "- 💬 **Messages:** {}\n",
        format_number(stats.total_messages)
    ));
    output.push_str(&format!(
        "- ❤️ **Reactions:** {}\n",
        format_number(stats.total_reactions_received)
    ));
    output.push_str(&format!(
        "- 📏 **Average message length:** {} words\n",
        stats.avg_message_length
    ));
    if let Some(day) = stats.busiest_day {
        output.push_str(&format!(
            "- 🔥 **Busiest day:** {} ({} messages)\n",
            day,
            format_number(stats.messages_on_busiest_day)
        ));
    }
    if let Some(ref icon) = stats.most_common_reaction_received {
        output.push_str(&format!("- 🏷️ **Most common reaction:** {}\n", icon));
    }
    if !stats.top_reactor.is_empty() {
        output.push_str(&format!("- 🙌 **Top reactor:** {}\n", stats.top_reactor));
    }
    output.push('\n');
}

fn render_first_message(output: &mut String, stats: &ConversationStats, options: &RenderOptions) {
    let (Some(text), Some(sender)) = (&stats.first_message_text, &stats.first_message_sender)
    else {
        return;
    };

    output.push_str("### 🥇 First message\n");
    for line in text.lines() {
        output.push_str(&format!("> {}\n", line));
    }
    output.push_str(&format!(">\n> — {}\n\n", label(sender, options)));
}

fn render_top_words(output: &mut String, words: &[WordCount]) {
    output.push_str("### 🔤 Most common words\n");
    for (i, word) in words.iter().enumerate() {
        output.push_str(&format!("{}. {} - {}\n", i + 1, word.term, word.count));
    }
    output.push('\n');
}

fn render_badges(output: &mut String, badges: &Badges, options: &RenderOptions) {
    output.push_str("### 🏆 Badges\n");

    let header: Vec<String> = BadgeKind::ALL
        .iter()
        .map(|kind| pad(kind.title(), BADGE_COLUMN_WIDTH))
        .collect();
    output.push_str(&format!("| {} |\n", header.join(" | ")));
    output.push_str(&format!(
        "|{}|\n",
        vec!["-".repeat(BADGE_COLUMN_WIDTH + 2); BadgeKind::ALL.len()].join("|")
    ));

    let rows = badges.iter().map(|(_, e)| e.len()).max().unwrap_or(0);
    for row in 0..rows {
        let cells: Vec<String> = badges
            .iter()
            .map(|(_, entries)| {
                let text = entries
                    .get(row)
                    .map(|e| cell(&label(&e.label(), options)))
                    .unwrap_or_default();
                pad(&text, BADGE_COLUMN_WIDTH)
            })
            .collect();
        output.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    output.push('\n');
    for kind in BadgeKind::ALL {
        output.push_str(&format!("- **{}**: {}\n", kind.title(), kind.description()));
    }
    output.push('\n');
}

fn render_users(output: &mut String, users: &UserTable, options: &RenderOptions) {
    output.push_str("### 👥 Participants\n");
    output.push_str(
        "| Name | Messages | Avg length | Reactions received | Reactions given | Favourite reaction | Reacts most to |\n",
    );
    output.push_str("|---|---:|---:|---:|---:|:---:|---|\n");

    for (name, stats) in users {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            cell(&label(name, options)),
            format_number(stats.conversation.total_messages),
            stats.conversation.avg_message_length,
            format_number(stats.conversation.total_reactions_received),
            format_number(stats.total_reactions_given),
            cell(stats.favourite_reaction_given.as_deref().unwrap_or("-")),
            stats
                .favourite_recipient
                .as_deref()
                .map(|r| cell(&label(r, options)))
                .unwrap_or_else(|| "-".to_string()),
        ));
    }
    output.push('\n');
}

fn render_activity(output: &mut String, activity: &Activity) {
    output.push_str("### 📈 Activity\n");
    output.push_str("#### 📆 Messages per month\n");

    let max = activity.by_month.values().copied().max().unwrap_or(0);
    for (month, &count) in &activity.by_month {
        output.push_str(&format!(
            "- {} {} {}\n",
            month,
            bar(count, max, 20),
            format_number(count)
        ));
    }

    if !activity.by_sender.is_empty() {
        let total: usize = activity.by_sender.iter().map(|s| s.messages).sum();
        output.push_str("\n#### 🥧 Share of messages\n");
        for entry in &activity.by_sender {
            output.push_str(&format!(
                "- {}: {} ({:.1}%)\n",
                entry.sender,
                format_number(entry.messages),
                percentage(entry.messages, total)
            ));
        }
    }
    output.push('\n');
}

fn label(text: &str, options: &RenderOptions) -> String {
    if options.ascii_labels {
        strip_polish(text)
    } else {
        text.to_string()
    }
}

/// Make free text safe inside a table cell: pipes are escaped and line
/// breaks flattened, so a name can never add a column or end the row.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Pad to a fixed display width. Emoji and wide glyphs count as two columns.
fn pad(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    if used >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - used))
    }
}

fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = (count * width).div_ceil(max);
    "█".repeat(filled)
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Message;
    use crate::stats_builder::{build_report, AnalyzeOptions};

    fn sample_report() -> Report {
        let messages = vec![
            Message::new("Paweł", 1_672_531_200_000, Some("Szczęśliwego nowego roku!")),
            Message::new("Łucja", 1_672_534_800_000, Some("Nawzajem")).with_reaction("❤", "Paweł"),
            Message::new("Paweł", 1_675_209_600_000, Some("luty")),
            Message::new("Łucja", 1_675_209_700_000, None),
        ];
        build_report(Some("Ekipa".to_string()), &messages, &AnalyzeOptions::default()).unwrap()
    }

    #[test]
    fn test_render_sections() {
        let md = render(&sample_report(), &RenderOptions::default()).unwrap();

        assert!(md.starts_with("# 💬 Conversation recap — Ekipa\n"));
        assert!(md.contains("- 💬 **Messages:** 4\n"));
        assert!(md.contains("- 🔥 **Busiest day:** 2023-01-01 (2 messages)\n"));
        assert!(md.contains("> Szczęśliwego nowego roku!\n"));
        assert!(md.contains("> — Paweł\n"));
        assert!(md.contains("### 🏆 Badges\n"));
        assert!(md.contains("Paweł - 2"));
        assert!(md.contains("| Łucja | 2 |"));
        assert!(md.contains("- 2023-01 "));
        assert!(md.contains("- 2023-02 "));
        assert!(!md.contains("*Window:"));
    }

    #[test]
    fn test_render_ascii_labels() {
        let options = RenderOptions { ascii_labels: true };
        let md = render(&sample_report(), &options).unwrap();

        assert!(md.contains("> — Pawel\n"));
        assert!(md.contains("Pawel - 2"));
        assert!(!md.contains("Paweł - 2"));
    }

    #[test]
    fn test_render_empty_report() {
        let report = build_report(None, &[], &AnalyzeOptions::default()).unwrap();
        let md = render(&report, &RenderOptions::default()).unwrap();

        assert!(md.starts_with("# 💬 Conversation recap\n"));
        assert!(!md.contains("First message"));
        assert!(!md.contains("Participants"));
        assert!(!md.contains("Activity"));
    }

    #[test]
    fn test_table_cells_escape_pipes() {
        let messages = vec![
            Message::new("A|B", 1, Some("raz")),
            Message::new("Celina", 2, Some("dwa")).with_reaction("👍", "A|B"),
            Message::new("A|B", 3, Some("trzy")),
            Message::new("Celina", 4, Some("cztery")),
        ];
        let report = build_report(None, &messages, &AnalyzeOptions::default()).unwrap();
        let md = render(&report, &RenderOptions::default()).unwrap();

        assert!(md.contains("| A\\|B | 2 |"));
        assert!(md.contains("| Celina | 2 | 1 | 1 | 0 | - | - |"));
        assert!(md.contains("| 👍 | Celina |"));
        assert!(md.contains("A\\|B - 2"));
        assert!(md
            .lines()
            .filter(|line| line.starts_with('|'))
            .all(|line| !line.contains(" A|B")));
        // Each badge row still has exactly one cell per badge.
        let badge_row = md
            .lines()
            .find(|line| line.contains("A\\|B - 2"))
            .unwrap();
        let separators = badge_row.replace("\\|", "").matches('|').count();
        assert_eq!(separators, BadgeKind::ALL.len() + 1);
    }

    #[test]
    fn test_cell_flattens_line_breaks() {
        assert_eq!(cell("a|b"), "a\\|b");
        assert_eq!(cell("a\nb"), "a b");
        assert_eq!(cell("plain"), "plain");
    }

    #[test]
    fn test_pad_uses_display_width() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("😆", 4), "😆  ");
        assert_eq!(pad("toolong", 3), "toolong");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(0, 0, 10), "");
        assert_eq!(bar(5, 10, 10), "█████");
        assert_eq!(bar(10, 10, 10).chars().count(), 10);
    }
}

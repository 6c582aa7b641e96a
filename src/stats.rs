use anyhow::{Context, Result};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(test)]
use anyhow::{anyhow, bail};
#[cfg(test)]
use jsonschema::{Draft, JSONSchema};

pub const SCHEMA_VERSION: i32 = 1;

/// Per-user statistics keyed by sender name, in first-seen order.
pub type UserTable = IndexMap<String, UserStats>;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Report {
    pub schema_version: i32,
    pub generated_at: String,
    pub title: Option<String>,
    /// Window key the report was restricted to ("life" when unrestricted).
    pub window: String,
    pub conversation: ConversationStats,
    pub users: UserTable,
    pub badges: Badges,
    pub activity: Activity,
    pub top_words: Vec<WordCount>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConversationStats {
    pub total_messages: usize,
    pub avg_message_length: f64,
    pub busiest_day: Option<NaiveDate>,
    pub messages_on_busiest_day: usize,
    pub first_message_text: Option<String>,
    pub first_message_sender: Option<String>,
    pub total_reactions_received: usize,
    pub most_common_reaction_received: Option<String>,
    pub top_reactor: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserStats {
    #[serde(flatten)]
    pub conversation: ConversationStats,
    pub favourite_reaction_given: Option<String>,
    pub favourite_recipient: Option<String>,
    pub total_reactions_given: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Badges {
    pub messenger: Vec<BadgeEntry>,
    pub storyteller: Vec<BadgeEntry>,
    pub entertainer: Vec<BadgeEntry>,
    pub sensitivist: Vec<BadgeEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeKind {
    Messenger,
    Storyteller,
    Entertainer,
    Sensitivist,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BadgeEntry {
    pub user: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Activity {
    /// Messages per UTC month ("YYYY-MM"), chronological.
    pub by_month: IndexMap<String, usize>,
    /// Messages per sender, most active first.
    pub by_sender: Vec<SenderCount>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SenderCount {
    pub sender: String,
    pub messages: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WordCount {
    pub term: String,
    pub count: usize,
}

impl BadgeKind {
    pub const ALL: [BadgeKind; 4] = [
        BadgeKind::Messenger,
        BadgeKind::Storyteller,
        BadgeKind::Entertainer,
        BadgeKind::Sensitivist,
    ];

    pub fn title(self) -> &'static str {
        match self {
            BadgeKind::Messenger => "Messenger",
            BadgeKind::Storyteller => "Storyteller",
            BadgeKind::Entertainer => "Entertainer",
            BadgeKind::Sensitivist => "Sensitivist",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BadgeKind::Messenger => "most messages sent",
            BadgeKind::Storyteller => "longest messages on average",
            BadgeKind::Entertainer => "most reactions received per message",
            BadgeKind::Sensitivist => "most reactions given",
        }
    }
}

impl Badges {
    pub fn get(&self, kind: BadgeKind) -> &[BadgeEntry] {
        match kind {
            BadgeKind::Messenger => &self.messenger,
            BadgeKind::Storyteller => &self.storyteller,
            BadgeKind::Entertainer => &self.entertainer,
            BadgeKind::Sensitivist => &self.sensitivist,
        }
    }

    /// All badges in display order.
    pub fn iter(&self) -> impl Iterator<Item = (BadgeKind, &[BadgeEntry])> {
        BadgeKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

impl BadgeEntry {
    /// Display form used in reports, e.g. "Anna - 42".
    pub fn label(&self) -> String {
        format!("{} - {}", self.user, self.value)
    }
}

impl Report {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report file: {}", path.display()))?;

        let report: Report = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON from: {}", path.display()))?;

        Ok(report)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report file: {}", path.display()))?;
        Ok(())
    }

    #[cfg(test)]
    /// Validate report JSON against the JSON schema
    pub fn validate_with_schema(report_json: &serde_json::Value, schema: &JSONSchema) -> Result<()> {
        match schema.validate(report_json) {
            Ok(_) => Ok(()),
            Err(errors) => {
                let error_messages: Vec<String> = errors
                    .map(|e| format!("  - {}: {}", e.instance_path, e))
                    .collect();
                bail!("Report validation failed:\n{}", error_messages.join("\n"))
            }
        }
    }

    #[cfg(test)]
    /// Load and compile the JSON schema
    pub fn load_schema(schema_path: &Path) -> Result<JSONSchema> {
        let schema_content = std::fs::read_to_string(schema_path)
            .with_context(|| format!("Failed to read schema file: {}", schema_path.display()))?;

        let schema_json: serde_json::Value =
            serde_json::from_str(&schema_content).with_context(|| {
                format!(
                    "Failed to parse schema JSON from: {}",
                    schema_path.display()
                )
            })?;

        JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_json)
            .map_err(|e| anyhow!("Failed to compile JSON schema: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Message;
    use crate::stats_builder::{build_report, AnalyzeOptions};
    use serde_json::json;
    use std::path::PathBuf;

    fn get_schema_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("report_schema.json")
    }

    fn sample_report() -> Report {
        let messages = vec![
            Message::new("Anna", 1_672_531_200_000, Some("szczęśliwego nowego roku")),
            Message::new("Bartek", 1_672_534_800_000, Some("nawzajem!")).with_reaction("❤", "Anna"),
            Message::new("Anna", 1_672_538_400_000, None),
            Message::new("Bartek", 1_675_209_600_000, Some("luty już")),
            Message::new("System", 1_675_209_700_000, Some("Anna named the group")),
        ];
        build_report(Some("Ekipa".to_string()), &messages, &AnalyzeOptions::default()).unwrap()
    }

    fn minimal_report_json() -> serde_json::Value {
        json!({
            "schema_version": 1,
            "generated_at": "2025-12-31",
            "title": null,
            "window": "life",
            "conversation": {
                "total_messages": 0,
                "avg_message_length": 0.0,
                "busiest_day": null,
                "messages_on_busiest_day": 0,
                "first_message_text": null,
                "first_message_sender": null,
                "total_reactions_received": 0,
                "most_common_reaction_received": null,
                "top_reactor": ""
            },
            "users": {},
            "badges": {
                "messenger": [],
                "storyteller": [],
                "entertainer": [],
                "sensitivist": []
            },
            "activity": { "by_month": {}, "by_sender": [] },
            "top_words": []
        })
    }

    #[test]
    fn test_load_schema() {
        let result = Report::load_schema(&get_schema_path());
        assert!(result.is_ok(), "Failed to load schema: {:?}", result.err());
    }

    #[test]
    fn test_generated_report_matches_schema() {
        let schema = Report::load_schema(&get_schema_path()).expect("Failed to load schema");
        let report_json = serde_json::to_value(sample_report()).unwrap();

        let result = Report::validate_with_schema(&report_json, &schema);
        assert!(result.is_ok(), "Report validation failed: {:?}", result.err());
    }

    #[test]
    fn test_minimal_report_matches_schema() {
        let schema = Report::load_schema(&get_schema_path()).expect("Failed to load schema");
        let result = Report::validate_with_schema(&minimal_report_json(), &schema);
        assert!(result.is_ok(), "Minimal report failed: {:?}", result.err());
    }

    #[test]
    fn test_validate_missing_required_field() {
        let schema = Report::load_schema(&get_schema_path()).expect("Failed to load schema");
        let mut invalid = minimal_report_json();
        invalid.as_object_mut().unwrap().remove("badges");

        let result = Report::validate_with_schema(&invalid, &schema);
        assert!(result.is_err(), "Should fail validation for missing 'badges'");
        let err_msg = format!("{:?}", result.err().unwrap());
        assert!(err_msg.contains("badges"), "Error should mention missing field");
    }

    #[test]
    fn test_validate_negative_count() {
        let schema = Report::load_schema(&get_schema_path()).expect("Failed to load schema");
        let mut invalid = minimal_report_json();
        invalid["conversation"]["total_messages"] = json!(-3);

        let result = Report::validate_with_schema(&invalid, &schema);
        assert!(result.is_err(), "Should fail validation for negative count");
    }

    #[test]
    fn test_validate_too_many_badge_entries() {
        let schema = Report::load_schema(&get_schema_path()).expect("Failed to load schema");
        let mut invalid = minimal_report_json();
        let entry = json!({ "user": "Anna", "value": "3" });
        invalid["badges"]["messenger"] = json!([entry, entry, entry, entry]);

        let result = Report::validate_with_schema(&invalid, &schema);
        assert!(result.is_err(), "Should fail validation for 4 badge entries");
    }

    #[test]
    fn test_validate_bad_busiest_day() {
        let schema = Report::load_schema(&get_schema_path()).expect("Failed to load schema");
        let mut invalid = minimal_report_json();
        invalid["conversation"]["busiest_day"] = json!("yesterday");

        let result = Report::validate_with_schema(&invalid, &schema);
        assert!(result.is_err(), "Should fail validation for non-date busiest_day");
    }

    #[test]
    fn test_user_stats_serialize_flat() {
        let report = sample_report();
        let value = serde_json::to_value(&report.users["Anna"]).unwrap();
        assert_eq!(value["total_messages"], json!(2));
        assert_eq!(value["total_reactions_given"], json!(1));
        assert_eq!(value["favourite_recipient"], json!("Bartek"));
        assert!(value.get("conversation").is_none());
    }

    #[test]
    fn test_save_and_load_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = sample_report();

        report.save_to_file(&path).unwrap();
        let loaded = Report::load_from_file(&path).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn test_load_missing_file_mentions_path() {
        let err = Report::load_from_file(Path::new("/nonexistent/report.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/report.json"));
    }

    #[test]
    fn test_badge_label() {
        let entry = BadgeEntry {
            user: "Anna".to_string(),
            value: "1.33".to_string(),
        };
        assert_eq!(entry.label(), "Anna - 1.33");
    }
}

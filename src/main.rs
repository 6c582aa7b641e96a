use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chat_recap::encoding::strip_polish;
use chat_recap::export::load_conversation_dir;
use chat_recap::logging;
use chat_recap::renderer::md::{self, RenderOptions};
use chat_recap::stats::Report;
use chat_recap::stats_builder::{build_report, AnalyzeOptions};
use chat_recap::tokenize::{load_stopwords, Stopwords};
use chat_recap::window::WindowScope;

// Help text constants
const HELP_MAIN: &str = "\
recap — Messenger conversation recap tool

Commands:
    analyze <dir>        Compute stats, badges and word counts for an export.
    render               Re-render a saved JSON report.

Usage:
    recap analyze <dir> [--stopwords <file>] [--window <w>] [--output <dir>] [--format md,json]
    recap render --json-stats <path> [--output <dir>]

More help:
    recap --help analyze
    recap --help render";

const HELP_ANALYZE: &str = "\
Analyze a conversation export

Usage:
    recap analyze <dir> [options]

Arguments:
    <dir>                Export folder containing message_*.json files.

Options:
    --stopwords <file>   Newline-delimited words to leave out of word counts.
    --window <w>         Restrict to '2023', '2023-05', '2023-05-14' or 'life' (default).
    --output <dir>       Output directory (default: current dir).
    --format <formats>   Comma-separated formats (md,json). Empty writes all.
    --top-words <k>      Number of most common words to keep (default: 5).
    --ngram <n>          Count single words (1), bigrams (2) or trigrams (3).
    --ascii-labels       Replace Polish diacritics in names.

Examples:
  recap analyze inbox/ekipa_abc123 --stopwords stopwords_pl.txt
  recap analyze inbox/ekipa_abc123 --window 2023 --format json --output reports";

const HELP_RENDER: &str = "\
Render a saved report

Usage:
    recap render --json-stats <path> [--output <dir>] [--ascii-labels]

Options:
    --json-stats <path>  Report JSON written by 'recap analyze --format json'.
    --output <dir>       Output directory (default: current dir).
    --ascii-labels       Replace Polish diacritics in names.";

#[derive(Parser)]
#[command(name = "recap", disable_help_flag = true)]
#[command(about = "Messenger conversation recap tool", long_about = None)]
struct Cli {
    /// Show help (global or per topic). Example: recap --help analyze
    #[arg(long, value_name = "TOPIC", num_args = 0..=1, default_missing_value = "")]
    help: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a conversation export folder
    Analyze {
        /// Folder containing message_*.json files
        dir: PathBuf,

        /// Newline-delimited stopword list
        #[arg(long)]
        stopwords: Option<PathBuf>,

        /// Time window ('2023', '2023-05', '2023-05-14', 'life')
        #[arg(long, default_value = "life")]
        window: String,

        /// Output directory (defaults to current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output formats (comma-separated: md,json). Writes all if empty.
        #[arg(long, default_value = "")]
        format: String,

        /// Number of most common words to keep
        #[arg(long, default_value_t = 5)]
        top_words: usize,

        /// N-gram size for word counts (1, 2 or 3)
        #[arg(long, default_value_t = 1)]
        ngram: usize,

        /// Replace Polish diacritics in rendered names
        #[arg(long)]
        ascii_labels: bool,
    },
    /// Render a previously saved JSON report
    Render {
        /// Path to the report JSON
        #[arg(long)]
        json_stats: PathBuf,

        /// Output directory (defaults to current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace Polish diacritics in rendered names
        #[arg(long)]
        ascii_labels: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(help_topic) = cli.help {
        let topic = help_topic.trim();
        if topic.is_empty() {
            println!("{}", HELP_MAIN);
        } else if topic.eq_ignore_ascii_case("analyze") {
            println!("{}", HELP_ANALYZE);
        } else if topic.eq_ignore_ascii_case("render") {
            println!("{}", HELP_RENDER);
        } else {
            println!("Unknown help topic: {}", topic);
        }
        return Ok(());
    }

    match cli.command {
        Some(Commands::Analyze {
            dir,
            stopwords,
            window,
            output,
            format,
            top_words,
            ngram,
            ascii_labels,
        }) => {
            let output_dir = prepare_output_dir(output)?;
            logging::init_logging(&output_dir.join("logs"), &dir.display().to_string())?;

            let options = AnalyzeOptions {
                stopwords: match stopwords {
                    Some(path) => load_stopwords(&path)?,
                    None => Stopwords::default(),
                },
                window: WindowScope::parse(&window)?,
                top_words,
                ngram,
                generated_at: None,
            };

            let spinner = loading_spinner();
            let conversation = load_conversation_dir(&dir, |path| {
                if let Some(ref pb) = spinner {
                    pb.set_message(format!("Loading {}", path.display()));
                }
            });
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            let conversation = conversation?;
            eprintln!(
                "Loaded {} messages from {} participants",
                conversation.messages.len(),
                conversation.participants.len()
            );

            let report = build_report(conversation.title.clone(), &conversation.messages, &options)?;
            write_outputs(&report, &output_dir, &format, &RenderOptions { ascii_labels })
        }
        Some(Commands::Render {
            json_stats,
            output,
            ascii_labels,
        }) => {
            let output_dir = prepare_output_dir(output)?;
            let report = Report::load_from_file(&json_stats)?;
            write_outputs(&report, &output_dir, "md", &RenderOptions { ascii_labels })
        }
        None => {
            eprintln!("No action specified. Use 'analyze' to build a report.");
            eprintln!("Example: recap analyze inbox/ekipa_abc123");
            Ok(())
        }
    }
}

fn prepare_output_dir(output: Option<PathBuf>) -> Result<PathBuf> {
    let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;
    Ok(output_dir)
}

/// Spinner on stderr, only when attached to a terminal.
fn loading_spinner() -> Option<ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

fn write_outputs(
    report: &Report,
    output_dir: &Path,
    format_arg: &str,
    render_options: &RenderOptions,
) -> Result<()> {
    let formats: Vec<&str> = if format_arg.trim().is_empty() {
        // Empty string means write all
        vec!["md", "json"]
    } else {
        format_arg.split(',').map(|s| s.trim()).collect()
    };

    let stem = file_stem(report.title.as_deref(), &report.window);

    for format in formats {
        match format {
            "md" => {
                let markdown = md::render(report, render_options)?;
                let output_path = output_dir.join(format!("{}.md", stem));
                std::fs::write(&output_path, markdown).with_context(|| {
                    format!("Failed to write report: {}", output_path.display())
                })?;
                eprintln!("Markdown report written to: {}", output_path.display());
            }
            "json" => {
                let output_path = output_dir.join(format!("{}.json", stem));
                report.save_to_file(&output_path)?;
                eprintln!("JSON report written to: {}", output_path.display());
            }
            _ => {
                eprintln!("Warning: Unknown format '{}', skipping", format);
            }
        }
    }

    Ok(())
}

/// Output file name stem derived from the conversation title and window.
fn file_stem(title: Option<&str>, window: &str) -> String {
    let slug: String = strip_polish(&title.unwrap_or("").to_lowercase())
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let base = if slug.is_empty() {
        "recap".to_string()
    } else {
        format!("recap-{}", slug)
    };

    if window == "life" {
        base
    } else {
        format!("{}-{}", base, window)
    }
}

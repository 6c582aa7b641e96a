/// Run logging configuration.
///
/// Logs are written to `recap.log` inside the chosen log directory.
/// Each run appends to the file, starting with a separator line.
use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_NAME: &str = "recap.log";

/// Initializes file logging for one run.
///
/// Logs go to `{log_dir}/recap.log`. Level defaults to INFO and can be
/// overridden with `RUST_LOG`.
///
/// # Arguments
///
/// * `log_dir` - Directory that receives the log file (created if missing)
/// * `run_label` - Shown in the session separator, e.g. the export directory
pub fn init_logging(log_dir: &Path, run_label: &str) -> Result<()> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    // Write session separator with timestamp before the appender opens the file
    let separator = format!(
        "\n{sep}\n[{ts}] New recap run: {label}\n{sep}\n",
        sep = "=".repeat(80),
        ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        label = run_label
    );
    {
        use std::io::Write;
        if let Ok(mut file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join(LOG_FILE_NAME))
        {
            let _ = writeln!(file, "{}", separator);
        }
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .ok(); // Ignore error if already initialized

    tracing::info!("Logging initialized for: {}", run_label);

    Ok(())
}

use chat_recap::logging;

#[test]
fn test_log_file_receives_separator_and_events() -> anyhow::Result<()> {
    let test_dir = tempfile::tempdir()?;
    let log_dir = test_dir.path().join("logs");

    logging::init_logging(&log_dir, "inbox/ekipa_123")?;

    tracing::info!("Test info message");
    tracing::warn!("Test warning message");
    tracing::trace!("Test trace message");

    let log_file = log_dir.join(logging::LOG_FILE_NAME);
    assert!(log_file.exists(), "Log file not created");

    let contents = std::fs::read_to_string(&log_file)?;
    assert!(contents.contains("New recap run: inbox/ekipa_123"));
    assert!(contents.contains(&"=".repeat(80)));
    assert!(contents.contains("Test info message"));
    assert!(contents.contains("Test warning message"));
    assert!(
        !contents.contains("Test trace message"),
        "trace should be filtered at the default level"
    );

    // A second run appends rather than truncating.
    logging::init_logging(&log_dir, "second run")?;
    let contents = std::fs::read_to_string(&log_file)?;
    assert!(contents.contains("New recap run: inbox/ekipa_123"));
    assert!(contents.contains("New recap run: second run"));

    Ok(())
}

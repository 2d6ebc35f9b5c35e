use std::fs::OpenOptions;

use anyhow::{Context, Result};

/// Install the global logger.
///
/// With a log file, everything at info and above is appended there with
/// timestamps. Without one, plain commands log warnings to stderr (tunable
/// via `RUST_LOG`) and the full-screen board stays silent so log lines
/// cannot garble the display.
pub fn init(log_file: Option<&str>, full_screen: bool) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {path}"))?;
            builder
                .target(env_logger::Target::Pipe(Box::new(file)))
                .filter_level(log::LevelFilter::Info)
                .format_timestamp_secs();
        }
        None if full_screen => {
            builder.filter_level(log::LevelFilter::Off);
        }
        None => {
            builder
                .filter_level(log::LevelFilter::Warn)
                .format_timestamp(None)
                .parse_default_env();
        }
    }
    builder.try_init().context("logger already initialized")?;
    Ok(())
}

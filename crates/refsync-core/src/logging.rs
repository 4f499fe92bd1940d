//! Logging init: `fmt` subscriber on stderr with an `EnvFilter`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Levels accepted by `--log-level`.
pub const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Filter for the given CLI level, case-insensitive; `warning` is read as `warn`.
/// `RUST_LOG`, when set and valid, wins.
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let mut level = level.to_ascii_lowercase();
    if level == "warning" {
        level = "warn".to_string();
    }
    if !LEVELS.contains(&level.as_str()) {
        anyhow::bail!("unknown log level '{}' (expected one of {})", level, LEVELS.join(", "));
    }
    // At debug and trace only our own crates go verbose.
    let directive = match level.as_str() {
        "debug" | "trace" => format!("info,refsync_core={level},refsync={level}"),
        _ => level,
    };
    Ok(EnvFilter::try_new(directive)?)
}

/// Install the global subscriber. Call once, at startup.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = env_filter(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logging already initialized: {e}"))?;
    Ok(())
}

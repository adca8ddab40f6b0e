use tracing::Level;

/// Initialize tracing for the process.
///
/// `level` is a case-insensitive level name ("error", "warn", "info",
/// "debug", "trace"); anything unrecognized falls back to INFO.
/// Uses `try_init` so tests and embedding libraries can call this more
/// than once without panicking.
pub fn init(level: &str) {
    let lvl: Level = level.parse().unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(lvl)
        .with_target(false)
        .try_init();
}

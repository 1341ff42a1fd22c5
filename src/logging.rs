// Logging setup
// The TUI owns the terminal, so interactive sessions log to a file

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured filter
pub const LOG_ENV: &str = "HASHCHECK_LOG";

pub enum LogTarget {
    /// Append to `<data_dir>/hashcheck/hashcheck.log`
    File,
    Stderr,
}

impl LogTarget {
    /// Filter used when neither flag, environment nor config set one.
    /// Stderr stays quiet so log lines do not tear the progress bar.
    pub fn default_filter(&self) -> &'static str {
        match self {
            LogTarget::File => "info",
            LogTarget::Stderr => "warn",
        }
    }
}

pub fn log_file_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("hashcheck")
        .join("hashcheck.log")
}

/// Pick the filter: explicit flag, then `HASHCHECK_LOG`, then the config value,
/// then the target's default
pub fn resolve_filter(flag: Option<&str>, configured: Option<&str>, target: &LogTarget) -> Result<EnvFilter> {
    let directive = match (flag, std::env::var(LOG_ENV).ok(), configured) {
        (Some(level), _, _) => level.to_string(),
        (None, Some(env), _) => env,
        (None, None, Some(level)) => level.to_string(),
        (None, None, None) => target.default_filter().to_string(),
    };
    EnvFilter::try_new(&directive).with_context(|| format!("Invalid log filter: {}", directive))
}

pub fn init(target: LogTarget, filter: EnvFilter) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let result = match target {
        LogTarget::File => {
            let path = log_file_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}

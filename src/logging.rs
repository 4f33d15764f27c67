use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::model::config::LogConfig;

/// Environment variable holding a `tracing` filter directive
pub const LOG_ENV: &str = "CARDSHIFT_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Pick the filter directive: environment first, then board.toml, then warn.
fn directive(env_value: Option<String>, configured: Option<&str>) -> String {
    env_value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| {
            configured
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}

fn env_filter(configured: Option<&str>) -> EnvFilter {
    let directive = directive(std::env::var(LOG_ENV).ok(), configured);
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// CLI commands log to stderr so stdout stays parseable
pub fn init_cli_logging(config: Option<&LogConfig>) {
    let filter = env_filter(config.and_then(|c| c.level.as_deref()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// The TUI owns the terminal, so it logs to `[log] file` (relative to
/// `kanban/`) or nowhere.
pub fn init_tui_logging(kanban_dir: &Path, config: &LogConfig) {
    let filter = env_filter(config.level.as_deref());
    let file = config.file.as_deref().and_then(|name| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(kanban_dir.join(name))
            .ok()
    });
    match file {
        Some(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_wins_over_config() {
        assert_eq!(
            directive(Some("debug".into()), Some("info")),
            "debug".to_string()
        );
    }

    #[test]
    fn config_used_when_environment_empty() {
        assert_eq!(directive(Some("  ".into()), Some("info")), "info");
        assert_eq!(directive(None, Some("cardshift=trace")), "cardshift=trace");
    }

    #[test]
    fn defaults_to_warn() {
        assert_eq!(directive(None, None), "warn");
        assert_eq!(directive(None, Some("")), "warn");
    }
}

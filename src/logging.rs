//! Tracing subscriber setup for the CLI.

use tracing_subscriber::{fmt, EnvFilter};

/// Pick the filter: `RUST_LOG` wins over the configured level unless
/// `force` is set (the `--verbose` flag).
fn build_filter(log_level: &str, force: bool, from_env: Option<EnvFilter>) -> EnvFilter {
    match from_env {
        Some(filter) if !force => filter,
        _ => EnvFilter::new(log_level),
    }
}

/// Install the global subscriber.
pub fn init_tracing(log_level: &str, force: bool) {
    let filter = build_filter(log_level, force, EnvFilter::try_from_default_env().ok());
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_wins_without_force() {
        let filter = build_filter("info", false, Some(EnvFilter::new("warn")));
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn test_force_overrides_env_filter() {
        let filter = build_filter("debug", true, Some(EnvFilter::new("warn")));
        assert_eq!(filter.to_string(), "debug");

        let filter = build_filter("info", false, None);
        assert_eq!(filter.to_string(), "info");
    }
}

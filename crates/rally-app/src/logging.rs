//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global `fmt` subscriber writing to stderr.
///
/// `RUST_LOG` wins over `config.level`. Returns `false` if a global
/// subscriber was already installed (the existing one is kept).
pub fn init(config: &LoggingConfig) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter(config))
        .with_ansi(config.ansi)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        let config = LoggingConfig::default();
        let _ = init(&config);
        assert!(!init(&config));
    }

    #[test]
    fn bad_level_falls_back() {
        let config = LoggingConfig {
            level: "[".to_string(),
            ansi: false,
        };
        // Must not panic; RUST_LOG may be set in CI so only the type is checked.
        let _filter: EnvFilter = filter(&config);
    }
}

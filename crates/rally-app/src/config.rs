//! App configuration.
//!
//! Loaded from TOML, then overridden by `RALLY_*` environment variables,
//! then validated:
//!
//! ```toml
//! initial_screen = "home"          # or "login" (default)
//! state_path = "/data/rally/nav.cbor"
//! persist_on_shutdown = true
//!
//! [logging]
//! level = "info,rally_nav=debug"
//! ansi = false
//! ```

use std::path::{Path, PathBuf};

use rally_core::{RallyError, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::screens::Screen;

/// Environment variable overriding [`AppConfig::initial_screen`].
pub const ENV_INITIAL_SCREEN: &str = "RALLY_INITIAL_SCREEN";
/// Environment variable overriding [`AppConfig::state_path`].
pub const ENV_STATE_PATH: &str = "RALLY_STATE_PATH";
/// Environment variable overriding [`LoggingConfig::level`].
pub const ENV_LOG_LEVEL: &str = "RALLY_LOG_LEVEL";

/// Screen a session starts on when nothing was persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialScreen {
    /// Sign-in screen
    #[default]
    Login,
    /// Community discovery (already signed in)
    Home,
}

impl InitialScreen {
    /// Navigation config for this choice.
    pub fn screen(self) -> Screen {
        match self {
            InitialScreen::Login => Screen::Login,
            InitialScreen::Home => Screen::Home,
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "login" => Ok(InitialScreen::Login),
            "home" => Ok(InitialScreen::Home),
            other => Err(RallyError::invalid(format!(
                "initial_screen must be \"login\" or \"home\", got \"{other}\""
            ))),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    /// Colored output
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: false,
        }
    }
}

/// Top-level app configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Screen used when no history is persisted or it fails to decode
    pub initial_screen: InitialScreen,
    /// Where navigation history is persisted; `None` disables persistence
    pub state_path: Option<PathBuf>,
    /// Save history when the app shuts down
    pub persist_on_shutdown: bool,
    /// Logging
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_screen: InitialScreen::default(),
            state_path: None,
            persist_on_shutdown: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RallyError::invalid(format!("Invalid config: {e}")))
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RallyError::from(e).with_context(format!("reading {}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load, apply environment overrides and validate.
    pub fn load_validated(path: &Path) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `RALLY_*` overrides from the process environment.
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `RALLY_*` overrides from `vars`; other keys are ignored.
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            match key.as_ref() {
                ENV_INITIAL_SCREEN => self.initial_screen = InitialScreen::parse(&value.into())?,
                ENV_STATE_PATH => {
                    let value = value.into();
                    self.state_path = if value.is_empty() {
                        None
                    } else {
                        Some(PathBuf::from(value))
                    };
                }
                ENV_LOG_LEVEL => self.logging.level = value.into(),
                _ => {}
            }
        }
        Ok(())
    }

    /// Check values that parse but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.logging.level.trim().is_empty() {
            return Err(RallyError::invalid("logging.level must not be empty"));
        }
        EnvFilter::try_new(&self.logging.level).map_err(|e| {
            RallyError::invalid(format!(
                "logging.level \"{}\" is not a valid filter: {e}",
                self.logging.level
            ))
        })?;
        if let Some(path) = &self.state_path {
            if path.as_os_str().is_empty() {
                return Err(RallyError::invalid("state_path must not be empty"));
            }
            if path.is_dir() {
                return Err(RallyError::invalid(format!(
                    "state_path {} is a directory",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Screen used when no history can be restored.
    pub fn initial_screen(&self) -> Screen {
        self.initial_screen.screen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.initial_screen(), Screen::Login);
        assert!(config.state_path.is_none());
        assert!(config.persist_on_shutdown);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn parses_full_document() {
        let config = AppConfig::from_toml_str(
            r#"
            initial_screen = "home"
            state_path = "/tmp/rally/nav.cbor"
            persist_on_shutdown = false

            [logging]
            level = "debug"
            ansi = true
            "#,
        )
        .unwrap();
        assert_eq!(config.initial_screen(), Screen::Home);
        assert_eq!(config.state_path, Some(PathBuf::from("/tmp/rally/nav.cbor")));
        assert!(!config.persist_on_shutdown);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.ansi);
    }

    #[test]
    fn rejects_unknown_screen_and_fields() {
        assert_matches!(
            AppConfig::from_toml_str(r#"initial_screen = "settings""#),
            Err(RallyError::Invalid { .. })
        );
        assert_matches!(
            AppConfig::from_toml_str("theme = \"dark\""),
            Err(RallyError::Invalid { .. })
        );
    }

    #[test]
    fn env_overrides() {
        let mut config = AppConfig::default();
        config
            .merge_with_vars([
                (ENV_INITIAL_SCREEN, "Home"),
                (ENV_STATE_PATH, "/var/rally/state.cbor"),
                (ENV_LOG_LEVEL, "warn"),
                ("HOME", "/root"),
            ])
            .unwrap();
        assert_eq!(config.initial_screen(), Screen::Home);
        assert_eq!(config.state_path, Some(PathBuf::from("/var/rally/state.cbor")));
        assert_eq!(config.logging.level, "warn");

        config.merge_with_vars([(ENV_STATE_PATH, "")]).unwrap();
        assert!(config.state_path.is_none());
    }

    #[test]
    fn env_rejects_bad_screen() {
        let mut config = AppConfig::default();
        assert_matches!(
            config.merge_with_vars([(ENV_INITIAL_SCREEN, "feed")]),
            Err(RallyError::Invalid { .. })
        );
    }

    #[test]
    fn validate_rejects_bad_filter() {
        let mut config = AppConfig::default();
        config.logging.level = "info,[".to_string();
        assert_matches!(config.validate(), Err(RallyError::Invalid { .. }));

        config.logging.level = "  ".to_string();
        assert_matches!(config.validate(), Err(RallyError::Invalid { .. }));
    }

    #[test]
    fn validate_rejects_directory_state_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            state_path: Some(dir.path().to_path_buf()),
            ..AppConfig::default()
        };
        assert_matches!(config.validate(), Err(RallyError::Invalid { .. }));
    }
}

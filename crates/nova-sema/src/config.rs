//! Analyzer configuration, loaded from TOML.

use std::path::Path;
use std::sync::Once;

use nova_classpath::ClasspathEntry;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Entries searched in order for binary classes.
    #[serde(default)]
    pub classpath: Vec<ClasspathEntry>,

    /// Packages whose types are visible without an import, searched after
    /// the on-demand imports.
    #[serde(default = "AnalyzerConfig::default_implicit_imports")]
    pub implicit_imports: Vec<String>,

    /// Record every identifier resolved to a symbol in that symbol's
    /// usage list.
    #[serde(default = "default_true")]
    pub record_usages: bool,

    /// Log a warning for every class referenced but missing from the
    /// classpath. The not-found set is filled either way.
    #[serde(default = "default_true")]
    pub report_missing_classes: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_true() -> bool {
    true
}

impl AnalyzerConfig {
    fn default_implicit_imports() -> Vec<String> {
        vec!["java.lang".to_owned()]
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            classpath: Vec::new(),
            implicit_imports: Self::default_implicit_imports(),
            record_usages: true,
            report_missing_classes: true,
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A simple level (`info`, `debug`, ...) or a full `EnvFilter` directive
    /// string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// The effective filter: the configured level, with `RUST_LOG` merged in
    /// when set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);
        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs the global `tracing` subscriber for an embedding process.
/// Only the first call has an effect.
pub fn init_tracing(logging: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::layer::SubscriberExt as _;
        use tracing_subscriber::Layer as _;

        let filter = logging.env_filter();
        let base_layer = if logging.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };
        let subscriber = tracing_subscriber::registry().with(filter).with(base_layer);
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config_uses_defaults() {
        let config = AnalyzerConfig::load_from_str("").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.implicit_imports, vec!["java.lang".to_owned()]);
        assert!(config.record_usages);
    }

    #[test]
    fn parses_classpath_and_flags() {
        let config = AnalyzerConfig::load_from_str(
            r#"
            record_usages = false
            implicit_imports = []

            [[classpath]]
            kind = "jar"
            path = "/opt/rt.jar"

            [logging]
            level = "WARNING"
            "#,
        )
        .unwrap();
        assert!(!config.record_usages);
        assert!(config.implicit_imports.is_empty());
        assert_eq!(config.classpath.len(), 1);
        assert_eq!(config.classpath[0].path(), Path::new("/opt/rt.jar"));
        assert_eq!(
            LoggingConfig::normalize_level_directives(&config.logging.level),
            "warn"
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AnalyzerConfig::load_from_str("recordUsages = true").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)), "{err:?}");
    }

    #[test]
    fn load_from_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nova-sema.toml");
        let err = AnalyzerConfig::load_from_path(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        std::fs::write(&missing, "report_missing_classes = false\n").unwrap();
        let config = AnalyzerConfig::load_from_path(&missing).unwrap();
        assert!(!config.report_missing_classes);
    }
}

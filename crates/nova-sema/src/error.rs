use thiserror::Error;

#[derive(Debug, Error)]
pub enum SemaError {
    /// A class is (transitively) its own superclass. The only error that
    /// aborts an analysis.
    #[error("cyclic class hierarchy detected with symbol {class}")]
    CyclicHierarchy { class: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Toml(value.message().to_owned())
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] Box<figment::Error>),

    #[error("Missing required environment setting: {0}")]
    MissingEnvironment(String),

    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("Invalid chain configuration: {0}")]
    Chain(#[from] reveal_chain::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

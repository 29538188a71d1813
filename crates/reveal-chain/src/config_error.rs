use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid contract address '{address}'")]
    InvalidContractAddress { address: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

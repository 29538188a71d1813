use std::path::{Path, PathBuf};

use clap::{Arg, Command};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::Deserialize;

use super::{Config, ConfigRaw, defaults};
use crate::config::ConfigError;

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const DEFAULT_ENVIRONMENT: &str = "development";
const ENV_PREFIX: &str = "REVEAL_";

#[derive(Debug, Deserialize)]
struct EnvironmentConfig {
    environment: Option<String>,
}

/// Load and validate configuration from defaults, `config.toml`, an optional
/// `--config <FILE>` and `REVEAL_*` environment variables (highest priority).
pub(crate) fn load_configuration() -> Result<Config, ConfigError> {
    let matches = Command::new("reveal-engine")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file (.toml format)"),
        )
        .get_matches();

    let custom_config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let environment = resolve_environment(custom_config_path.as_deref())?;

    tracing::info!("Loading configuration for environment: {}", environment);

    let mut files = Vec::new();
    if Path::new(DEFAULT_CONFIG_FILE).exists() {
        files.push(PathBuf::from(DEFAULT_CONFIG_FILE));
    }
    if let Some(path) = custom_config_path {
        tracing::info!("Loading custom config file: {}", path.display());
        files.push(path);
    }

    let figment = layered_figment(&environment, &files)?
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    extract(figment, &environment)
}

/// Defaults for `environment` with each file merged on top, in order.
fn layered_figment(environment: &str, files: &[PathBuf]) -> Result<Figment, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(defaults::config_for(environment)?));
    for file in files {
        figment = figment.merge(Toml::file(file));
    }
    Ok(figment)
}

fn extract(figment: Figment, environment: &str) -> Result<Config, ConfigError> {
    let config: ConfigRaw = figment.extract().map_err(Box::new)?;
    if config.environment != environment {
        return Err(ConfigError::UnknownEnvironment(format!(
            "config environment '{}' does not match selected '{}'",
            config.environment, environment
        )));
    }

    let config = config.resolve()?;
    tracing::info!("Configuration loaded successfully");
    Ok(config)
}

/// The environment named by the custom config file, else `config.toml`, else
/// development when no config file is present at all.
fn resolve_environment(custom_config_path: Option<&Path>) -> Result<String, ConfigError> {
    let config_path = custom_config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));

    if !config_path.exists() {
        if custom_config_path.is_some() {
            return Err(ConfigError::InvalidConfig(format!(
                "config file not found: {}",
                config_path.display()
            )));
        }
        return Ok(DEFAULT_ENVIRONMENT.to_string());
    }

    let env = read_environment_from(config_path).ok_or_else(|| {
        ConfigError::MissingEnvironment(
            "set environment = \"development|testnet|mainnet\" in your config".to_string(),
        )
    })?;

    if !matches!(env.as_str(), "development" | "testnet" | "mainnet") {
        return Err(ConfigError::UnknownEnvironment(env));
    }

    Ok(env)
}

fn read_environment_from(path: &Path) -> Option<String> {
    Figment::from(Toml::file(path))
        .extract::<EnvironmentConfig>()
        .ok()
        .and_then(|config| config.environment)
        .map(|env| env.trim().to_lowercase())
}

//! Layered configuration loading.
//!
//! Every binary resolves its configuration the same way:
//! 1) serialized defaults -> 2) YAML file (if provided) -> 3) env (`<PREFIX>__*`)
//!
//! CLI overrides are applied by the caller on the extracted struct.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Configuration error for layered config loading
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file does not exist: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
    #[error("failed to render configuration: {0}")]
    Render(#[from] serde_json::Error),
}

/// Build the layered `Figment` without extracting it.
fn layered<T: Serialize>(defaults: &T, path: Option<&Path>, env_prefix: &str) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(defaults));
    if let Some(path) = path {
        figment = figment.merge(Yaml::file(path));
    }
    figment.merge(Env::prefixed(&format!("{env_prefix}__")).split("__"))
}

/// Load a typed configuration from defaults, an optional YAML file and the
/// environment.
///
/// Environment keys use `__` as the nesting separator, e.g.
/// `GATEWAY__CALCULATOR__URI=http://calc:50051` sets `calculator.uri`.
///
/// # Errors
/// Returns [`ConfigError::FileNotFound`] if `path` is given but is not a file,
/// and [`ConfigError::Invalid`] if the merged layers do not deserialize into `T`.
pub fn load_layered<T>(defaults: &T, path: Option<&Path>, env_prefix: &str) -> Result<T, ConfigError>
where
    T: Serialize + DeserializeOwned,
{
    if let Some(path) = path
        && !path.is_file()
    {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    layered(defaults, path, env_prefix)
        .extract()
        .map_err(|e| ConfigError::Invalid(Box::new(e)))
}

/// Render the effective configuration as pretty JSON (for `--print-config`).
///
/// # Errors
/// Returns [`ConfigError::Render`] if the value cannot be serialized.
pub fn render<T: Serialize>(config: &T) -> Result<String, ConfigError> {
    Ok(serde_json::to_string_pretty(config)?)
}

//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the listening port.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Missing {0} env")]
    MissingCredential(&'static str),

    #[error("Credential in {0} is not a valid header value")]
    InvalidCredential(&'static str),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ProxyConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the effective configuration: file (or defaults), then environment.
pub fn load(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    let config = apply_env_overrides(config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides using the given lookup.
///
/// Takes a lookup function rather than reading the process environment so
/// callers can test it without mutating global state.
pub fn apply_env_overrides<F>(mut config: ProxyConfig, lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(PORT_ENV) {
        let port: u16 = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            name: PORT_ENV,
            value: value.clone(),
        })?;
        config.listener.set_port(port);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_partial_toml_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[listener]
bind_address = "127.0.0.1:4100"

[download]
allowed_hosts = ["storage.googleapis.com"]
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4100");
        assert_eq!(config.download.allowed_hosts, vec!["storage.googleapis.com"]);
        assert_eq!(config.timeouts.upstream_secs, 120);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener\nbind_address = 1").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn invalid_values_are_validation_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timeouts]\nupstream_secs = 0").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("upstream_secs"));
    }

    #[test]
    fn port_env_overrides_bind_address() {
        let config = apply_env_overrides(ProxyConfig::default(), |name| {
            (name == PORT_ENV).then(|| "8088".to_string())
        })
        .unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8088");
    }

    #[test]
    fn bad_port_env_rejected() {
        let err = apply_env_overrides(ProxyConfig::default(), |_| Some("eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: PORT_ENV, .. }));
    }

    #[test]
    fn no_env_keeps_defaults() {
        let config = apply_env_overrides(ProxyConfig::default(), |_| None).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3001");
    }
}

//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::BridgeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<BridgeConfig, ConfigError> {
    let config: BridgeConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Backpressure, LogFormat, PoolMode};

    const SAMPLE: &str = r#"
[listener]
bind_address = "127.0.0.1:8080"

[pool]
mode = "separate-thread"
pool_size = 2
logging = true
exit_on_stop = true
backpressure = "reject"

[[routes]]
method = "get"
url = "/helloworld"
handler = "helloworld"

[[routes]]
method = "get"
url = "/user/:userId"
handler = "user"

[observability]
log_format = "json"
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.pool.mode, PoolMode::SeparateThread);
        assert_eq!(config.pool.pool_size, 2);
        assert!(config.pool.logging);
        assert_eq!(config.pool.backpressure, Backpressure::Reject);
        assert_eq!(config.pool.queue_capacity, 1024);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[1].url, "/user/:userId");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.timeouts.dispatch_secs, 30);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_config("[pool]\nmode = \"fork\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_config("[[routes]]\nmethod = \"get\"\nurl = \"\"\nhandler = \"h\"\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: routes[0]: route pattern is empty"
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

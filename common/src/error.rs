use thiserror::Error;

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {field}")]
    MissingField { field: String },

    #[error("Invalid slide range {min}..={max}: both must lie in 3..=15 with min <= max")]
    InvalidBounds { min: usize, max: usize },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read config file: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {source}")]
    ParseError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML config: {source}")]
    TomlParseError {
        #[from]
        source: toml::de::Error,
    },
}

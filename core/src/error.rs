use slidegen_common::ConfigError;
use std::fmt;
use thiserror::Error;

/// Core error types for deck generation
#[derive(Error, Debug)]
pub enum SlideError {
    /// The model gave no usable outline; nothing was rendered
    #[error("Outline generation failed: {reason}")]
    Generation { reason: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport errors talking to a remote API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Image decoding/encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// ZIP container errors while writing the deck
    #[error("Package error: {0}")]
    Package(#[from] zip::result::ZipError),

    /// Slide XML generation errors
    #[error("XML error: {0}")]
    Xml(String),

    /// Generic errors
    #[error("Error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl From<fmt::Error> for SlideError {
    fn from(e: fmt::Error) -> Self {
        SlideError::Xml(e.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SlideError>;

/// Error reporting utilities
pub struct ErrorReporter;

impl ErrorReporter {
    /// Format error for user display
    pub fn format_user_error(error: &SlideError) -> String {
        match error {
            SlideError::Generation { .. } => {
                "❌ Failed to generate the presentation.\n💡 The model did not return a usable outline; try again or rephrase the topic".to_string()
            }
            SlideError::Config(config_err) => Self::format_config_error(config_err),
            SlideError::Io(io_err) => format!("File operation failed: {io_err}"),
            SlideError::Json(json_err) => format!("Data format error: {json_err}"),
            SlideError::Http(http_err) => format!(
                "🌐 Request failed: {http_err}\n💡 Check your network connection and API keys"
            ),
            SlideError::Image(_) | SlideError::Package(_) | SlideError::Xml(_) => {
                format!("📄 Could not write the deck: {error}")
            }
            SlideError::Generic(anyhow_err) => format!("Unexpected error: {anyhow_err}"),
        }
    }

    fn format_config_error(error: &ConfigError) -> String {
        match error {
            ConfigError::MissingField { field } => {
                format!("⚙️  Missing configuration: {field}\n💡 Export the key or add it to the config file")
            }
            ConfigError::InvalidBounds { .. } => {
                format!("⚙️  {error}\n💡 Pick a slide range between 3 and 15")
            }
            ConfigError::FileNotFound { path } => {
                format!("📄 Configuration file not found: {path}\n💡 Create the configuration file or check the path")
            }
            _ => format!("⚙️  Configuration error: {error}"),
        }
    }
}

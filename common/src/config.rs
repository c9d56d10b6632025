use crate::bounds::SlideBounds;
use crate::error::ConfigError;
use crate::font::FontFamily;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const TEXT_API_KEY_ENV: &str = "DEEPSEEK_API_KEY";
pub const IMAGE_API_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";

/// Everything a generation run needs, passed explicitly to each client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    pub text_api_key: Option<String>,
    pub text_base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub image_api_key: Option<String>,
    pub image_base_url: String,
    pub output_dir: Option<PathBuf>,
    pub font: FontFamily,
    pub min_slides: usize,
    pub max_slides: usize,
}

impl Default for DeckConfig {
    fn default() -> Self {
        let bounds = SlideBounds::default();
        Self {
            text_api_key: None,
            text_base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            max_tokens: 2048,
            temperature: 0.7,
            image_api_key: None,
            image_base_url: "https://api.unsplash.com".to_string(),
            output_dir: None,
            font: FontFamily::default(),
            min_slides: bounds.min(),
            max_slides: bounds.max(),
        }
    }
}

impl DeckConfig {
    /// Default config file location (`<config dir>/slidegen/config.json`).
    pub fn config_path() -> Option<PathBuf> {
        let dir = dirs::config_dir()?.join("slidegen");
        ["config.json", "config.toml"]
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
    }

    /// Defaults, then the config file (explicit or default location), then
    /// the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                Self::load_from_file(path)?
            }
            None => match Self::config_path() {
                Some(default_path) => {
                    tracing::debug!("Loading configuration from {}", default_path.display());
                    Self::load_from_file(&default_path)?
                }
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a JSON or TOML file (chosen by extension).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(serde_json::from_str(&contents)?)
        }
    }

    /// Overlay values from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(TEXT_API_KEY_ENV) {
            self.text_api_key = Some(key);
        }
        if let Some(key) = get(IMAGE_API_KEY_ENV) {
            self.image_api_key = Some(key);
        }
        if let Some(model) = get("SLIDEGEN_MODEL") {
            self.model = model;
        }
        if let Some(url) = get("SLIDEGEN_BASE_URL") {
            self.text_base_url = url;
        }
        if let Some(url) = get("SLIDEGEN_IMAGE_BASE_URL") {
            self.image_base_url = url;
        }
        if let Some(dir) = get("SLIDEGEN_OUTPUT_DIR") {
            self.output_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn text_api_key(&self) -> Result<&str, ConfigError> {
        self.text_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField {
                field: format!("text_api_key (set {TEXT_API_KEY_ENV})"),
            })
    }

    pub fn image_api_key(&self) -> Result<&str, ConfigError> {
        self.image_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField {
                field: format!("image_api_key (set {IMAGE_API_KEY_ENV})"),
            })
    }

    pub fn bounds(&self) -> Result<SlideBounds, ConfigError> {
        SlideBounds::new(self.min_slides, self.max_slides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_defaults() {
        let env: HashMap<&str, &str> = [
            (TEXT_API_KEY_ENV, "sk-text"),
            (IMAGE_API_KEY_ENV, "img-key"),
            ("SLIDEGEN_MODEL", "deepseek-reasoner"),
            ("SLIDEGEN_OUTPUT_DIR", ""),
        ]
        .into_iter()
        .collect();

        let mut config = DeckConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.text_api_key().unwrap(), "sk-text");
        assert_eq!(config.image_api_key().unwrap(), "img-key");
        assert_eq!(config.model, "deepseek-reasoner");
        assert_eq!(config.output_dir, None);
    }

    #[test]
    fn missing_key_is_reported() {
        let config = DeckConfig::default();
        assert!(matches!(
            config.text_api_key(),
            Err(ConfigError::MissingField { .. })
        ));
    }

    #[test]
    fn loads_partial_toml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("config.toml");
        std::fs::write(&toml_path, "model = \"m1\"\nmin_slides = 4\n").unwrap();
        let config = DeckConfig::load_from_file(&toml_path).unwrap();
        assert_eq!(config.model, "m1");
        assert_eq!(config.bounds().unwrap(), SlideBounds::new(4, 10).unwrap());

        let json_path = dir.path().join("config.json");
        std::fs::write(&json_path, r#"{"font": "Georgia", "max_tokens": 512}"#).unwrap();
        let config = DeckConfig::load_from_file(&json_path).unwrap();
        assert_eq!(config.font, FontFamily::Georgia);
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.text_base_url, "https://api.deepseek.com");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DeckConfig::load(Some(dir.path().join("nope.json").as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn serialized_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.json");
        let config = DeckConfig {
            font: FontFamily::Tahoma,
            ..DeckConfig::default()
        };
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(DeckConfig::load_from_file(&path).unwrap().font, FontFamily::Tahoma);
    }
}

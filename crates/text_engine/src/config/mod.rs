//! Configuration system
//!
//! Label and rich text presets are plain serde structs. Anything that
//! implements [`Config`] can be kept in a `.toml` or `.ron` file next to the
//! assets that use it.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_with_format(&contents, path)
    }

    /// Parse configuration text, choosing the format from `path`'s extension
    fn from_str_with_format(contents: &str, path: &str) -> Result<Self, ConfigError> {
        match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Pick the format from a file name
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            Ok(Self::Toml)
        } else if path.ends_with(".ron") {
            Ok(Self::Ron)
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Preset {
        font_size: f32,
        wrap: bool,
        name: String,
    }

    impl Default for Preset {
        fn default() -> Self {
            Self { font_size: 32.0, wrap: true, name: "body".to_string() }
        }
    }

    impl Config for Preset {}

    #[test]
    fn test_unsupported_extension() {
        let err = Preset::from_str_with_format("", "preset.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_checks_extension_before_reading() {
        let err = Preset::load_from_file("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let preset = Preset::from_str_with_format("font_size = 18.0", "preset.toml").unwrap();
        assert_eq!(preset.font_size, 18.0);
        assert!(preset.wrap);
        assert_eq!(preset.name, "body");
    }

    #[test]
    fn test_save_and_load_ron() {
        let path = std::env::temp_dir().join(format!("text_engine_preset_{}.ron", std::process::id()));
        let path = path.to_string_lossy().to_string();
        let preset = Preset { font_size: 12.0, wrap: false, name: "caption".to_string() };

        preset.save_to_file(&path).unwrap();
        let loaded = Preset::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, preset);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = Preset::from_str_with_format("font_size = [", "preset.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

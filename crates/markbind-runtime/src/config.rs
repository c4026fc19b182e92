#![forbid(unsafe_code)]

//! Attribute schema for the binder.
//!
//! The defaults reproduce the standard vocabulary:
//!
//! | Attribute | Value |
//! |---|---|
//! | `data-controller` | class name |
//! | `data-action` | `<event>-><class>#<method>` descriptors |
//! | `data-<class>-target` | target name |
//!
//! With the `config` feature the schema can be loaded from TOML or JSON:
//!
//! ```toml
//! # markbind.toml
//! controller_attribute = "data-widget"
//! action_attribute = "data-on"
//! settle_limit = 16
//! ```
//!
//! Missing keys keep their defaults.

use std::fmt;
#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Names of the marker attributes and flush limits.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct BinderConfig {
    /// Marks a controller root; the value is the class name.
    pub controller_attribute: String,
    /// Holds action descriptors.
    pub action_attribute: String,
    /// Target attribute is `<prefix><class><suffix>`.
    pub target_attribute_prefix: String,
    pub target_attribute_suffix: String,
    /// Maximum batches [`crate::Binder::settle`] delivers before giving up.
    pub settle_limit: usize,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            controller_attribute: "data-controller".into(),
            action_attribute: "data-action".into(),
            target_attribute_prefix: "data-".into(),
            target_attribute_suffix: "-target".into(),
            settle_limit: 32,
        }
    }
}

fn check_attribute_part(errors: &mut Vec<String>, field: &str, value: &str, allow_empty: bool) {
    if value.is_empty() && !allow_empty {
        errors.push(format!("{field} must not be empty"));
    }
    if value.chars().any(char::is_whitespace) {
        errors.push(format!("{field} must not contain whitespace, got {value:?}"));
    }
    if value.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(format!("{field} must be lowercase, got {value:?}"));
    }
}

impl BinderConfig {
    /// The target attribute name for `class`, lowercased like every
    /// attribute name the document stores.
    #[must_use]
    pub fn target_attribute(&self, class: &str) -> String {
        format!(
            "{}{}{}",
            self.target_attribute_prefix, class, self.target_attribute_suffix
        )
        .to_ascii_lowercase()
    }

    /// Check the schema. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_attribute_part(
            &mut errors,
            "controller_attribute",
            &self.controller_attribute,
            false,
        );
        check_attribute_part(&mut errors, "action_attribute", &self.action_attribute, false);
        check_attribute_part(
            &mut errors,
            "target_attribute_prefix",
            &self.target_attribute_prefix,
            true,
        );
        check_attribute_part(
            &mut errors,
            "target_attribute_suffix",
            &self.target_attribute_suffix,
            true,
        );
        if self.target_attribute_prefix.is_empty() && self.target_attribute_suffix.is_empty() {
            errors.push("target attribute prefix and suffix must not both be empty".into());
        }
        if self.controller_attribute == self.action_attribute {
            errors.push(format!(
                "controller_attribute and action_attribute must differ, both are {:?}",
                self.controller_attribute
            ));
        }
        if self.settle_limit == 0 {
            errors.push("settle_limit must be > 0".into());
        }
        errors
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Parse, then validate.
    #[cfg(feature = "config")]
    pub fn load_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::from_toml_file(path)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading a [`BinderConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BinderConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.target_attribute("counter"), "data-counter-target");
    }

    #[test]
    fn target_attribute_is_lowercased() {
        let config = BinderConfig::default();
        assert_eq!(config.target_attribute("myCounter"), "data-mycounter-target");
    }

    #[test]
    fn validate_reports_each_problem() {
        let config = BinderConfig {
            controller_attribute: "data action".into(),
            action_attribute: "Data-Action".into(),
            target_attribute_prefix: String::new(),
            target_attribute_suffix: String::new(),
            settle_limit: 0,
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors[0].contains("controller_attribute"));
        assert!(errors[1].contains("lowercase"));
        assert!(errors[2].contains("both be empty"));
        assert!(errors[3].contains("settle_limit"));
    }

    #[test]
    fn identical_attributes_are_rejected() {
        let config = BinderConfig {
            action_attribute: "data-controller".into(),
            ..BinderConfig::default()
        };
        assert_eq!(config.validate().len(), 1);
    }

    #[cfg(feature = "config")]
    #[test]
    fn partial_toml_keeps_defaults() {
        let config = BinderConfig::from_toml_str("controller_attribute = \"data-widget\"\n").unwrap();
        assert_eq!(config.controller_attribute, "data-widget");
        assert_eq!(config.action_attribute, "data-action");
        assert_eq!(config.settle_limit, 32);
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_round_trips() {
        let config = BinderConfig {
            target_attribute_prefix: "x-".into(),
            ..BinderConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(BinderConfig::from_json_str(&json).unwrap(), config);
    }

    #[cfg(feature = "config")]
    #[test]
    fn invalid_file_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markbind.toml");
        std::fs::write(&path, "settle_limit = 0\n").unwrap();
        assert!(matches!(
            BinderConfig::load_toml_file(&path),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            BinderConfig::load_toml_file(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}

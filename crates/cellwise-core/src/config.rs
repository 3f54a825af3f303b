//! Sheet settings.
//!
//! Settings are read from TOML:
//!
//! ```toml
//! name_style = "a1"      # or "identifier"
//! normalize = "upper"    # or "lower", "none"
//! version = "default"
//! ```
//!
//! Every key is optional.

use crate::error::Result;
use crate::sheet::{Normalizer, Validator};
use cellwise_engine::engine::{is_a1_name, is_identifier_name};
use serde::Deserialize;
use std::path::Path;

/// Which cell names a sheet accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameStyle {
    /// `[A-Za-z_][A-Za-z0-9_]*`
    #[default]
    Identifier,
    /// `[A-Za-z]+[0-9]+`
    A1,
}

/// How names are canonicalized before use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    #[default]
    None,
    Upper,
    Lower,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub name_style: NameStyle,
    pub normalize: Normalization,
    pub version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            name_style: NameStyle::default(),
            normalize: Normalization::default(),
            version: "default".to_string(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Settings> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Settings> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn normalizer(&self) -> Normalizer {
        match self.normalize {
            Normalization::None => Box::new(|s: &str| s.to_string()),
            Normalization::Upper => Box::new(|s: &str| s.to_ascii_uppercase()),
            Normalization::Lower => Box::new(|s: &str| s.to_ascii_lowercase()),
        }
    }

    pub fn validator(&self) -> Validator {
        match self.name_style {
            NameStyle::Identifier => Box::new(is_identifier_name),
            NameStyle::A1 => Box::new(is_a1_name),
        }
    }
}

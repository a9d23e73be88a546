// Query layer configuration
// Loaded from TOML; every field has a default so partial documents are accepted

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Placeholder used when no method name can be extracted
pub const UNKNOWN_METHOD: &str = "UnknownMethod";

/// Placeholder used when no type name can be extracted
pub const UNKNOWN_TYPE: &str = "UnknownType";

/// Settings for [`ContextQuery`](crate::ContextQuery) and its [`Resolver`](crate::Resolver)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Report only the last path component of source file names
    pub trim_file_paths: bool,

    /// Upper bound on the nesting depth the resolver will walk; `None` means unbounded
    pub max_depth: Option<usize>,

    /// Substituted for a missing method name
    pub unknown_method: String,

    /// Substituted for a missing type name
    pub unknown_type: String,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            trim_file_paths: true,
            max_depth: None,
            unknown_method: UNKNOWN_METHOD.to_string(),
            unknown_type: UNKNOWN_TYPE.to_string(),
        }
    }
}

impl TaxonomyConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the query layer cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == Some(0) {
            return Err(ConfigError::Invalid(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.unknown_method.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "unknown_method placeholder must not be blank".to_string(),
            ));
        }
        if self.unknown_type.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "unknown_type placeholder must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

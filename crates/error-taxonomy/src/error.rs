// Crate-level failure types
// Taxonomy errors are data; these describe what can go wrong inside the crate itself

use thiserror::Error;

/// Failures reported by the checked resolver entry points
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// An error was reached again while it was still being flattened
    #[error("Invalid error structure: cycle detected at depth {depth}")]
    InvalidStructure { depth: usize },

    /// The cause graph is deeper than the configured limit
    #[error("Error structure exceeds the maximum depth of {limit}")]
    DepthExceeded { limit: usize },
}

/// Failures while loading a [`TaxonomyConfig`](crate::TaxonomyConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The document parsed but holds unusable values
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result alias defaulting to [`ResolveError`]
pub type Result<T, E = ResolveError> = std::result::Result<T, E>;

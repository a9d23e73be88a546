// Error conversion utilities
// Turns concrete errors into shared handles usable as causes and aggregate members

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

use crate::aggregate::{SharedError, TaskFailures};
use crate::error::{ConfigError, ResolveError};
use crate::taxonomy::LocalizableError;

/// Trait for converting an error into a [`SharedError`].
///
/// No blanket implementation exists: `Arc<dyn Error>` is itself an error, and
/// wrapping it again hides the concrete type from aggregate and trace probes.
/// Use [`to_shared_error`] for other error types.
pub trait IntoSharedError {
    fn into_shared_error(self) -> SharedError;
}

impl IntoSharedError for SharedError {
    fn into_shared_error(self) -> SharedError {
        self
    }
}

impl IntoSharedError for Box<dyn StdError + Send + Sync + 'static> {
    fn into_shared_error(self) -> SharedError {
        Arc::from(self)
    }
}

macro_rules! impl_into_shared_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoSharedError for $ty {
                fn into_shared_error(self) -> SharedError {
                    Arc::new(self)
                }
            }
        )*
    };
}

impl_into_shared_error!(
    LocalizableError,
    TaskFailures,
    ExternalError,
    ResolveError,
    ConfigError,
    std::io::Error,
    std::fmt::Error,
    serde_json::Error,
    toml::de::Error,
);

impl IntoSharedError for String {
    fn into_shared_error(self) -> SharedError {
        Arc::new(ExternalError::Other(self))
    }
}

impl IntoSharedError for &str {
    fn into_shared_error(self) -> SharedError {
        Arc::new(ExternalError::Other(self.to_string()))
    }
}

impl From<LocalizableError> for SharedError {
    fn from(err: LocalizableError) -> Self {
        Arc::new(err)
    }
}

impl From<TaskFailures> for SharedError {
    fn from(err: TaskFailures) -> Self {
        Arc::new(err)
    }
}

/// Errors described only by a message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExternalError {
    #[error("{0}")]
    Other(String),
}

/// Share any error type
pub fn to_shared_error<E>(err: E) -> SharedError
where
    E: StdError + Send + Sync + 'static,
{
    Arc::new(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_error_is_not_rewrapped() {
        let shared = to_shared_error(std::io::Error::other("timeout"));
        let again = shared.clone().into_shared_error();
        assert!(Arc::ptr_eq(&shared, &again));
        assert!(again.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn test_message_becomes_external_error() {
        let shared = "connection reset".into_shared_error();
        assert_eq!(shared.to_string(), "connection reset");
        assert_eq!(
            shared.downcast_ref::<ExternalError>(),
            Some(&ExternalError::Other("connection reset".to_string()))
        );
    }

    #[test]
    fn test_boxed_error_keeps_concrete_type() {
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(std::io::Error::other("eof"));
        let shared = boxed.into_shared_error();
        assert!(shared.downcast_ref::<std::io::Error>().is_some());
    }
}

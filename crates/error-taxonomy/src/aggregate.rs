// Aggregate capability
// Errors that stand for several independent failures at once

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::conversion::IntoSharedError;
use crate::site::RaiseSite;
use crate::trace::Traceable;

/// Shared handle to an error held as a wrapped cause or aggregate member
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// The error behind any number of [`SharedError`] handles.
///
/// `Arc<dyn Error>` is an error itself and forwards `source()`, so a handle
/// seen as `dyn Error` hides its aggregate members and raise site. Probes run
/// on the unwrapped value.
pub fn unwrap_shared<'a>(mut error: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    while let Some(shared) = error.downcast_ref::<SharedError>() {
        error = &**shared;
    }
    error
}

/// Capability of errors that expose an ordered collection of member errors
pub trait AggregateError {
    /// Member errors in their original order; may be empty
    fn inner_errors(&self) -> Vec<&(dyn StdError + 'static)>;

    /// Whether this particular value is aggregate-shaped.
    ///
    /// Types that only sometimes carry members (see
    /// [`LocalizableError`](crate::LocalizableError)) return `false` for
    /// their plain variants.
    fn is_aggregate_shaped(&self) -> bool {
        true
    }
}

/// Recognizes an [`AggregateError`] behind a `dyn Error`
pub type AggregateProbe =
    for<'a> fn(&'a (dyn StdError + 'static)) -> Option<&'a dyn AggregateError>;

/// Probe for a concrete [`AggregateError`] type
pub fn probe_aggregate<'a, T>(error: &'a (dyn StdError + 'static)) -> Option<&'a dyn AggregateError>
where
    T: StdError + AggregateError + 'static,
{
    error
        .downcast_ref::<T>()
        .filter(|aggregate| aggregate.is_aggregate_shaped())
        .map(|aggregate| aggregate as &dyn AggregateError)
}

pub(crate) fn as_dyn_errors(errors: &[SharedError]) -> Vec<&(dyn StdError + 'static)> {
    errors
        .iter()
        .map(|error| &**error as &(dyn StdError + 'static))
        .collect()
}

/// Failures gathered from concurrently running sub-operations
#[derive(Clone)]
pub struct TaskFailures {
    errors: Vec<SharedError>,
    site: RaiseSite,
}

impl TaskFailures {
    #[track_caller]
    pub fn new<I, E>(errors: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoSharedError,
    {
        Self {
            errors: errors
                .into_iter()
                .map(IntoSharedError::into_shared_error)
                .collect(),
            site: RaiseSite::caller(),
        }
    }

    /// Collect every successful value, or every failure if at least one operation failed
    #[track_caller]
    pub fn from_results<T, E, I>(results: I) -> Result<Vec<T>, TaskFailures>
    where
        I: IntoIterator<Item = Result<T, E>>,
        E: IntoSharedError,
    {
        let site = RaiseSite::caller();
        let mut values = Vec::new();
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(value) => values.push(value),
                Err(error) => errors.push(error.into_shared_error()),
            }
        }
        if errors.is_empty() {
            Ok(values)
        } else {
            Err(Self { errors, site })
        }
    }

    pub fn errors(&self) -> &[SharedError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn at(mut self, site: RaiseSite) -> Self {
        self.site = site;
        self
    }
}

impl fmt::Debug for TaskFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFailures")
            .field("errors", &self.errors)
            .field("site", &self.site)
            .finish()
    }
}

impl fmt::Display for TaskFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            1 => write!(f, "1 concurrent operation failed"),
            n => write!(f, "{} concurrent operations failed", n),
        }
    }
}

impl StdError for TaskFailures {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.errors
            .first()
            .map(|error| &**error as &(dyn StdError + 'static))
    }
}

impl AggregateError for TaskFailures {
    fn inner_errors(&self) -> Vec<&(dyn StdError + 'static)> {
        as_dyn_errors(&self.errors)
    }
}

impl Traceable for TaskFailures {
    fn raise_site(&self) -> Option<&RaiseSite> {
        Some(&self.site)
    }
}

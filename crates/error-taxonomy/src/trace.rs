// Stack trace capability
// Maps an error to the frames describing where it was raised

use std::error::Error as StdError;
use std::fmt;

use crate::aggregate::{unwrap_shared, TaskFailures};
use crate::site::{RaiseSite, StackFrame};
use crate::taxonomy::LocalizableError;

/// Source of frames for an error, innermost-at-capture first.
///
/// Returning no frames is a normal outcome for errors that carry no location
/// information; callers degrade to placeholders rather than failing.
pub trait StackTraceProvider: Send + Sync {
    fn frames(&self, error: &(dyn StdError + 'static)) -> Vec<StackFrame>;

    /// The innermost frame, if any
    fn first_frame(&self, error: &(dyn StdError + 'static)) -> Option<StackFrame> {
        self.frames(error).into_iter().next()
    }
}

/// Capability of errors that remember where they were raised
pub trait Traceable {
    fn raise_site(&self) -> Option<&RaiseSite>;
}

/// Recognizes a [`Traceable`] error behind a `dyn Error`
pub type TraceableProbe = for<'a> fn(&'a (dyn StdError + 'static)) -> Option<&'a dyn Traceable>;

/// Probe for a concrete [`Traceable`] error type
pub fn probe_traceable<'a, T>(error: &'a (dyn StdError + 'static)) -> Option<&'a dyn Traceable>
where
    T: StdError + Traceable + 'static,
{
    error
        .downcast_ref::<T>()
        .map(|traceable| traceable as &dyn Traceable)
}

/// Default provider: reports the captured [`RaiseSite`] of traceable errors.
///
/// Errors of types without a registered probe (for example `std::io::Error`)
/// yield no frames.
#[derive(Clone)]
pub struct RaiseSiteProvider {
    probes: Vec<TraceableProbe>,
}

impl RaiseSiteProvider {
    pub fn new() -> Self {
        Self {
            probes: vec![
                probe_traceable::<LocalizableError> as TraceableProbe,
                probe_traceable::<TaskFailures> as TraceableProbe,
            ],
        }
    }

    /// Recognize another traceable error type
    pub fn with_traceable<T>(mut self) -> Self
    where
        T: StdError + Traceable + 'static,
    {
        self.probes.push(probe_traceable::<T>);
        self
    }

    fn traceable<'a>(&self, error: &'a (dyn StdError + 'static)) -> Option<&'a dyn Traceable> {
        let error = unwrap_shared(error);
        self.probes.iter().find_map(|probe| probe(error))
    }
}

impl Default for RaiseSiteProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RaiseSiteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaiseSiteProvider")
            .field("probes", &self.probes.len())
            .finish()
    }
}

impl StackTraceProvider for RaiseSiteProvider {
    fn frames(&self, error: &(dyn StdError + 'static)) -> Vec<StackFrame> {
        self.traceable(error)
            .and_then(|traceable| traceable.raise_site())
            .map(|site| vec![site.to_frame()])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct SitedError(RaiseSite);

    impl fmt::Display for SitedError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "sited")
        }
    }

    impl StdError for SitedError {}

    impl Traceable for SitedError {
        fn raise_site(&self) -> Option<&RaiseSite> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_foreign_error_has_no_frames() {
        let provider = RaiseSiteProvider::new();
        let error = std::io::Error::other("disk full");
        assert!(provider.frames(&error).is_empty());
        assert_eq!(provider.first_frame(&error), None);
    }

    #[test]
    fn test_registered_type_reports_its_site() {
        let site = RaiseSite::new("billing::Invoice::close", "src/invoice.rs", 12, 5);
        let error = SitedError(site);

        assert!(RaiseSiteProvider::new().frames(&error).is_empty());

        let provider = RaiseSiteProvider::new().with_traceable::<SitedError>();
        let frame = provider.first_frame(&error).unwrap();
        assert_eq!(frame.method_name.as_deref(), Some("close"));
        assert_eq!(frame.type_name.as_deref(), Some("billing::Invoice"));
        assert_eq!(frame.file_name.as_deref(), Some("src/invoice.rs"));
        assert_eq!(frame.line_number, Some(12));
    }
}

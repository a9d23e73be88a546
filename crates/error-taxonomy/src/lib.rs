// Error Taxonomy
// Business/technical error taxonomy and causing-error context extraction
//
// Errors form chains through `source()` and fan out through aggregates. The
// resolver flattens both shapes down to the causing (leaf) errors; the query
// layer maps those through a stack trace provider to report where each one
// was raised.

// Module structure
mod macros;
mod error;
mod config;
mod conversion;

// Core modules
mod context;
mod site;
mod trace;
mod aggregate;
mod resolver;
mod query;
mod taxonomy;
mod ext;

// Public exports
pub use aggregate::{
    probe_aggregate, unwrap_shared, AggregateError, AggregateProbe, SharedError, TaskFailures,
};
pub use config::{TaxonomyConfig, UNKNOWN_METHOD, UNKNOWN_TYPE};
pub use context::{short_type_name, trim_file_path, ErrorContext};
pub use conversion::{to_shared_error, ExternalError, IntoSharedError};
pub use error::{ConfigError, ResolveError, Result};
pub use ext::ErrorExt;
pub use query::ContextQuery;
pub use resolver::{CausingLookup, ErrorRoot, Resolver};
pub use site::{RaiseSite, StackFrame};
pub use taxonomy::{ErrorKind, Localizable, LocalizableError};
pub use trace::{probe_traceable, RaiseSiteProvider, StackTraceProvider, Traceable, TraceableProbe};

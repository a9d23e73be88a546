// Extension methods over std errors
// Every resolver and context query, available directly on any error value

use std::error::Error as StdError;

use crate::context::ErrorContext;
use crate::query::ContextQuery;
use crate::resolver::CausingLookup;

/// Causing-error and context queries for any error, backed by [`ContextQuery::global`].
///
/// [`LocalizableError`](crate::LocalizableError) has inherent, memoized
/// `context` and `causing_contexts` methods that take precedence over the ones
/// here; both produce the same values.
///
/// A [`SharedError`](crate::SharedError) answers for the error it wraps.
pub trait ErrorExt {
    fn as_dyn_error(&self) -> &(dyn StdError + 'static);

    fn causing_errors(&self) -> Vec<&(dyn StdError + 'static)> {
        ContextQuery::global().causing_errors(self.as_dyn_error())
    }

    fn try_causing_error(&self) -> Option<&(dyn StdError + 'static)> {
        ContextQuery::global().try_causing_error(self.as_dyn_error())
    }

    fn lookup_causing_error(&self) -> CausingLookup<&(dyn StdError + 'static)> {
        ContextQuery::global().lookup_causing_error(self.as_dyn_error())
    }

    fn causing_error_count(&self) -> usize {
        ContextQuery::global().causing_error_count(self.as_dyn_error())
    }

    fn context(&self) -> ErrorContext {
        ContextQuery::global().context(self.as_dyn_error())
    }

    fn causing_contexts(&self) -> Vec<ErrorContext> {
        ContextQuery::global().causing_contexts(self.as_dyn_error())
    }

    fn try_causing_context(&self) -> Option<ErrorContext> {
        ContextQuery::global().try_causing_context(self.as_dyn_error())
    }

    fn method_name(&self) -> String {
        ContextQuery::global().method_name(self.as_dyn_error())
    }

    fn causing_method_names(&self) -> Vec<String> {
        ContextQuery::global().causing_method_names(self.as_dyn_error())
    }

    fn try_causing_method_name(&self) -> Option<String> {
        ContextQuery::global().try_causing_method_name(self.as_dyn_error())
    }

    fn type_name(&self) -> String {
        ContextQuery::global().type_name(self.as_dyn_error())
    }

    fn causing_type_names(&self) -> Vec<String> {
        ContextQuery::global().causing_type_names(self.as_dyn_error())
    }

    fn try_causing_type_name(&self) -> Option<String> {
        ContextQuery::global().try_causing_type_name(self.as_dyn_error())
    }

    fn file_name(&self) -> Option<String> {
        ContextQuery::global().file_name(self.as_dyn_error())
    }

    fn causing_file_names(&self) -> Vec<Option<String>> {
        ContextQuery::global().causing_file_names(self.as_dyn_error())
    }

    fn try_causing_file_name(&self) -> Option<Option<String>> {
        ContextQuery::global().try_causing_file_name(self.as_dyn_error())
    }

    fn line_number(&self) -> Option<u32> {
        ContextQuery::global().line_number(self.as_dyn_error())
    }

    fn causing_line_numbers(&self) -> Vec<Option<u32>> {
        ContextQuery::global().causing_line_numbers(self.as_dyn_error())
    }

    fn try_causing_line_number(&self) -> Option<Option<u32>> {
        ContextQuery::global().try_causing_line_number(self.as_dyn_error())
    }
}

impl<E> ErrorExt for E
where
    E: StdError + 'static,
{
    fn as_dyn_error(&self) -> &(dyn StdError + 'static) {
        self
    }
}

impl ErrorExt for dyn StdError + 'static {
    fn as_dyn_error(&self) -> &(dyn StdError + 'static) {
        self
    }
}

impl ErrorExt for dyn StdError + Send + Sync + 'static {
    fn as_dyn_error(&self) -> &(dyn StdError + 'static) {
        self
    }
}

// Context query layer
// Projects errors and their causing errors through a stack trace provider

use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::aggregate::unwrap_shared;
use crate::config::{TaxonomyConfig, UNKNOWN_METHOD, UNKNOWN_TYPE};
use crate::context::{trim_file_path, ErrorContext};
use crate::resolver::{CausingLookup, ErrorRoot, Resolver};
use crate::site::StackFrame;
use crate::trace::{RaiseSiteProvider, StackTraceProvider};

static GLOBAL: OnceLock<ContextQuery> = OnceLock::new();

/// Context and location queries over an error and its causing errors.
///
/// Every accessor comes in three shapes: one for the error itself, a
/// `causing_*` form mapping over all causing errors, and a `try_causing_*`
/// form that only succeeds when exactly one causing error exists. The
/// single-field accessors read the provider directly and apply the same
/// placeholder and path rules as [`ContextQuery::context`], so both always
/// agree.
#[derive(Clone)]
pub struct ContextQuery {
    resolver: Resolver,
    provider: Arc<dyn StackTraceProvider>,
    trim_file_paths: bool,
    unknown_method: String,
    unknown_type: String,
}

impl ContextQuery {
    pub fn new(resolver: Resolver, provider: Arc<dyn StackTraceProvider>) -> Self {
        Self {
            resolver,
            provider,
            trim_file_paths: true,
            unknown_method: UNKNOWN_METHOD.to_string(),
            unknown_type: UNKNOWN_TYPE.to_string(),
        }
    }

    /// Default resolver with a custom provider
    pub fn with_provider<P>(provider: P) -> Self
    where
        P: StackTraceProvider + 'static,
    {
        Self::new(Resolver::new(), Arc::new(provider))
    }

    pub fn from_config(config: &TaxonomyConfig) -> Self {
        let mut query = Self::new(
            Resolver::from_config(config),
            Arc::new(RaiseSiteProvider::new()),
        );
        query.trim_file_paths = config.trim_file_paths;
        query.unknown_method = config.unknown_method.clone();
        query.unknown_type = config.unknown_type.clone();
        query
    }

    /// Process-wide query used by [`ErrorExt`](crate::ErrorExt) and memoized error views
    pub fn global() -> &'static ContextQuery {
        GLOBAL.get_or_init(ContextQuery::default)
    }

    /// Make `self` the process-wide query; fails if one is already in use
    pub fn install_global(self) -> Result<(), ContextQuery> {
        GLOBAL.set(self)
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn provider(&self) -> &dyn StackTraceProvider {
        self.provider.as_ref()
    }

    //-------------------------------------------------------------------------
    // Causing errors
    //-------------------------------------------------------------------------

    pub fn causing_errors<'a>(&self, root: impl ErrorRoot<'a>) -> Vec<&'a (dyn StdError + 'static)> {
        self.resolver.causing_errors(root)
    }

    pub fn try_causing_error<'a>(&self, root: impl ErrorRoot<'a>) -> Option<&'a (dyn StdError + 'static)> {
        self.resolver.try_causing_error(root)
    }

    pub fn lookup_causing_error<'a>(
        &self,
        root: impl ErrorRoot<'a>,
    ) -> CausingLookup<&'a (dyn StdError + 'static)> {
        self.resolver.lookup_causing_error(root)
    }

    pub fn causing_error_count<'a>(&self, root: impl ErrorRoot<'a>) -> usize {
        self.resolver.causing_error_count(root)
    }

    fn map_causing<'a, T>(
        &self,
        root: impl ErrorRoot<'a>,
        project: impl Fn(&'a (dyn StdError + 'static)) -> T,
    ) -> Vec<T> {
        self.resolver
            .causing_errors(root)
            .into_iter()
            .map(project)
            .collect()
    }

    fn try_causing<'a, T>(
        &self,
        root: impl ErrorRoot<'a>,
        project: impl FnOnce(&'a (dyn StdError + 'static)) -> T,
    ) -> Option<T> {
        self.resolver.lookup_causing_error(root).map(project).found()
    }

    //-------------------------------------------------------------------------
    // Context
    //-------------------------------------------------------------------------

    /// Where `error` was raised, with placeholders for anything unknown
    pub fn context(&self, error: &(dyn StdError + 'static)) -> ErrorContext {
        let frame = self.first_frame(error);
        ErrorContext::new(
            self.method_from(frame.as_ref()),
            self.type_from(frame.as_ref()),
            self.file_from(frame.as_ref()),
            frame.as_ref().and_then(|frame| frame.line_number),
        )
    }

    pub fn causing_contexts<'a>(&self, root: impl ErrorRoot<'a>) -> Vec<ErrorContext> {
        self.map_causing(root, |error| self.context(error))
    }

    pub fn try_causing_context<'a>(&self, root: impl ErrorRoot<'a>) -> Option<ErrorContext> {
        self.try_causing(root, |error| self.context(error))
    }

    //-------------------------------------------------------------------------
    // Method names
    //-------------------------------------------------------------------------

    pub fn method_name(&self, error: &(dyn StdError + 'static)) -> String {
        self.method_from(self.first_frame(error).as_ref())
    }

    pub fn causing_method_names<'a>(&self, root: impl ErrorRoot<'a>) -> Vec<String> {
        self.map_causing(root, |error| self.method_name(error))
    }

    pub fn try_causing_method_name<'a>(&self, root: impl ErrorRoot<'a>) -> Option<String> {
        self.try_causing(root, |error| self.method_name(error))
    }

    //-------------------------------------------------------------------------
    // Type names
    //-------------------------------------------------------------------------

    pub fn type_name(&self, error: &(dyn StdError + 'static)) -> String {
        self.type_from(self.first_frame(error).as_ref())
    }

    pub fn causing_type_names<'a>(&self, root: impl ErrorRoot<'a>) -> Vec<String> {
        self.map_causing(root, |error| self.type_name(error))
    }

    pub fn try_causing_type_name<'a>(&self, root: impl ErrorRoot<'a>) -> Option<String> {
        self.try_causing(root, |error| self.type_name(error))
    }

    //-------------------------------------------------------------------------
    // File names
    //-------------------------------------------------------------------------

    pub fn file_name(&self, error: &(dyn StdError + 'static)) -> Option<String> {
        self.file_from(self.first_frame(error).as_ref())
    }

    pub fn causing_file_names<'a>(&self, root: impl ErrorRoot<'a>) -> Vec<Option<String>> {
        self.map_causing(root, |error| self.file_name(error))
    }

    /// `Some(file)` when there is exactly one causing error; `file` itself may be absent
    pub fn try_causing_file_name<'a>(&self, root: impl ErrorRoot<'a>) -> Option<Option<String>> {
        self.try_causing(root, |error| self.file_name(error))
    }

    //-------------------------------------------------------------------------
    // Line numbers
    //-------------------------------------------------------------------------

    pub fn line_number(&self, error: &(dyn StdError + 'static)) -> Option<u32> {
        self.first_frame(error)
            .and_then(|frame| frame.line_number)
    }

    pub fn causing_line_numbers<'a>(&self, root: impl ErrorRoot<'a>) -> Vec<Option<u32>> {
        self.map_causing(root, |error| self.line_number(error))
    }

    /// `Some(line)` when there is exactly one causing error; `line` itself may be absent
    pub fn try_causing_line_number<'a>(&self, root: impl ErrorRoot<'a>) -> Option<Option<u32>> {
        self.try_causing(root, |error| self.line_number(error))
    }

    //-------------------------------------------------------------------------
    // Frame projections shared by the full context and the single accessors
    //-------------------------------------------------------------------------

    fn first_frame(&self, error: &(dyn StdError + 'static)) -> Option<StackFrame> {
        self.provider.first_frame(unwrap_shared(error))
    }

    fn method_from(&self, frame: Option<&StackFrame>) -> String {
        frame
            .and_then(|frame| frame.method_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.unknown_method.clone())
    }

    fn type_from(&self, frame: Option<&StackFrame>) -> String {
        frame
            .and_then(|frame| frame.type_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.unknown_type.clone())
    }

    fn file_from(&self, frame: Option<&StackFrame>) -> Option<String> {
        let file = frame?.file_name.as_deref()?;
        if file.is_empty() {
            return None;
        }
        if self.trim_file_paths {
            Some(trim_file_path(file).to_string())
        } else {
            Some(file.to_string())
        }
    }
}

impl Default for ContextQuery {
    fn default() -> Self {
        Self::new(Resolver::new(), Arc::new(RaiseSiteProvider::new()))
    }
}

impl fmt::Debug for ContextQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextQuery")
            .field("resolver", &self.resolver)
            .field("trim_file_paths", &self.trim_file_paths)
            .field("unknown_method", &self.unknown_method)
            .field("unknown_type", &self.unknown_type)
            .finish_non_exhaustive()
    }
}

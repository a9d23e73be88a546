// Raise sites and stack frames
// A raise site is captured when an error is built; providers turn it into frames

use std::panic::Location;

use crate::context::rfind_top_level;

/// Source location captured when an error is created.
///
/// [`RaiseSite::caller`] records file and line through `#[track_caller]`.
/// The [`raise_site!`](crate::raise_site) macro additionally records the
/// enclosing function path, from which method and type names are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RaiseSite {
    function: Option<&'static str>,
    file: &'static str,
    line: u32,
    column: u32,
}

impl RaiseSite {
    /// Site of the function path reported by [`function_path!`](crate::function_path)
    pub fn new(function: &'static str, file: &'static str, line: u32, column: u32) -> Self {
        Self {
            function: Some(function),
            file,
            line,
            column,
        }
    }

    /// Location of the caller, without a function path
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            function: None,
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }

    /// Attach a function path to a site captured without one
    pub fn with_function(mut self, function: &'static str) -> Self {
        self.function = Some(function);
        self
    }

    pub fn function(&self) -> Option<&'static str> {
        self.function
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Last segment of the function path
    pub fn method_name(&self) -> Option<&'static str> {
        self.function.map(|path| split_function_path(path).1)
    }

    /// Function path without its last segment: the impl type or enclosing module
    pub fn type_name(&self) -> Option<&'static str> {
        self.function.and_then(|path| split_function_path(path).0)
    }

    pub fn to_frame(&self) -> StackFrame {
        StackFrame {
            method_name: self.method_name().map(str::to_string),
            type_name: self.type_name().map(str::to_string),
            file_name: Some(self.file.to_string()),
            line_number: Some(self.line),
        }
    }
}

/// Split `a::b::Type::method` into `(Some("a::b::Type"), "method")`.
///
/// Trailing closure segments are dropped so that errors raised inside
/// closures or async blocks report the function that contains them.
fn split_function_path(path: &str) -> (Option<&str>, &str) {
    let mut trimmed = path;
    while let Some(outer) = trimmed.strip_suffix("::{{closure}}") {
        trimmed = outer;
    }
    match rfind_top_level(trimmed, "::") {
        Some(index) => (Some(&trimmed[..index]), &trimmed[index + 2..]),
        None => (None, trimmed),
    }
}

/// One frame reported by a [`StackTraceProvider`](crate::StackTraceProvider)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackFrame {
    pub method_name: Option<String>,
    pub type_name: Option<String>,
    pub file_name: Option<String>,
    pub line_number: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_method_path() {
        assert_eq!(
            split_function_path("orders::service::OrderService::submit"),
            (Some("orders::service::OrderService"), "submit")
        );
    }

    #[test]
    fn test_split_skips_closures() {
        assert_eq!(
            split_function_path("orders::service::submit::{{closure}}::{{closure}}"),
            (Some("orders::service"), "submit")
        );
    }

    #[test]
    fn test_split_generic_and_trait_impls() {
        assert_eq!(
            split_function_path("orders::Batch<billing::Invoice>::flush"),
            (Some("orders::Batch<billing::Invoice>"), "flush")
        );
        assert_eq!(
            split_function_path("<orders::Batch<u8> as orders::Flush>::flush::{{closure}}"),
            (Some("<orders::Batch<u8> as orders::Flush>"), "flush")
        );
    }

    #[test]
    fn test_split_unqualified() {
        assert_eq!(split_function_path("main"), (None, "main"));
    }

    #[test]
    fn test_caller_has_no_function() {
        let site = RaiseSite::caller();
        assert_eq!(site.function(), None);
        assert_eq!(site.method_name(), None);
        assert!(site.file().ends_with("site.rs"));
        assert!(site.line() > 0);
    }

    #[test]
    fn test_macro_site_reports_enclosing_function() {
        let site = crate::raise_site!();
        assert_eq!(site.method_name(), Some("test_macro_site_reports_enclosing_function"));
        assert_eq!(site.type_name(), Some("error_taxonomy::site::tests"));

        let frame = site.to_frame();
        assert_eq!(frame.line_number, Some(site.line()));
        assert!(frame.file_name.unwrap().ends_with("site.rs"));
    }
}

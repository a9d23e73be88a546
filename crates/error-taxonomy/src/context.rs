// Error context model
// Immutable description of where an error was raised

use std::fmt;

use serde::{Deserialize, Serialize};

/// Origin of an error: declaring type, method, and (when known) file and line.
///
/// Method and type names are always present; the query layer substitutes
/// placeholders when they cannot be extracted. File name and line number are
/// absent when no location information is available for the error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorContext {
    method_name: String,
    type_name: String,
    file_name: Option<String>,
    line_number: Option<u32>,
}

impl ErrorContext {
    pub fn new(
        method_name: impl Into<String>,
        type_name: impl Into<String>,
        file_name: Option<String>,
        line_number: Option<u32>,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            type_name: type_name.into(),
            file_name,
            line_number,
        }
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn line_number(&self) -> Option<u32> {
        self.line_number
    }

    /// Type name without its module or namespace qualifier
    pub fn short_type_name(&self) -> &str {
        short_type_name(&self.type_name)
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.type_name.is_empty() {
            write!(f, "{}.", self.short_type_name())?;
        }
        match self.line_number {
            Some(line) => write!(f, "{} ({})", self.method_name, line),
            None => write!(f, "{}", self.method_name),
        }
    }
}

/// Strip everything up to and including the last `::` or `.` separator.
///
/// Separators inside generic arguments are ignored, and a qualified path
/// `<Type as Trait>` shortens to its self type.
pub fn short_type_name(type_name: &str) -> &str {
    if let Some(self_type) = qualified_self_type(type_name) {
        return short_type_name(self_type);
    }
    let last_segment = rfind_top_level(type_name, "::")
        .map_or(type_name, |index| &type_name[index + 2..]);
    rfind_top_level(last_segment, ".").map_or(last_segment, |index| &last_segment[index + 1..])
}

/// `Type` of `<Type as Trait>`
fn qualified_self_type(type_name: &str) -> Option<&str> {
    let inner = type_name.strip_prefix('<')?.strip_suffix('>')?;
    rfind_top_level(inner, " as ").map(|index| &inner[..index])
}

/// Byte offset of the last `separator` outside `<...>`
pub(crate) fn rfind_top_level(path: &str, separator: &str) -> Option<usize> {
    let bytes = path.as_bytes();
    let mut depth = 0usize;
    let mut found = None;
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'<' => depth += 1,
            // `->` in fn pointer types
            b'>' if index > 0 && bytes[index - 1] == b'-' => {}
            b'>' => depth = depth.saturating_sub(1),
            _ if depth == 0 && bytes[index..].starts_with(separator.as_bytes()) => {
                found = Some(index);
                index += separator.len();
                continue;
            }
            _ => {}
        }
        index += 1;
    }
    found
}

/// Last component of a source path, accepting both `/` and `\` separators
pub fn trim_file_path(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_line_number() {
        let context = ErrorContext::new(
            "load",
            "orders::repository::OrderRepository",
            Some("repository.rs".to_string()),
            Some(42),
        );
        assert_eq!(context.to_string(), "OrderRepository.load (42)");
    }

    #[test]
    fn test_display_without_line_number() {
        let context = ErrorContext::new("load", "OrderRepository", None, None);
        assert_eq!(context.to_string(), "OrderRepository.load");
    }

    #[test]
    fn test_display_omits_empty_type() {
        let context = ErrorContext::new("main", "", None, Some(7));
        assert_eq!(context.to_string(), "main (7)");
    }

    #[test]
    fn test_dotted_qualifier_is_stripped() {
        assert_eq!(short_type_name("Company.Orders.OrderService"), "OrderService");
        assert_eq!(short_type_name("orders::OrderService"), "OrderService");
        assert_eq!(short_type_name("OrderService"), "OrderService");
    }

    #[test]
    fn test_generic_arguments_are_kept_whole() {
        assert_eq!(short_type_name("orders::Batch<billing::Invoice>"), "Batch<billing::Invoice>");
        assert_eq!(short_type_name("orders::Cache<_>"), "Cache<_>");
        assert_eq!(
            short_type_name("orders::Retry<fn() -> billing::Invoice>"),
            "Retry<fn() -> billing::Invoice>"
        );
    }

    #[test]
    fn test_qualified_path_uses_self_type() {
        assert_eq!(short_type_name("<orders::OrderService as orders::Submit>"), "OrderService");
        assert_eq!(
            short_type_name("<orders::Batch<u8> as core::fmt::Debug>"),
            "Batch<u8>"
        );
    }

    #[test]
    fn test_trim_file_path() {
        assert_eq!(trim_file_path("crates/orders/src/lib.rs"), "lib.rs");
        assert_eq!(trim_file_path(r"C:\src\orders\lib.rs"), "lib.rs");
        assert_eq!(trim_file_path("lib.rs"), "lib.rs");
    }

    #[test]
    fn test_context_serializes_absent_fields_as_null() {
        let context = ErrorContext::new("load", "OrderRepository", None, None);
        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["method_name"], "load");
        assert!(json["file_name"].is_null());
        assert!(json["line_number"].is_null());
    }
}

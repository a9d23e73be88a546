// Business and technical error taxonomy
// User-facing business errors, internal technical errors, and their aggregate variants

use std::error::Error as StdError;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::aggregate::{as_dyn_errors, AggregateError, SharedError};
use crate::context::ErrorContext;
use crate::conversion::IntoSharedError;
use crate::query::ContextQuery;
use crate::site::RaiseSite;
use crate::trace::Traceable;

/// Taxonomy category of a [`LocalizableError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A violated domain rule; its message is shown to users
    Business,
    /// An internal failure; users only see a generic message
    Technical,
    BusinessAggregate,
    TechnicalAggregate,
}

impl ErrorKind {
    pub fn is_business(self) -> bool {
        matches!(self, ErrorKind::Business | ErrorKind::BusinessAggregate)
    }

    pub fn is_technical(self) -> bool {
        matches!(self, ErrorKind::Technical | ErrorKind::TechnicalAggregate)
    }

    pub fn is_aggregate(self) -> bool {
        matches!(self, ErrorKind::BusinessAggregate | ErrorKind::TechnicalAggregate)
    }

    /// Resource key used when none (or a blank one) is supplied
    pub fn default_resource_key(self) -> &'static str {
        match self {
            ErrorKind::Business => "ErrorBusinessDefaultMessage",
            ErrorKind::Technical => "ErrorTechnicalDefaultMessage",
            ErrorKind::BusinessAggregate => "ErrorBusinessAggregateDefaultMessage",
            ErrorKind::TechnicalAggregate => "ErrorTechnicalAggregateDefaultMessage",
        }
    }

    pub fn default_developer_message(self) -> &'static str {
        match self {
            ErrorKind::Business => "An unexpected business error has occurred.",
            ErrorKind::Technical => "An unexpected technical error has occurred.",
            ErrorKind::BusinessAggregate => "An unexpected business aggregate error has occurred.",
            ErrorKind::TechnicalAggregate => "An unexpected technical aggregate error has occurred.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Business => write!(f, "business"),
            ErrorKind::Technical => write!(f, "technical"),
            ErrorKind::BusinessAggregate => write!(f, "business aggregate"),
            ErrorKind::TechnicalAggregate => write!(f, "technical aggregate"),
        }
    }
}

/// Capability of errors whose user message can be localized
pub trait Localizable {
    fn kind(&self) -> ErrorKind;

    /// Key into the application's message resources
    fn resource_key(&self) -> &str;

    /// Values substituted into the localized message
    fn format_items(&self) -> &[String];

    /// Untranslated message meant for developers and logs
    fn developer_message(&self) -> &str;
}

/// A business or technical error, optionally wrapping a cause or aggregating members.
///
/// The error's own context and its causing contexts are computed on first
/// access and cached for the lifetime of the instance. The cache uses
/// [`OnceLock`], so concurrent first reads are safe and compute the value once;
/// later reads never recompute.
#[derive(Clone)]
pub struct LocalizableError {
    kind: ErrorKind,
    resource_key: String,
    developer_message: String,
    format_items: Vec<String>,
    cause: Option<SharedError>,
    members: Vec<SharedError>,
    site: RaiseSite,
    context: OnceLock<ErrorContext>,
    causing_contexts: OnceLock<Vec<ErrorContext>>,
}

impl LocalizableError {
    /// Error of `kind` with its default resource key and developer message
    #[track_caller]
    pub fn new(kind: ErrorKind) -> Self {
        Self::build(kind, String::new(), String::new(), None, Vec::new())
    }

    #[track_caller]
    pub fn business(resource_key: impl Into<String>, developer_message: impl Into<String>) -> Self {
        Self::build(
            ErrorKind::Business,
            resource_key.into(),
            developer_message.into(),
            None,
            Vec::new(),
        )
    }

    #[track_caller]
    pub fn business_caused_by(
        resource_key: impl Into<String>,
        cause: impl IntoSharedError,
        developer_message: impl Into<String>,
    ) -> Self {
        Self::build(
            ErrorKind::Business,
            resource_key.into(),
            developer_message.into(),
            Some(cause.into_shared_error()),
            Vec::new(),
        )
    }

    #[track_caller]
    pub fn business_aggregate<I, E>(
        resource_key: impl Into<String>,
        members: I,
        developer_message: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoSharedError,
    {
        Self::build(
            ErrorKind::BusinessAggregate,
            resource_key.into(),
            developer_message.into(),
            None,
            members.into_iter().map(IntoSharedError::into_shared_error).collect(),
        )
    }

    #[track_caller]
    pub fn technical(developer_message: impl Into<String>) -> Self {
        Self::build(
            ErrorKind::Technical,
            String::new(),
            developer_message.into(),
            None,
            Vec::new(),
        )
    }

    #[track_caller]
    pub fn technical_caused_by(
        cause: impl IntoSharedError,
        developer_message: impl Into<String>,
    ) -> Self {
        Self::build(
            ErrorKind::Technical,
            String::new(),
            developer_message.into(),
            Some(cause.into_shared_error()),
            Vec::new(),
        )
    }

    #[track_caller]
    pub fn technical_aggregate<I, E>(members: I, developer_message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoSharedError,
    {
        Self::build(
            ErrorKind::TechnicalAggregate,
            String::new(),
            developer_message.into(),
            None,
            members.into_iter().map(IntoSharedError::into_shared_error).collect(),
        )
    }

    #[track_caller]
    fn build(
        kind: ErrorKind,
        resource_key: String,
        developer_message: String,
        cause: Option<SharedError>,
        members: Vec<SharedError>,
    ) -> Self {
        Self {
            kind,
            resource_key: normalize(resource_key, kind.default_resource_key()),
            developer_message: normalize(developer_message, kind.default_developer_message()),
            format_items: Vec::new(),
            cause,
            members,
            site: RaiseSite::caller(),
            context: OnceLock::new(),
            causing_contexts: OnceLock::new(),
        }
    }

    /// Replace the resource key; a blank key restores the kind's default
    pub fn with_resource_key(mut self, resource_key: impl Into<String>) -> Self {
        self.resource_key = normalize(resource_key.into(), self.kind.default_resource_key());
        self
    }

    pub fn with_format_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.format_items = items.into_iter().map(Into::into).collect();
        self
    }

    /// Override the raise site, typically with [`raise_site!`](crate::raise_site)
    pub fn at(mut self, site: RaiseSite) -> Self {
        self.site = site;
        self.context = OnceLock::new();
        self
    }

    pub fn site(&self) -> &RaiseSite {
        &self.site
    }

    pub fn cause(&self) -> Option<&SharedError> {
        self.cause.as_ref()
    }

    /// Aggregate members; empty for non-aggregate kinds
    pub fn members(&self) -> &[SharedError] {
        &self.members
    }

    pub fn is_business(&self) -> bool {
        self.kind.is_business()
    }

    pub fn is_technical(&self) -> bool {
        self.kind.is_technical()
    }

    pub fn is_aggregate(&self) -> bool {
        self.kind.is_aggregate()
    }

    /// Where this error was raised (memoized)
    pub fn context(&self) -> &ErrorContext {
        self.context
            .get_or_init(|| ContextQuery::global().context(self))
    }

    /// Contexts of this error's causing errors (memoized)
    pub fn causing_contexts(&self) -> &[ErrorContext] {
        self.causing_contexts
            .get_or_init(|| ContextQuery::global().causing_contexts(self))
    }

    /// Multi-line developer report: kind, message, resource key and locations
    pub fn report(&self) -> String {
        Report(self).to_string()
    }
}

struct Report<'a>(&'a LocalizableError);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error = self.0;
        writeln!(f, "Kind: {}", error.kind)?;
        writeln!(f, "Message: \"{}\"", error.developer_message)?;
        writeln!(f, "ResourceKey: {}", error.resource_key)?;
        writeln!(f, "Context: {}", error.context())?;
        for causing in error.causing_contexts() {
            writeln!(f, "Caused at: {}", causing)?;
        }
        Ok(())
    }
}

fn normalize(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

impl fmt::Debug for LocalizableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalizableError")
            .field("kind", &self.kind)
            .field("resource_key", &self.resource_key)
            .field("developer_message", &self.developer_message)
            .field("format_items", &self.format_items)
            .field("cause", &self.cause)
            .field("members", &self.members)
            .field("site", &self.site)
            .finish()
    }
}

impl fmt::Display for LocalizableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.developer_message)
    }
}

impl StdError for LocalizableError {
    /// The wrapped cause, or the first member of an aggregate
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .or_else(|| self.members.first())
            .map(|error| &**error as &(dyn StdError + 'static))
    }
}

impl Localizable for LocalizableError {
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn resource_key(&self) -> &str {
        &self.resource_key
    }

    fn format_items(&self) -> &[String] {
        &self.format_items
    }

    fn developer_message(&self) -> &str {
        &self.developer_message
    }
}

impl AggregateError for LocalizableError {
    fn inner_errors(&self) -> Vec<&(dyn StdError + 'static)> {
        as_dyn_errors(&self.members)
    }

    fn is_aggregate_shaped(&self) -> bool {
        self.kind.is_aggregate()
    }
}

impl Traceable for LocalizableError {
    fn raise_site(&self) -> Option<&RaiseSite> {
        Some(&self.site)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_resource_key_uses_kind_default() {
        let err = LocalizableError::business("  ", "Order total must be positive");
        assert_eq!(err.resource_key(), "ErrorBusinessDefaultMessage");

        let err = LocalizableError::technical("Connection pool exhausted");
        assert_eq!(err.resource_key(), "ErrorTechnicalDefaultMessage");

        let err = LocalizableError::technical_aggregate(Vec::<SharedError>::new(), "")
            .with_resource_key("");
        assert_eq!(err.resource_key(), "ErrorTechnicalAggregateDefaultMessage");
        assert_eq!(
            err.developer_message(),
            "An unexpected technical aggregate error has occurred."
        );
    }

    #[test]
    fn test_kind_flags() {
        assert!(ErrorKind::BusinessAggregate.is_business());
        assert!(ErrorKind::BusinessAggregate.is_aggregate());
        assert!(!ErrorKind::Business.is_aggregate());
        assert!(ErrorKind::TechnicalAggregate.is_technical());
        assert!(!ErrorKind::Technical.is_business());
        assert_eq!(ErrorKind::TechnicalAggregate.to_string(), "technical aggregate");
    }

    #[test]
    fn test_source_prefers_cause_then_first_member() {
        let leaf = LocalizableError::technical("Level 2");
        let err = LocalizableError::technical_caused_by(leaf, "Level 1");
        assert_eq!(err.source().unwrap().to_string(), "Level 2");

        let aggregate = LocalizableError::business_aggregate(
            "OrderRejected",
            vec![
                LocalizableError::business("StockEmpty", "first"),
                LocalizableError::business("CreditLimit", "second"),
            ],
            "Order rejected",
        );
        assert_eq!(aggregate.source().unwrap().to_string(), "first");
        assert_eq!(aggregate.members().len(), 2);

        assert!(LocalizableError::business("Key", "plain").source().is_none());
    }

    #[test]
    fn test_only_aggregate_kinds_are_aggregate_shaped() {
        let plain = LocalizableError::business("Key", "plain");
        assert!(!plain.is_aggregate_shaped());

        let aggregate = LocalizableError::technical_aggregate(vec![plain], "many");
        assert!(aggregate.is_aggregate_shaped());
        assert_eq!(aggregate.inner_errors().len(), 1);
    }

    #[test]
    fn test_report_lists_each_causing_context() {
        let err = LocalizableError::technical_aggregate(
            vec![
                LocalizableError::technical("disk full"),
                LocalizableError::technical("quota exceeded"),
            ],
            "",
        );

        let report = err.report();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Kind: technical aggregate");
        assert_eq!(
            lines[1],
            "Message: \"An unexpected technical aggregate error has occurred.\""
        );
        assert_eq!(lines[2], "ResourceKey: ErrorTechnicalAggregateDefaultMessage");
        assert!(lines[3].starts_with("Context: "));
        assert_eq!(lines.iter().filter(|line| line.starts_with("Caused at: ")).count(), 2);
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_format_items_are_kept_in_order() {
        let err = LocalizableError::business("QuantityTooLarge", "Quantity exceeds stock")
            .with_format_items(["12", "10"]);
        assert_eq!(err.format_items(), ["12".to_string(), "10".to_string()]);
    }
}

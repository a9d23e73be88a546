//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::error::Error as StdError;
use std::fmt;
use std::sync::Once;

use error_taxonomy::{technical_error, LocalizableError, StackFrame, StackTraceProvider};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize test logging once per test binary
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

//-----------------------------------------------------------------------------
// Call stacks
//-----------------------------------------------------------------------------

pub fn fail_at_level3() -> LocalizableError {
    technical_error!("Level 3")
}

pub fn fail_at_level2() -> LocalizableError {
    technical_error!("Level 2", fail_at_level3())
}

/// Level 1 wraps level 2 wraps level 3
pub fn fail_at_level1() -> LocalizableError {
    technical_error!("Level 1", fail_at_level2())
}

//-----------------------------------------------------------------------------
// Plain errors
//-----------------------------------------------------------------------------

/// A foreign error with an optional source and no location information
#[derive(Debug)]
pub struct PlainError {
    pub message: &'static str,
    pub source: Option<Box<PlainError>>,
}

impl PlainError {
    pub fn leaf(message: &'static str) -> Self {
        Self { message, source: None }
    }

    pub fn wrapping(message: &'static str, source: PlainError) -> Self {
        Self {
            message,
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for PlainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for PlainError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

/// An error that names itself as its own source
#[derive(Debug)]
pub struct SelfCausedError;

impl fmt::Display for SelfCausedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "self caused")
    }
}

impl StdError for SelfCausedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self)
    }
}

//-----------------------------------------------------------------------------
// Providers
//-----------------------------------------------------------------------------

/// Provider returning the same synthetic frames for every error
pub struct FixedFrames(pub Vec<StackFrame>);

impl StackTraceProvider for FixedFrames {
    fn frames(&self, _error: &(dyn StdError + 'static)) -> Vec<StackFrame> {
        self.0.clone()
    }
}

/// Provider keyed on the error's message
pub struct FramesByMessage;

impl StackTraceProvider for FramesByMessage {
    fn frames(&self, error: &(dyn StdError + 'static)) -> Vec<StackFrame> {
        let message = error.to_string();
        vec![StackFrame {
            method_name: Some(format!("raise_{}", message.replace(' ', "_").to_lowercase())),
            type_name: Some("orders::service::OrderService".to_string()),
            file_name: Some(format!("src/orders/{}.rs", message.len())),
            line_number: Some(message.len() as u32),
        }]
    }
}

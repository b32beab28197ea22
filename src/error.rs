// src/error.rs
//! Unified error handling for spectral-core
//!
//! Precondition violations surface as [`DspError::InvalidArgument`] and are
//! raised before an operation does any work. Degenerate numeric input
//! (infinite powers, zero divisors) is not an error; the feature functions
//! absorb it into documented fallback values instead.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::time::SystemTime;

/// Unified error type for the acquisition config and feature library
#[derive(Debug, Clone)]
pub enum DspError {
    /// A caller-supplied value violated an operation's precondition
    InvalidArgument {
        parameter: String,
        reason: String,
        expected: Option<String>,
        actual: Option<String>,
        context: ErrorContext,
    },

    /// The transform provider failed, or no live transform is bound
    Transform {
        reason: String,
        context: ErrorContext,
    },

    /// Settings could not be loaded or validated
    Configuration {
        component: String,
        reason: String,
        context: ErrorContext,
    },
}

/// Where and when an error was raised
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub timestamp: SystemTime,
    pub thread_id: Option<String>,
    pub component: String,
    pub operation: String,
    pub file: Option<&'static str>,
    pub line: Option<u32>,
    pub additional_info: HashMap<String, String>,
}

impl ErrorContext {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            thread_id: std::thread::current().name().map(|s| s.to_string()),
            component: component.to_string(),
            operation: operation.to_string(),
            file: None,
            line: None,
            additional_info: HashMap::new(),
        }
    }

    /// Context carrying the source location of the call site
    pub fn with_location(component: &str, operation: &str, file: &'static str, line: u32) -> Self {
        let mut context = Self::new(component, operation);
        context.file = Some(file);
        context.line = Some(line);
        context
    }

    /// Attach a key/value note
    pub fn add_info<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.additional_info.insert(key.into(), value.into());
        self
    }
}

impl DspError {
    /// True for precondition violations
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, DspError::InvalidArgument { .. })
    }

    /// Context attached when the error was raised
    pub fn context(&self) -> &ErrorContext {
        match self {
            DspError::InvalidArgument { context, .. }
            | DspError::Transform { context, .. }
            | DspError::Configuration { context, .. } => context,
        }
    }
}

impl fmt::Display for DspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DspError::InvalidArgument { parameter, reason, expected, actual, context } => {
                match (expected, actual) {
                    (Some(exp), Some(act)) => write!(
                        f,
                        "[ARGUMENT] Invalid {}: {} (expected: {}, got: {}) ({})",
                        parameter, reason, exp, act, context.operation
                    ),
                    _ => write!(f, "[ARGUMENT] Invalid {}: {} ({})", parameter, reason, context.operation),
                }
            }
            DspError::Transform { reason, context } => {
                write!(f, "[TRANSFORM] Transform error in {}: {} ({})",
                       context.component, reason, context.operation)
            }
            DspError::Configuration { component, reason, context } => {
                write!(f, "[CONFIG] Configuration error in {}: {} ({})",
                       component, reason, context.operation)
            }
        }
    }
}

impl Error for DspError {}

/// Result type alias for spectral operations
pub type DspResult<T> = Result<T, DspError>;

/// Shorthand constructors bound to one component and operation
///
/// The context of every built error records the location that called
/// [`DspErrorBuilder::new`].
pub struct DspErrorBuilder {
    component: String,
    operation: String,
    file: &'static str,
    line: u32,
    info: Vec<(String, String)>,
}

impl DspErrorBuilder {
    #[track_caller]
    pub fn new(component: &str, operation: &str) -> Self {
        let location = std::panic::Location::caller();
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
            file: location.file(),
            line: location.line(),
            info: Vec::new(),
        }
    }

    /// Attach a key/value note to the built error's context
    pub fn info<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.info.push((key.into(), value.into()));
        self
    }

    fn context(&mut self) -> ErrorContext {
        std::mem::take(&mut self.info).into_iter().fold(
            ErrorContext::with_location(&self.component, &self.operation, self.file, self.line),
            |context, (key, value)| context.add_info(key, value),
        )
    }

    pub fn invalid_argument(mut self, parameter: &str, reason: &str) -> DspError {
        DspError::InvalidArgument {
            parameter: parameter.to_string(),
            reason: reason.to_string(),
            expected: None,
            actual: None,
            context: self.context(),
        }
    }

    /// Invalid argument carrying the expected range and the offending value
    pub fn out_of_range(
        mut self,
        parameter: &str,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> DspError {
        DspError::InvalidArgument {
            parameter: parameter.to_string(),
            reason: "value out of range".to_string(),
            expected: Some(expected.to_string()),
            actual: Some(actual.to_string()),
            context: self.context(),
        }
    }

    pub fn transform(mut self, reason: &str) -> DspError {
        DspError::Transform {
            reason: reason.to_string(),
            context: self.context(),
        }
    }

    pub fn configuration(mut self, reason: &str) -> DspError {
        let context = self.context();

        DspError::Configuration {
            component: self.component,
            reason: reason.to_string(),
            context,
        }
    }
}

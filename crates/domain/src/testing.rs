//! Response expectations and assertion failures.
//!
//! This module provides the closed set of expectation variants a harness
//! registers, and the failure value produced when one does not hold.

use std::fmt;

use regex::Regex;
use serde_json::{Number, Value};
use thiserror::Error;

use crate::error::{DomainError, DomainResult};
use crate::response::MockResponse;

/// A regular-expression matcher, accepted wherever literal equality is.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidPattern`] if `source` is not a valid
    /// regular expression.
    pub fn new(source: &str) -> DomainResult<Self> {
        Regex::new(source)
            .map(Self)
            .map_err(|e| DomainError::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            })
    }

    /// Returns the pattern source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Tests whether the pattern matches anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self(regex)
    }
}

/// Expected value of a response header.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderExpectation {
    /// Exact text, compared against the stored (normalized) value.
    Text(String),
    /// Exact number, compared against a numeric header value.
    Number(Number),
    /// Pattern tested against the header's text form.
    Pattern(Pattern),
}

impl fmt::Display for HeaderExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
            Self::Pattern(pattern) => write!(f, "{pattern}"),
        }
    }
}

impl From<&str> for HeaderExpectation {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for HeaderExpectation {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Pattern> for HeaderExpectation {
    fn from(pattern: Pattern) -> Self {
        Self::Pattern(pattern)
    }
}

macro_rules! header_number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for HeaderExpectation {
                fn from(number: $ty) -> Self {
                    Self::Number(Number::from(number))
                }
            }
        )*
    };
}

header_number_from!(i32, i64, u16, u32, u64);

/// Expected response body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyExpectation {
    /// Structured value, compared by deep equality against the sent body.
    Json(Value),
    /// Raw text, compared against the body's text form.
    Text(String),
    /// Pattern tested against the body's text form.
    Pattern(Pattern),
}

impl From<Value> for BodyExpectation {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            other => Self::Json(other),
        }
    }
}

impl From<&str> for BodyExpectation {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for BodyExpectation {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Pattern> for BodyExpectation {
    fn from(pattern: Pattern) -> Self {
        Self::Pattern(pattern)
    }
}

/// Values a predicate may return.
///
/// `()` always passes, `false` and `Err` fail.
pub trait CheckResult {
    /// Converts the predicate's return value into a pass/fail outcome.
    ///
    /// # Errors
    /// Returns the failure message when the value signals a failure.
    fn into_check_result(self) -> Result<(), String>;
}

impl CheckResult for () {
    fn into_check_result(self) -> Result<(), String> {
        Ok(())
    }
}

impl CheckResult for bool {
    fn into_check_result(self) -> Result<(), String> {
        if self {
            Ok(())
        } else {
            Err("predicate returned false".to_string())
        }
    }
}

impl<E: fmt::Display> CheckResult for Result<(), E> {
    fn into_check_result(self) -> Result<(), String> {
        self.map_err(|e| e.to_string())
    }
}

type CheckFn = dyn Fn(&MockResponse) -> Result<(), String>;

/// A caller-supplied predicate over the finished response.
pub struct Check(Box<CheckFn>);

impl Check {
    /// Wraps a predicate closure.
    pub fn new<F, R>(predicate: F) -> Self
    where
        F: Fn(&MockResponse) -> R + 'static,
        R: CheckResult,
    {
        Self(Box::new(move |response: &MockResponse| {
            predicate(response).into_check_result()
        }))
    }

    /// Runs the predicate against a response.
    ///
    /// # Errors
    /// Returns the failure message produced by the predicate.
    pub fn run(&self, response: &MockResponse) -> Result<(), String> {
        (self.0)(response)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Check(..)")
    }
}

/// Shorthand for [`Check::new`].
pub fn check<F, R>(predicate: F) -> Check
where
    F: Fn(&MockResponse) -> R + 'static,
    R: CheckResult,
{
    Check::new(predicate)
}

/// An expectation registered on a harness.
#[derive(Debug)]
pub enum Expectation {
    /// Response status equals the given code.
    Status(u16),
    /// Header is present and matches.
    Header {
        /// Header name (case-insensitive).
        name: String,
        /// Expected value or pattern.
        value: HeaderExpectation,
    },
    /// Body matches.
    Body(BodyExpectation),
    /// Arbitrary predicate over the response.
    Predicate(Check),
}

impl Expectation {
    /// Get a human-readable description of this expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Status(code) => format!("Status code = {code}"),
            Self::Header {
                name,
                value: HeaderExpectation::Pattern(pattern),
            } => format!("Header '{name}' matches {pattern}"),
            Self::Header { name, value } => format!("Header '{name}' equals '{value}'"),
            Self::Body(BodyExpectation::Json(value)) => format!("Body equals {value}"),
            Self::Body(BodyExpectation::Text(text)) => format!("Body equals '{text}'"),
            Self::Body(BodyExpectation::Pattern(pattern)) => format!("Body matches {pattern}"),
            Self::Predicate(_) => "Predicate holds".to_string(),
        }
    }
}

/// Why an expectation did not hold.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct AssertionFailure {
    /// Human-readable message.
    pub message: String,
    /// Expected value, when there is one to show.
    pub expected: Option<Value>,
    /// Actual value, when there is one to show.
    pub actual: Option<Value>,
    /// Whether a reporter should render a structured diff.
    pub show_diff: bool,
}

impl AssertionFailure {
    /// Create a failure carrying only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expected: None,
            actual: None,
            show_diff: false,
        }
    }

    /// Create a failure that asks for a diff of `expected` against `actual`.
    #[must_use]
    pub fn diff(message: impl Into<String>, expected: Value, actual: Option<Value>) -> Self {
        Self {
            message: message.into(),
            expected: Some(expected),
            actual,
            show_diff: true,
        }
    }

    /// Attach the expected and actual values without requesting a diff.
    #[must_use]
    pub fn with_values(mut self, expected: Option<Value>, actual: Option<Value>) -> Self {
        self.expected = expected;
        self.actual = actual;
        self
    }
}

/// An error-like value reported by a transport, carrying the status it saw.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    /// Status the transport observed.
    pub status: u16,
    /// Error message.
    pub message: String,
}

impl TransportError {
    /// Create a new transport error.
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<TransportError> for AssertionFailure {
    fn from(error: TransportError) -> Self {
        Self::new(error.message).with_values(None, Some(Value::from(error.status)))
    }
}

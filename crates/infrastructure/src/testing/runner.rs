//! Test runner implementation.
//!
//! Evaluates expectations against mock responses and reports the first
//! one that does not hold.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use serde_json::Value;
use spyrr_application::AssertionEngine;
use spyrr_domain::response::header_text;
use spyrr_domain::{
    AssertionFailure, BodyExpectation, Check, Expectation, HarnessSettings, HeaderExpectation,
    MockResponse, Pattern, StatusCode, TransportError,
};
use tracing::debug;

thread_local! {
    /// Set while a predicate runs, so its panic is reported only as a failure.
    static CAPTURING_PANIC: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Test runner that evaluates expectations against responses.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestRunner {
    /// Whether bodies in failure messages are pretty-printed.
    pretty_diff: bool,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty_diff: false }
    }

    /// Create a test runner configured from harness settings.
    #[must_use]
    pub const fn from_settings(settings: &HarnessSettings) -> Self {
        Self {
            pretty_diff: settings.pretty_diff,
        }
    }

    /// Set whether bodies in failure messages are pretty-printed.
    #[must_use]
    pub const fn with_pretty_diff(mut self, pretty: bool) -> Self {
        self.pretty_diff = pretty;
        self
    }

    /// Run expectations in order against a response.
    ///
    /// Stops at the first failure. A supplied transport error is reported
    /// only if every expectation held and its status differs from the
    /// response's.
    #[must_use]
    pub fn run(
        &self,
        expectations: &[Expectation],
        response: &MockResponse,
        transport_error: Option<&TransportError>,
    ) -> Option<AssertionFailure> {
        if let Some(failure) = expectations
            .iter()
            .find_map(|expectation| self.run_expectation(expectation, response))
        {
            debug!(message = %failure.message, "expectation failed");
            return Some(failure);
        }

        transport_error
            .filter(|error| response.status != Some(error.status))
            .map(|error| AssertionFailure::from(error.clone()))
    }

    /// Run a single expectation against a response.
    #[must_use]
    pub fn run_expectation(
        &self,
        expectation: &Expectation,
        response: &MockResponse,
    ) -> Option<AssertionFailure> {
        match expectation {
            Expectation::Status(expected) => Self::check_status(*expected, response),
            Expectation::Header { name, value } => Self::check_header(name, value, response),
            Expectation::Body(expected) => self.check_body(expected, response),
            Expectation::Predicate(check) => Self::check_predicate(check, response),
        }
    }

    fn check_status(expected: u16, response: &MockResponse) -> Option<AssertionFailure> {
        if response.status == Some(expected) {
            return None;
        }

        let actual = response
            .status_code()
            .map_or_else(|| "no status".to_string(), |status| status.to_string());
        Some(
            AssertionFailure::new(format!(
                "expected {}, got {actual}",
                StatusCode::new(expected)
            ))
            .with_values(Some(Value::from(expected)), response.status.map(Value::from)),
        )
    }

    fn check_header(
        name: &str,
        expected: &HeaderExpectation,
        response: &MockResponse,
    ) -> Option<AssertionFailure> {
        let Some(actual) = response.header(name) else {
            return Some(AssertionFailure::new(format!(
                "expected \"{name}\" header field"
            )));
        };

        // Single-element lists compare equal to their only element.
        let actual_text = header_text(actual);
        let matched = match expected {
            HeaderExpectation::Text(text) => match actual {
                Value::String(value) => value == text,
                Value::Array(_) => actual_text == *text,
                _ => false,
            },
            HeaderExpectation::Number(number) => {
                matches!(actual, Value::Number(value) if value == number)
            }
            HeaderExpectation::Pattern(pattern) => pattern.is_match(&actual_text),
        };
        if matched {
            return None;
        }

        let message = match expected {
            HeaderExpectation::Pattern(pattern) => {
                format!("expected \"{name}\" matching {pattern}, got \"{actual_text}\"")
            }
            other => format!("expected \"{name}\" of \"{other}\", got \"{actual_text}\""),
        };
        Some(
            AssertionFailure::new(message)
                .with_values(Some(Value::String(expected.to_string())), Some(actual.clone())),
        )
    }

    fn check_body(
        &self,
        expected: &BodyExpectation,
        response: &MockResponse,
    ) -> Option<AssertionFailure> {
        match expected {
            BodyExpectation::Json(value) => {
                if response
                    .body
                    .as_ref()
                    .is_some_and(|body| structurally_equal(value, body))
                {
                    return None;
                }
                Some(AssertionFailure::diff(
                    format!(
                        "expected {} response body, got {}",
                        self.render(Some(value)),
                        self.render(response.body.as_ref())
                    ),
                    value.clone(),
                    response.body.clone(),
                ))
            }
            BodyExpectation::Text(text) => {
                if response.text.as_deref() == Some(text.as_str()) {
                    return None;
                }
                Some(AssertionFailure::diff(
                    format!(
                        "expected {} response body, got {}",
                        render_text(Some(text)),
                        render_text(response.text.as_deref())
                    ),
                    Value::String(text.clone()),
                    response.body.clone(),
                ))
            }
            BodyExpectation::Pattern(pattern) => Self::check_body_matches(pattern, response),
        }
    }

    fn check_body_matches(pattern: &Pattern, response: &MockResponse) -> Option<AssertionFailure> {
        let text = response.text.as_deref();
        if text.is_some_and(|text| pattern.is_match(text)) {
            return None;
        }
        Some(AssertionFailure::diff(
            format!("expected body {} to match {pattern}", render_text(text)),
            Value::String(pattern.to_string()),
            response.body.clone(),
        ))
    }

    fn check_predicate(check: &Check, response: &MockResponse) -> Option<AssertionFailure> {
        install_quiet_hook();
        CAPTURING_PANIC.with(|capturing| capturing.set(true));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| check.run(response)));
        CAPTURING_PANIC.with(|capturing| capturing.set(false));

        match outcome {
            Ok(Ok(())) => None,
            Ok(Err(message)) => Some(AssertionFailure::new(message)),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                debug!(%message, "predicate panicked");
                Some(AssertionFailure::new(message))
            }
        }
    }

    fn render(&self, value: Option<&Value>) -> String {
        match value {
            None => "nothing".to_string(),
            Some(value) if self.pretty_diff => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Some(value) => value.to_string(),
        }
    }
}

impl AssertionEngine for TestRunner {
    fn evaluate(
        &self,
        expectations: &[Expectation],
        response: &MockResponse,
        transport_error: Option<&TransportError>,
    ) -> Option<AssertionFailure> {
        self.run(expectations, response, transport_error)
    }
}

/// Wraps the current panic hook so it stays silent for panics raised by a
/// predicate on this thread. Other panics reach the previous hook.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !CAPTURING_PANIC.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

/// Structural equality where numbers compare by value, so `10` equals `10.0`.
#[allow(clippy::float_cmp)]
fn structurally_equal(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) if a.is_f64() || b.is_f64() => {
            a.as_f64().zip(b.as_f64()).is_some_and(|(a, b)| a == b)
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| structurally_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, a)| b.get(key).is_some_and(|b| structurally_equal(a, b)))
        }
        _ => expected == actual,
    }
}

/// Quote text the way it appears in failure messages.
fn render_text(text: Option<&str>) -> String {
    text.map_or_else(|| "nothing".to_string(), |text| Value::from(text).to_string())
}

/// Extract the message from a caught panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "predicate panicked".to_string())
}

//! Expectation registration.
//!
//! [`IntoExpectations`] maps the shapes accepted by `Test::expect` onto
//! expectation variants:
//!
//! | argument                         | registers            |
//! |----------------------------------|----------------------|
//! | `u16`                            | status               |
//! | `(u16, body)`                    | status, then body    |
//! | `(name, text / number / Pattern)`| header               |
//! | `Value`, `&str`, `String`, `Pattern` | body             |
//! | `Check` (see [`spyrr_domain::check`]) | predicate       |

use serde_json::Value;
use spyrr_domain::{BodyExpectation, Check, Expectation, HeaderExpectation, Pattern};
use tracing::trace;

/// Conversion into one or more expectations.
pub trait IntoExpectations {
    /// Converts `self` into expectations, in registration order.
    fn into_expectations(self) -> Vec<Expectation>;
}

impl IntoExpectations for Expectation {
    fn into_expectations(self) -> Vec<Expectation> {
        vec![self]
    }
}

impl IntoExpectations for Check {
    fn into_expectations(self) -> Vec<Expectation> {
        vec![Expectation::Predicate(self)]
    }
}

impl IntoExpectations for u16 {
    fn into_expectations(self) -> Vec<Expectation> {
        vec![Expectation::Status(self)]
    }
}

impl IntoExpectations for BodyExpectation {
    fn into_expectations(self) -> Vec<Expectation> {
        vec![Expectation::Body(self)]
    }
}

impl IntoExpectations for Value {
    fn into_expectations(self) -> Vec<Expectation> {
        vec![Expectation::Body(self.into())]
    }
}

impl IntoExpectations for &str {
    fn into_expectations(self) -> Vec<Expectation> {
        vec![Expectation::Body(self.into())]
    }
}

impl IntoExpectations for String {
    fn into_expectations(self) -> Vec<Expectation> {
        vec![Expectation::Body(self.into())]
    }
}

impl IntoExpectations for Pattern {
    fn into_expectations(self) -> Vec<Expectation> {
        vec![Expectation::Body(self.into())]
    }
}

impl<B: Into<BodyExpectation>> IntoExpectations for (u16, B) {
    fn into_expectations(self) -> Vec<Expectation> {
        let (status, body) = self;
        vec![Expectation::Status(status), Expectation::Body(body.into())]
    }
}

impl<V: Into<HeaderExpectation>> IntoExpectations for (&str, V) {
    fn into_expectations(self) -> Vec<Expectation> {
        let (name, value) = self;
        vec![Expectation::Header {
            name: name.to_string(),
            value: value.into(),
        }]
    }
}

impl<V: Into<HeaderExpectation>> IntoExpectations for (String, V) {
    fn into_expectations(self) -> Vec<Expectation> {
        let (name, value) = self;
        vec![Expectation::Header {
            name,
            value: value.into(),
        }]
    }
}

/// Ordered list of registered expectations.
#[derive(Debug, Default)]
pub struct ExpectationRegistry {
    expectations: Vec<Expectation>,
}

impl ExpectationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            expectations: Vec::new(),
        }
    }

    /// Appends expectations, preserving their order.
    pub fn register(&mut self, expectations: impl IntoExpectations) {
        for expectation in expectations.into_expectations() {
            trace!(expectation = %expectation.description(), "registered expectation");
            self.expectations.push(expectation);
        }
    }

    /// Returns the expectations in registration order.
    #[must_use]
    pub fn as_slice(&self) -> &[Expectation] {
        &self.expectations
    }

    /// Returns the number of registered expectations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }
}

//! Assertion engine port

use spyrr_domain::{AssertionFailure, Expectation, MockResponse, TransportError};

/// Port for evaluating registered expectations against a finished response.
///
/// This trait keeps the harness independent of how each expectation kind
/// is compared, so the comparison logic can live in an adapter.
pub trait AssertionEngine {
    /// Evaluates `expectations` in order and returns the first failure.
    ///
    /// Evaluation stops at the first expectation that does not hold. When
    /// every expectation holds and a `transport_error` was supplied whose
    /// status differs from the response status, that error is reported
    /// instead.
    fn evaluate(
        &self,
        expectations: &[Expectation],
        response: &MockResponse,
        transport_error: Option<&TransportError>,
    ) -> Option<AssertionFailure>;
}

//! Spyrr - fluent harness for unit-testing HTTP controllers
//!
//! Wires the harness from `spyrr-application` to the assertion engine in
//! `spyrr-infrastructure`.
//!
//! ```
//! use spyrr::prelude::*;
//!
//! let completion = spyrr(|_req: &MockRequest, res: &mut Response<'_>| {
//!     res.status(200)
//!         .set_header("Content-Type", "application/json")
//!         .send(json!({"success": true}));
//! })
//! .expect(200)
//! .expect(("content-type", Pattern::new("json").unwrap()))
//! .expect(json!({"success": true}))
//! .end(|failure, _res| assert!(failure.is_none()))
//! .unwrap();
//!
//! assert!(completion.sent);
//! ```

pub mod config;
pub mod logging;

pub use spyrr_application::{
    ApplicationError, ApplicationResult, AssertionEngine, BodyTransformer, Completion,
    Continuation, ExpectationRegistry, IntoExpectations, Next, Response,
};
pub use spyrr_domain::{
    AssertionFailure, BodyExpectation, Check, CheckResult, DomainError, DomainResult,
    Expectation, HarnessSettings, HeaderExpectation, MockRequest, MockResponse, Pattern,
    StatusCode, TransportError, check,
};
pub use spyrr_infrastructure::TestRunner;

/// A harness evaluated by the default [`TestRunner`].
pub type Test = spyrr_application::Test<TestRunner>;

/// Creates a harness with default settings and no controller.
#[must_use]
pub fn harness() -> Test {
    harness_with(HarnessSettings::default())
}

/// Creates a harness with the given settings and no controller.
///
/// The settings configure both the response contract and the runner.
#[must_use]
pub fn harness_with(settings: HarnessSettings) -> Test {
    Test::new(TestRunner::from_settings(&settings)).settings(settings)
}

/// Creates a harness configured from `SPYRR_*` environment variables.
#[must_use]
pub fn harness_from_env() -> Test {
    harness_with(config::settings_from_env())
}

/// Creates a harness for a `(request, response)` controller.
#[must_use]
pub fn spyrr<C>(controller: C) -> Test
where
    C: FnMut(&MockRequest, &mut Response<'_>) + 'static,
{
    harness().controller(controller)
}

/// Creates a harness for a `(request, response, next)` controller.
#[must_use]
pub fn spyrr_with_next<C>(controller: C) -> Test
where
    C: for<'r> FnMut(&MockRequest, &mut Response<'r>, Next<'r>) + 'static,
{
    harness().controller_with_next(controller)
}

/// Common imports for controller tests.
pub mod prelude {
    pub use crate::{
        AssertionFailure, Completion, MockRequest, MockResponse, Next, Pattern, Response, Test,
        check, harness, harness_with, spyrr, spyrr_with_next,
    };
    pub use serde_json::{Value, json};
}

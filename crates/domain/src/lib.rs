//! Spyrr Domain - Core harness types
//!
//! This crate defines the mock request/response model and the expectation
//! variants evaluated against a finished response.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod request;
pub mod response;
pub mod settings;
pub mod testing;

pub use error::{DomainError, DomainResult};
pub use request::MockRequest;
pub use response::{MockResponse, StatusCode};
pub use settings::HarnessSettings;
pub use testing::{
    AssertionFailure, BodyExpectation, Check, CheckResult, Expectation, HeaderExpectation,
    Pattern, TransportError, check,
};

//! Spyrr Application - Harness orchestration and ports
//!
//! This crate defines the application layer with:
//! - The [`Test`] harness that configures, invokes and evaluates a controller
//! - The response contract handed to controllers
//! - Port traits for the assertion engine
//! - Application-level error handling

pub mod contract;
pub mod error;
pub mod expectations;
pub mod harness;
pub mod ports;

pub use contract::{BodyTransformer, Continuation, Next, Response};
pub use error::{ApplicationError, ApplicationResult};
pub use expectations::{ExpectationRegistry, IntoExpectations};
pub use harness::{Completion, Test};
pub use ports::AssertionEngine;

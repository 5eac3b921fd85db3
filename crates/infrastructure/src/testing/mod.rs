//! Response testing infrastructure.
//!
//! This module provides the test runner that evaluates expectations against
//! mock responses.

mod runner;

pub use runner::TestRunner;

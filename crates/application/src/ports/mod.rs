//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the harness and the adapters that
//! implement them in the infrastructure layer.

mod assertion_engine;

pub use assertion_engine::AssertionEngine;

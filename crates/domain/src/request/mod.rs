//! Mock request types

mod mock;

pub use mock::MockRequest;

//! Mock response types
//!
//! Contains the response record a controller writes to, status codes with
//! their reason phrases, and header normalization.

pub mod headers;
mod mock;
mod status;

pub use headers::{canonical_name, header_text};
pub use mock::MockResponse;
pub use status::StatusCode;

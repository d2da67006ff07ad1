//! HTTP protocol helpers

pub mod method;

pub use method::{Method, STANDARD_METHODS};

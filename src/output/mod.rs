//! Output handling (formatting, writing)

pub mod formatters;
pub mod writer;

pub use writer::{BodyFormat, RenderOptions, ResponseRenderer};

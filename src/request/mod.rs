//! Request building module
//!
//! Turns validated user intent into a wire-level request.

mod builder;
pub mod hash;
mod spec;

pub use builder::{
    normalize_url, parse_field, BuiltRequest, RequestBody, RequestBuilder, CONTENT_MD5,
    FORM_URLENCODED,
};
pub use spec::{BodySource, RequestSpec};

//! Output formatters

pub mod colors;
pub mod headers;
pub mod json;
pub mod xml;

pub use colors::colorize_json;
pub use headers::{format_request_head, format_response_head, title_case};
pub use json::{format_bson, format_json};
pub use xml::format_xml;

//! rcurl library interface
//!
//! A curl-style command line HTTP client: one request per invocation, with
//! multipart and streamed uploads, optional Content-MD5 integrity, request
//! trailers, connection tracing and pretty printed responses.
//!
//! # Module Organization
//!
//! - [`cli`] - Flag definitions and their conversion into a [`request::RequestSpec`]
//! - [`request`] - Request construction (URL, method, headers, body, MD5)
//! - [`uploads`] - Multipart production, streamed bodies and trailers
//! - [`client`] - Transport setup, dispatch and connection tracing
//! - [`output`] - Response rendering and body formatters
//! - [`errors`] - Error types (CurlError, Result)
//! - [`status`] - Exit status codes (ExitStatus)
//! - [`core`] - Main execution logic

pub mod cli;
pub mod client;
pub mod context;
pub mod core;
pub mod errors;
pub mod http;
pub mod logging;
pub mod output;
pub mod request;
pub mod status;
pub mod uploads;
pub mod version;

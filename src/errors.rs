//! Error types for rcurl

use thiserror::Error;

/// Main error type for rcurl
///
/// Every variant is terminal for the invocation: `core::run` reports it and
/// exits with status 1.
#[derive(Error, Debug)]
pub enum CurlError {
    #[error("invalid url: {url} ({reason})")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid method: {method}, valid methods: {valid}")]
    InvalidMethod { method: String, valid: String },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid trailer: {0}")]
    InvalidTrailer(String),

    #[error("parse content-length header value error: {0}")]
    InvalidContentLength(String),

    #[error("invalid form entry: {0}")]
    InvalidFormEntry(String),

    #[error("invalid proxy: {0}")]
    InvalidProxy(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("open file: {path} error: {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("write {path} error: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("decode response body error: {0}")]
    Decode(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request failed with response status code: {0}")]
    HttpStatus(u16),
}

impl CurlError {
    pub(crate) fn file_open(path: impl Into<String>, source: std::io::Error) -> Self {
        CurlError::FileOpen { path: path.into(), source }
    }

    pub(crate) fn file_write(path: impl Into<String>, source: std::io::Error) -> Self {
        CurlError::FileWrite { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, CurlError>;

//! HTTP method enumeration and inference

use std::fmt;
use std::str::FromStr;

use crate::errors::CurlError;

/// The request methods accepted by `-X/--request`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Head,
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Connect,
    Options,
    Trace,
}

/// All accepted methods, in the order they are listed in error messages
pub const STANDARD_METHODS: &[Method] = &[
    Method::Head,
    Method::Get,
    Method::Post,
    Method::Put,
    Method::Patch,
    Method::Delete,
    Method::Connect,
    Method::Options,
    Method::Trace,
];

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Head => "HEAD",
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Connect => "CONNECT",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
        }
    }

    /// Resolve the method used when `-X` is absent.
    ///
    /// Any body (form entries or `-d` data) implies POST, then `-I` implies
    /// HEAD, otherwise GET.
    pub fn infer(has_body: bool, head: bool) -> Self {
        if has_body {
            Method::Post
        } else if head {
            Method::Head
        } else {
            Method::Get
        }
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Head => reqwest::Method::HEAD,
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Connect => reqwest::Method::CONNECT,
            Method::Options => reqwest::Method::OPTIONS,
            Method::Trace => reqwest::Method::TRACE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = CurlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        STANDARD_METHODS
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CurlError::InvalidMethod {
                method: s.to_string(),
                valid: STANDARD_METHODS
                    .iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("Post".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("OPTIONS".parse::<Method>().unwrap(), Method::Options);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "FETCH".parse::<Method>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("FETCH"));
        assert!(msg.contains("HEAD, GET, POST"));
    }

    #[test]
    fn test_infer() {
        assert_eq!(Method::infer(true, false), Method::Post);
        assert_eq!(Method::infer(true, true), Method::Post);
        assert_eq!(Method::infer(false, true), Method::Head);
        assert_eq!(Method::infer(false, false), Method::Get);
    }
}

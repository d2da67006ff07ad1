//! Validated user intent for one request

use std::path::PathBuf;
use std::time::Duration;

use crate::http::Method;
use crate::logging::Verbosity;

/// Where the request body comes from.
///
/// `-d` and `-F` are mutually exclusive, so a request has exactly one source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BodySource {
    #[default]
    None,
    /// `-d text`
    Inline(String),
    /// `-d @path`
    File(PathBuf),
    /// `-d @-`
    Stdin,
    /// One or more `-F` entries, in command line order
    Form(Vec<String>),
}

impl BodySource {
    /// Classify a `-d` argument
    pub fn from_data(data: &str) -> Self {
        match data.strip_prefix('@') {
            Some("-") => BodySource::Stdin,
            Some(path) => BodySource::File(PathBuf::from(path)),
            None if data.is_empty() => BodySource::None,
            None => BodySource::Inline(data.to_string()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, BodySource::None)
    }
}

/// Everything needed to build, send and render one request
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// Target URL as typed by the user
    pub url: String,
    /// Resolved method (explicit `-X` or inferred)
    pub method: Method,
    /// Raw `key:value` header strings
    pub headers: Vec<String>,
    /// Raw `key:value` trailer strings
    pub trailers: Vec<String>,
    pub body: BodySource,
    /// `None` when the user agent was explicitly set to an empty string
    pub user_agent: Option<String>,
    pub content_md5: bool,
    pub head: bool,
    pub pretty: bool,
    pub verbosity: Verbosity,
    pub verbose_req_body: bool,
    pub verbose_resp_body: bool,
    pub output: Option<PathBuf>,
    pub dump_header: Option<PathBuf>,
    pub proxy: Option<String>,
    pub connect_timeout: Duration,
    /// Overall deadline; `None` means unbounded
    pub max_time: Option<Duration>,
}

impl RequestSpec {
    /// A GET request for `url` with every option at its default
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: Vec::new(),
            trailers: Vec::new(),
            body: BodySource::None,
            user_agent: None,
            content_md5: false,
            head: false,
            pretty: false,
            verbosity: Verbosity::Info,
            verbose_req_body: false,
            verbose_resp_body: false,
            output: None,
            dump_header: None,
            proxy: None,
            connect_timeout: Duration::from_secs(30),
            max_time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data() {
        assert_eq!(BodySource::from_data(""), BodySource::None);
        assert_eq!(BodySource::from_data("a=1&b=2"), BodySource::Inline("a=1&b=2".into()));
        assert_eq!(BodySource::from_data("@-"), BodySource::Stdin);
        assert_eq!(
            BodySource::from_data("@/tmp/body.json"),
            BodySource::File(PathBuf::from("/tmp/body.json"))
        );
        // A bare dash is ordinary inline data
        assert_eq!(BodySource::from_data("-"), BodySource::Inline("-".into()));
    }
}

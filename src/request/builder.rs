//! Request builder
//!
//! Resolves a [`RequestSpec`] into a [`BuiltRequest`]: normalized URL,
//! final header and trailer sets, body stream and framing. Explicit `-H`
//! headers always win over the defaults derived from other flags.

use std::fmt;

use bytes::Bytes;
use http::header::{
    HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, HOST, TRAILER,
    TRANSFER_ENCODING, USER_AGENT,
};
use tokio::fs::File;
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::errors::{CurlError, Result};
use crate::http::Method;
use crate::request::hash::{base64_md5_reader, base64_md5_str};
use crate::request::spec::{BodySource, RequestSpec};
use crate::uploads::chunked::{is_chunked_encoding, stream_reader, ByteStream};
use crate::uploads::multipart::FormBodyBuilder;

/// Default content type for `-d` data
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Header carrying the body digest
pub const CONTENT_MD5: HeaderName = HeaderName::from_static("content-md5");

/// Request body as handed to the transport
pub enum RequestBody {
    Empty,
    /// Fully in memory
    Bytes(Bytes),
    /// Produced while the request is being sent
    Stream(ByteStream),
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Empty => true,
            RequestBody::Bytes(bytes) => bytes.is_empty(),
            RequestBody::Stream(_) => false,
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            RequestBody::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// The wire-level request for one exchange
#[derive(Debug)]
pub struct BuiltRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// Sent after the last chunk; empty unless `chunked`
    pub trailers: HeaderMap,
    pub body: RequestBody,
    /// Authoritative body length; `None` when unknown
    pub content_length: Option<u64>,
    /// Set from an explicit `Host` header
    pub host_override: Option<String>,
    /// Whether the body goes out with chunked transfer encoding
    pub chunked: bool,
}

/// Trim `raw` and default the scheme to `http://`
pub fn normalize_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| {
        let err = CurlError::InvalidUrl { url: candidate.clone(), reason: e.to_string() };
        error!("{}", err);
        err
    })?;

    if url.host_str().map_or(true, str::is_empty) {
        let err = CurlError::InvalidRequest(format!("no host in request url: {}", candidate));
        error!("{}", err);
        return Err(err);
    }
    Ok(url)
}

/// Parse a `key:value` field, splitting on the first colon
pub fn parse_field(
    raw: &str,
    invalid: fn(String) -> CurlError,
) -> Result<(HeaderName, HeaderValue)> {
    let fail = || {
        let err = invalid(raw.to_string());
        error!("{}", err);
        err
    };

    let (key, value) = raw.split_once(':').ok_or_else(fail)?;
    let name = HeaderName::from_bytes(key.trim().as_bytes()).map_err(|_| fail())?;
    let value = HeaderValue::from_str(value.trim()).map_err(|_| fail())?;
    Ok((name, value))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| CurlError::InvalidHeader(value.to_string()))
}

/// Resolves one [`RequestSpec`] into a [`BuiltRequest`]
#[derive(Debug)]
pub struct RequestBuilder<'a> {
    spec: &'a RequestSpec,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(spec: &'a RequestSpec) -> Self {
        Self { spec }
    }

    pub async fn build(self) -> Result<BuiltRequest> {
        let spec = self.spec;
        let url = normalize_url(&spec.url)?;

        let explicit = spec
            .headers
            .iter()
            .map(|h| parse_field(h, CurlError::InvalidHeader))
            .collect::<Result<Vec<_>>>()?;

        let explicit_chunked = explicit.iter().any(|(name, value)| {
            name == TRANSFER_ENCODING && value.to_str().is_ok_and(is_chunked_encoding)
        });
        let explicit_length = explicit
            .iter()
            .rev()
            .find(|(name, _)| name == CONTENT_LENGTH)
            .map(|(_, value)| parse_content_length(value))
            .transpose()?;

        let mut headers = HeaderMap::new();
        let mut trailers = HeaderMap::new();

        if let Some(ref ua) = spec.user_agent {
            headers.insert(USER_AGENT, header_value(ua)?);
        }
        if matches!(spec.body, BodySource::Inline(_)) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_URLENCODED));
        }

        let (body, body_length, digest) = self.resolve_body(explicit_chunked, &mut headers).await?;

        let chunked = match explicit_length {
            Some(_) if explicit_chunked => {
                warn!("explicit Content-Length overrides Transfer-Encoding: chunked");
                false
            }
            Some(_) => false,
            None => explicit_chunked || (body_length.is_none() && !body.is_empty()),
        };
        let content_length = explicit_length.or(if chunked { None } else { body_length });

        if let Some(digest) = digest {
            let value = header_value(&digest)?;
            if chunked {
                debug!("set Content-MD5 trailer: {}", digest);
                trailers.insert(CONTENT_MD5, value);
            } else {
                debug!("set Content-MD5 header: {}", digest);
                headers.insert(CONTENT_MD5, value);
            }
        }

        let mut host_override = None;
        for (name, value) in explicit {
            trace!("add header: {}: {}", name, value.to_str().unwrap_or("<binary>"));
            if name == CONTENT_LENGTH || name == TRANSFER_ENCODING {
                continue;
            }
            if name == HOST {
                host_override = value.to_str().ok().map(str::to_string);
            }
            headers.insert(name, value);
        }

        for raw in &spec.trailers {
            let (name, value) = parse_field(raw, CurlError::InvalidTrailer)?;
            trace!("add trailer: {}: {}", name, value.to_str().unwrap_or("<binary>"));
            trailers.insert(name, value);
        }

        if !trailers.is_empty() {
            if chunked && !body.is_empty() {
                let names = trailers.keys().map(HeaderName::as_str).collect::<Vec<_>>().join(", ");
                headers.insert(TRAILER, header_value(&names)?);
            } else {
                warn!("request has no chunked body, drop trailers: {:?}", trailers);
                trailers.clear();
            }
        }

        Ok(BuiltRequest {
            method: spec.method,
            url,
            headers,
            trailers,
            body,
            content_length,
            host_override,
            chunked,
        })
    }

    /// Body, its length when known, and its digest when `--content-md5` applies
    async fn resolve_body(
        &self,
        chunked: bool,
        headers: &mut HeaderMap,
    ) -> Result<(RequestBody, Option<u64>, Option<String>)> {
        let md5 = self.spec.content_md5;
        match self.spec.body {
            BodySource::Stdin => {
                if md5 {
                    warn!("content md5 is not supported for stdin body");
                }
                let stream: ByteStream = Box::pin(stream_reader(tokio::io::stdin()));
                Ok((RequestBody::Stream(stream), None, None))
            }
            BodySource::File(ref path) => {
                let shown = path.display().to_string();
                let file = File::open(path).await.map_err(|e| {
                    error!("open file: {} error: {}", shown, e);
                    CurlError::file_open(&shown, e)
                })?;

                let length = if chunked {
                    None
                } else {
                    let metadata = file
                        .metadata()
                        .await
                        .map_err(|e| CurlError::file_open(&shown, e))?;
                    Some(metadata.len())
                };

                let digest = if md5 {
                    let mut second = File::open(path)
                        .await
                        .map_err(|e| CurlError::file_open(&shown, e))?;
                    let digest = base64_md5_reader(&mut second)
                        .await
                        .map_err(|e| CurlError::file_open(&shown, e))?;
                    Some(digest)
                } else {
                    None
                };

                let stream: ByteStream = Box::pin(stream_reader(file));
                Ok((RequestBody::Stream(stream), length, digest))
            }
            BodySource::Inline(ref data) => {
                let digest = md5.then(|| base64_md5_str(data));
                let bytes = Bytes::from(data.clone());
                let length = bytes.len() as u64;
                Ok((RequestBody::Bytes(bytes), Some(length), digest))
            }
            BodySource::Form(ref entries) => {
                if md5 {
                    debug!("content md5 is skipped for multipart body");
                }
                let multipart = FormBodyBuilder::new().build(entries).await?;
                headers.insert(CONTENT_TYPE, header_value(&multipart.content_type)?);
                let stream: ByteStream = Box::pin(multipart.stream);
                Ok((RequestBody::Stream(stream), None, None))
            }
            BodySource::None => Ok((RequestBody::Empty, None, None)),
        }
    }
}

fn parse_content_length(value: &HeaderValue) -> Result<u64> {
    let raw = value.to_str().unwrap_or_default();
    raw.parse::<u64>().map_err(|e| {
        let err = CurlError::InvalidContentLength(format!("{}: {}", raw, e));
        error!("{}", err);
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::io::Write;
    use std::path::PathBuf;

    async fn build(spec: &RequestSpec) -> Result<BuiltRequest> {
        RequestBuilder::new(spec).build().await
    }

    fn spec_with(url: &str, f: impl FnOnce(&mut RequestSpec)) -> RequestSpec {
        let mut spec = RequestSpec::new(url);
        f(&mut spec);
        spec
    }

    async fn drain(body: RequestBody) -> Vec<u8> {
        match body {
            RequestBody::Empty => Vec::new(),
            RequestBody::Bytes(bytes) => bytes.to_vec(),
            RequestBody::Stream(mut stream) => {
                let mut out = Vec::new();
                while let Some(chunk) = stream.next().await {
                    out.extend_from_slice(&chunk.unwrap());
                }
                out
            }
        }
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com").unwrap().as_str(), "http://example.com/");
        assert_eq!(
            normalize_url("  https://example.com/a?b=1 ").unwrap().as_str(),
            "https://example.com/a?b=1"
        );
        let once = normalize_url("example.com/path").unwrap();
        assert_eq!(normalize_url(once.as_str()).unwrap(), once);
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            normalize_url("http://exa mple.com"),
            Err(CurlError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_parse_field_splits_on_first_colon() {
        let (name, value) = parse_field("X-Test: a:b", CurlError::InvalidHeader).unwrap();
        assert_eq!(name.as_str(), "x-test");
        assert_eq!(value, "a:b");

        assert!(matches!(
            parse_field("no-colon", CurlError::InvalidHeader),
            Err(CurlError::InvalidHeader(_))
        ));
        assert!(matches!(
            parse_field("bad header: x", CurlError::InvalidTrailer),
            Err(CurlError::InvalidTrailer(_))
        ));
    }

    #[tokio::test]
    async fn test_get_without_body() {
        let spec = spec_with("example.com", |s| s.user_agent = Some("probe/1".into()));
        let req = build(&spec).await.unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.headers.get(USER_AGENT).unwrap(), "probe/1");
        assert!(req.body.is_empty());
        assert_eq!(req.content_length, None);
        assert!(!req.chunked);
    }

    #[tokio::test]
    async fn test_explicit_headers_override_defaults() {
        let spec = spec_with("example.com", |s| {
            s.user_agent = Some("probe/1".into());
            s.body = BodySource::Inline("{}".into());
            s.headers = vec![
                "content-type: application/json".into(),
                "User-Agent: custom".into(),
                "X-Dup: 1".into(),
                "x-dup: 2".into(),
            ];
        });
        let req = build(&spec).await.unwrap();
        assert_eq!(req.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(req.headers.get(USER_AGENT).unwrap(), "custom");
        assert_eq!(req.headers.get_all("x-dup").iter().count(), 1);
        assert_eq!(req.headers.get("x-dup").unwrap(), "2");
    }

    #[tokio::test]
    async fn test_inline_body() {
        let spec = spec_with("example.com", |s| s.body = BodySource::Inline("a=1&b=2".into()));
        let req = build(&spec).await.unwrap();
        assert_eq!(req.headers.get(CONTENT_TYPE).unwrap(), FORM_URLENCODED);
        assert_eq!(req.content_length, Some(7));
        assert!(!req.chunked);
        assert_eq!(drain(req.body).await, b"a=1&b=2");
    }

    #[tokio::test]
    async fn test_host_and_content_length_overrides() {
        let spec = spec_with("example.com", |s| {
            s.body = BodySource::Inline("hello".into());
            s.headers = vec!["Host: virtual.test".into(), "Content-Length: 5".into()];
        });
        let req = build(&spec).await.unwrap();
        assert_eq!(req.host_override.as_deref(), Some("virtual.test"));
        assert_eq!(req.headers.get(HOST).unwrap(), "virtual.test");
        assert_eq!(req.content_length, Some(5));
        assert!(req.headers.get(CONTENT_LENGTH).is_none());
    }

    #[tokio::test]
    async fn test_invalid_content_length() {
        let spec = spec_with("example.com", |s| s.headers = vec!["Content-Length: ten".into()]);
        assert!(matches!(build(&spec).await, Err(CurlError::InvalidContentLength(_))));
    }

    #[tokio::test]
    async fn test_invalid_header() {
        let spec = spec_with("example.com", |s| s.headers = vec!["Accept".into()]);
        assert!(matches!(build(&spec).await, Err(CurlError::InvalidHeader(_))));
    }

    #[tokio::test]
    async fn test_file_body_length_and_md5() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello world").unwrap();

        let spec = spec_with("example.com", |s| {
            s.body = BodySource::File(tmp.path().to_path_buf());
            s.content_md5 = true;
        });
        let req = build(&spec).await.unwrap();
        assert_eq!(req.content_length, Some(11));
        assert!(!req.chunked);
        assert_eq!(req.headers.get(CONTENT_MD5).unwrap(), "XrY7u+Ae7tCTyyK7j1rNww==");
        assert!(req.trailers.is_empty());
        assert_eq!(drain(req.body).await, b"hello world");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let spec = spec_with("example.com", |s| {
            s.body = BodySource::File(PathBuf::from("/__does_not_exist__/body"));
        });
        assert!(matches!(build(&spec).await, Err(CurlError::FileOpen { .. })));
    }

    #[tokio::test]
    async fn test_chunked_md5_goes_to_trailer() {
        let spec = spec_with("example.com", |s| {
            s.body = BodySource::Inline("hello world".into());
            s.content_md5 = true;
            s.headers = vec!["Transfer-Encoding: chunked".into()];
        });
        let req = build(&spec).await.unwrap();
        assert!(req.chunked);
        assert_eq!(req.content_length, None);
        assert!(req.headers.get(CONTENT_MD5).is_none());
        assert_eq!(req.trailers.get(CONTENT_MD5).unwrap(), "XrY7u+Ae7tCTyyK7j1rNww==");
        assert_eq!(req.headers.get(TRAILER).unwrap(), "content-md5");
    }

    #[tokio::test]
    async fn test_explicit_length_beats_chunked() {
        let spec = spec_with("example.com", |s| {
            s.body = BodySource::Inline("abc".into());
            s.headers = vec!["Transfer-Encoding: chunked".into(), "Content-Length: 3".into()];
        });
        let req = build(&spec).await.unwrap();
        assert!(!req.chunked);
        assert_eq!(req.content_length, Some(3));
        assert!(req.headers.get(TRANSFER_ENCODING).is_none());
    }

    #[tokio::test]
    async fn test_trailers_need_chunked() {
        let spec = spec_with("example.com", |s| {
            s.body = BodySource::Inline("abc".into());
            s.trailers = vec!["X-Checksum: 1".into()];
        });
        let req = build(&spec).await.unwrap();
        assert!(req.trailers.is_empty());
        assert!(req.headers.get(TRAILER).is_none());

        let spec = spec_with("example.com", |s| s.trailers = vec!["broken".into()]);
        assert!(matches!(build(&spec).await, Err(CurlError::InvalidTrailer(_))));
    }

    #[tokio::test]
    async fn test_trailers_dropped_without_body() {
        let spec = spec_with("example.com", |s| {
            s.headers = vec!["Transfer-Encoding: chunked".into()];
            s.trailers = vec!["X-A: 1".into()];
        });
        let req = build(&spec).await.unwrap();
        assert!(req.body.is_empty());
        assert!(req.trailers.is_empty());
        assert!(req.headers.get(TRAILER).is_none());
    }

    #[tokio::test]
    async fn test_form_body_is_chunked_multipart() {
        let spec = spec_with("example.com", |s| {
            s.method = Method::Post;
            s.body = BodySource::Form(vec!["a=1".into()]);
            s.content_md5 = true;
            s.trailers = vec!["X-Sent: yes".into()];
        });
        let req = build(&spec).await.unwrap();
        let ct = req.headers.get(CONTENT_TYPE).unwrap().to_str().unwrap().to_string();
        assert!(ct.starts_with("multipart/form-data; boundary="));
        assert!(req.chunked);
        assert_eq!(req.content_length, None);
        assert!(req.trailers.get(CONTENT_MD5).is_none());
        assert_eq!(req.trailers.get("x-sent").unwrap(), "yes");

        let body = String::from_utf8(drain(req.body).await).unwrap();
        assert!(body.contains("Content-Disposition: form-data; name=\"a\"\r\n\r\n1"));
    }
}

//! Response rendering
//!
//! Writes the response head for `-D`/`-I`, logs debug dumps and then emits
//! the body either untouched or re-indented by content type, to stdout or
//! to the `-o` file.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tracing::{error, info, warn};

use crate::context::environment::{is_char_device, Environment};
use crate::errors::{CurlError, Result};
use crate::logging::Verbosity;
use crate::output::formatters::{
    colorize_json, format_bson, format_json, format_response_head, format_xml,
};
use crate::request::RequestSpec;

/// Body formats understood by `--pretty`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Bson,
    Xml,
    Other,
}

impl BodyFormat {
    /// Classify by `Content-Type` prefix
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("application/json") {
            BodyFormat::Json
        } else if content_type.starts_with("application/bson") {
            BodyFormat::Bson
        } else if content_type.starts_with("application/xml") {
            BodyFormat::Xml
        } else {
            BodyFormat::Other
        }
    }
}

/// What to render and where
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// `-I`: print the head to stdout
    pub head: bool,
    pub pretty: bool,
    pub verbosity: Verbosity,
    pub verbose_resp_body: bool,
    pub output: Option<PathBuf>,
    pub dump_header: Option<PathBuf>,
    /// Colour pretty JSON written to stdout
    pub colors: bool,
}

impl RenderOptions {
    pub fn new(spec: &RequestSpec, env: &Environment) -> Self {
        Self {
            head: spec.head,
            pretty: spec.pretty,
            verbosity: spec.verbosity,
            verbose_resp_body: spec.verbose_resp_body,
            output: spec.output.clone(),
            dump_header: spec.dump_header.clone(),
            colors: env.colors,
        }
    }
}

/// Response body, streamed or already read into memory
enum ResponseBody {
    Streaming(reqwest::Response),
    Buffered(Bytes),
}

impl ResponseBody {
    async fn buffer(self) -> Result<Bytes> {
        match self {
            ResponseBody::Streaming(response) => Ok(response.bytes().await?),
            ResponseBody::Buffered(bytes) => Ok(bytes),
        }
    }
}

/// Where body bytes go
enum Destination<'a, W> {
    Stdout { out: &'a mut W, colors: bool },
    File { file: File, path: PathBuf },
}

impl<W: Write> Destination<'_, W> {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        match self {
            Destination::Stdout { out, .. } => {
                out.write_all(buf).map_err(|e| CurlError::file_write("stdout", e))
            }
            Destination::File { file, path } => file
                .write_all(buf)
                .map_err(|e| CurlError::file_write(path.display().to_string(), e)),
        }
    }

    fn is_terminal(&self) -> bool {
        match self {
            Destination::Stdout { colors, .. } => *colors,
            Destination::File { file, .. } => is_char_device(file),
        }
    }

    fn finish(self) -> Result<()> {
        match self {
            Destination::Stdout { out, .. } => {
                out.flush().map_err(|e| CurlError::file_write("stdout", e))
            }
            Destination::File { mut file, path } => {
                file.flush().map_err(|e| CurlError::file_write(path.display().to_string(), e))?;
                info!("save file success: {}", path.display());
                Ok(())
            }
        }
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| {
        error!("write dump header file error: {}", e);
        CurlError::file_write(path.display().to_string(), e)
    })
}

/// Renders one response to stdout (`W`) or the output file
pub struct ResponseRenderer<W> {
    options: RenderOptions,
    stdout: W,
}

impl<W: Write> ResponseRenderer<W> {
    pub fn new(options: RenderOptions, stdout: W) -> Self {
        Self { options, stdout }
    }

    pub fn into_inner(self) -> W {
        self.stdout
    }

    fn destination(&mut self) -> Result<Destination<'_, W>> {
        match self.options.output {
            Some(ref path) => {
                let file = File::create(path)
                    .map_err(|e| CurlError::file_write(path.display().to_string(), e))?;
                Ok(Destination::File { file, path: path.clone() })
            }
            None => Ok(Destination::Stdout { out: &mut self.stdout, colors: self.options.colors }),
        }
    }

    pub async fn render(&mut self, response: reqwest::Response) -> Result<()> {
        let version = response.version();
        let status = response.status();
        let headers = response.headers().clone();
        let head = format_response_head(version, status, &headers);

        if self.options.dump_header.is_some() || self.options.head {
            if let Some(ref path) = self.options.dump_header {
                write_file(path, head.as_bytes())?;
            }
            if self.options.head {
                self.stdout
                    .write_all(head.as_bytes())
                    .map_err(|e| CurlError::file_write("stdout", e))?;
            }
        }

        let mut body = ResponseBody::Streaming(response);
        if !self.options.head && self.options.verbosity.is_debug() {
            if self.options.verbose_resp_body {
                let bytes = body.buffer().await?;
                info!("print response with body: \n{}{}", head, String::from_utf8_lossy(&bytes));
                body = ResponseBody::Buffered(bytes);
            } else {
                info!("print response without body: \n{}", head);
            }
        }

        let declared_empty = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0");
        if declared_empty {
            return Ok(());
        }

        if !self.options.pretty {
            return self.copy_raw(body).await;
        }

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let format = BodyFormat::from_content_type(&content_type);
        let reformat: fn(&[u8]) -> Result<String> = match format {
            BodyFormat::Json => format_json,
            BodyFormat::Bson => format_bson,
            BodyFormat::Xml => format_xml,
            BodyFormat::Other => {
                warn!("pretty not support {}", content_type);
                return self.copy_raw(body).await;
            }
        };

        let bytes = body.buffer().await?;
        if bytes.is_empty() {
            return Ok(());
        }
        let text = match reformat(&bytes) {
            Ok(text) => text,
            Err(e) if format == BodyFormat::Xml => {
                warn!("{}, print raw body", e);
                return self.copy_raw(ResponseBody::Buffered(bytes)).await;
            }
            Err(e) => return Err(e),
        };

        let mut dest = self.destination()?;
        let text = if format != BodyFormat::Xml && dest.is_terminal() {
            colorize_json(&text)
        } else {
            text
        };
        dest.write_all(text.as_bytes())?;
        dest.finish()
    }

    async fn copy_raw(&mut self, body: ResponseBody) -> Result<()> {
        let mut dest = self.destination()?;
        match body {
            ResponseBody::Buffered(bytes) => dest.write_all(&bytes)?,
            ResponseBody::Streaming(mut response) => {
                while let Some(chunk) = response.chunk().await? {
                    dest.write_all(&chunk)?;
                }
            }
        }
        dest.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(content_type: &str, body: impl Into<reqwest::Body>) -> reqwest::Response {
        let resp = http::Response::builder()
            .status(200)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .unwrap();
        reqwest::Response::from(resp)
    }

    async fn render(options: RenderOptions, resp: reqwest::Response) -> Result<String> {
        let mut renderer = ResponseRenderer::new(options, Vec::new());
        renderer.render(resp).await?;
        Ok(String::from_utf8(renderer.into_inner()).unwrap())
    }

    fn pretty() -> RenderOptions {
        RenderOptions { pretty: true, ..Default::default() }
    }

    #[test]
    fn test_body_format_prefixes() {
        assert_eq!(BodyFormat::from_content_type("application/json; charset=utf-8"), BodyFormat::Json);
        assert_eq!(BodyFormat::from_content_type("application/bson"), BodyFormat::Bson);
        assert_eq!(BodyFormat::from_content_type("application/xml"), BodyFormat::Xml);
        assert_eq!(BodyFormat::from_content_type("text/json"), BodyFormat::Other);
        assert_eq!(BodyFormat::from_content_type(""), BodyFormat::Other);
    }

    #[tokio::test]
    async fn test_raw_passthrough() {
        let out = render(RenderOptions::default(), response("application/json", "{\"a\":1}")).await;
        assert_eq!(out.unwrap(), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_pretty_json() {
        let out = render(pretty(), response("application/json", "{\"a\":1}")).await.unwrap();
        assert_eq!(out, "{\n   \"a\": 1\n}\n");
    }

    #[tokio::test]
    async fn test_pretty_json_colored_on_terminal() {
        let options = RenderOptions { colors: true, ..pretty() };
        let out = render(options, response("application/json", "{\"a\":1}")).await.unwrap();
        assert!(out.contains("\x1b["));
    }

    #[tokio::test]
    async fn test_pretty_unsupported_falls_back_to_raw() {
        let body = "plain\r\ntext \x01";
        let out = render(pretty(), response("text/plain", body)).await.unwrap();
        assert_eq!(out, body);
    }

    #[tokio::test]
    async fn test_pretty_xml() {
        let out = render(pretty(), response("application/xml", "<a><b/></a>")).await.unwrap();
        assert_eq!(out, "<a>\n    <b/>\n</a>\n");
    }

    #[tokio::test]
    async fn test_pretty_bson() {
        let mut bytes = Vec::new();
        bson::doc! { "k": "v" }.to_writer(&mut bytes).unwrap();
        let out = render(pretty(), response("application/bson", bytes)).await.unwrap();
        assert_eq!(out, "{\n   \"k\": \"v\"\n}\n");
    }

    #[tokio::test]
    async fn test_pretty_invalid_json_is_decode_error() {
        let out = render(pretty(), response("application/json", "{oops")).await;
        assert!(matches!(out, Err(CurlError::Decode(_))));
    }

    #[tokio::test]
    async fn test_pretty_malformed_xml_falls_back_to_raw() {
        let body = "<a><b>text</c></a>";
        let out = render(pretty(), response("application/xml", body)).await.unwrap();
        assert_eq!(out, body);
    }

    #[tokio::test]
    async fn test_zero_content_length_writes_nothing() {
        let resp = http::Response::builder()
            .status(200)
            .header(CONTENT_LENGTH, "0")
            .body("")
            .unwrap();
        let out = render(RenderOptions::default(), reqwest::Response::from(resp)).await;
        assert_eq!(out.unwrap(), "");
    }

    #[tokio::test]
    async fn test_head_and_dump_header() {
        let dir = tempfile::tempdir().unwrap();
        let dump = dir.path().join("head.txt");
        let options = RenderOptions { head: true, dump_header: Some(dump.clone()), ..Default::default() };

        let resp = http::Response::builder()
            .status(404)
            .header(CONTENT_LENGTH, "0")
            .body("")
            .unwrap();
        let out = render(options, reqwest::Response::from(resp)).await.unwrap();

        let expected = "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n";
        assert_eq!(out, expected);
        assert_eq!(std::fs::read_to_string(dump).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.bin");
        let options = RenderOptions { output: Some(path.clone()), ..Default::default() };

        let out = render(options, response("application/octet-stream", vec![0u8, 1, 2])).await;
        assert_eq!(out.unwrap(), "");
        assert_eq!(std::fs::read(path).unwrap(), vec![0u8, 1, 2]);
    }

    #[tokio::test]
    async fn test_verbose_body_is_replayed() {
        let options = RenderOptions {
            verbosity: Verbosity::Debug,
            verbose_resp_body: true,
            ..Default::default()
        };
        let out = render(options, response("text/plain", "replayed")).await.unwrap();
        assert_eq!(out, "replayed");
    }

    #[tokio::test]
    async fn test_unwritable_output_file() {
        let options = RenderOptions {
            output: Some(PathBuf::from("/__does_not_exist__/out.txt")),
            ..Default::default()
        };
        let out = render(options, response("text/plain", "x")).await;
        assert!(matches!(out, Err(CurlError::FileWrite { .. })));
    }
}

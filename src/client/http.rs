//! HTTP request dispatch
//!
//! This module drives one exchange with reqwest: build the request, dump it
//! when verbose, attach the connection tracer, send, render the response and
//! classify the outcome.

use std::io::Write;
use std::time::Duration;

use futures::StreamExt;
use http::header::{HeaderValue, CONTENT_LENGTH, TRANSFER_ENCODING};
use reqwest::{Client, Response};
use tracing::{error, info};

use crate::client::trace::ConnectionTracer;
use crate::context::Environment;
use crate::errors::{CurlError, Result};
use crate::output::formatters::format_request_head;
use crate::output::{RenderOptions, ResponseRenderer};
use crate::request::{BuiltRequest, RequestBody, RequestBuilder, RequestSpec};
use crate::status::ExitStatus;
use crate::uploads::chunked::{body_with_trailers, once_stream, ByteStream};
use crate::uploads::pipe::pipe;

/// Idle connections are dropped after this long
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
/// Idle connections kept per host
pub const POOL_MAX_IDLE_PER_HOST: usize = 100;
/// TCP keep-alive probe interval
pub const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

/// Transport settings for one invocation
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Connect phase, TLS handshake included
    pub connect_timeout: Duration,
    /// Whole exchange deadline; `None` means unbounded
    pub max_time: Option<Duration>,
    /// Explicit proxy; `None` defers to the environment
    pub proxy: Option<String>,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub tcp_keepalive: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            max_time: None,
            proxy: None,
            pool_idle_timeout: POOL_IDLE_TIMEOUT,
            pool_max_idle_per_host: POOL_MAX_IDLE_PER_HOST,
            tcp_keepalive: TCP_KEEPALIVE,
        }
    }
}

impl TransportConfig {
    pub fn from_spec(spec: &RequestSpec) -> Self {
        Self {
            connect_timeout: spec.connect_timeout,
            max_time: spec.max_time,
            proxy: spec.proxy.clone(),
            ..Self::default()
        }
    }
}

/// Build the reqwest client, wiring in the tracer's hooks when present
pub fn build_client(config: &TransportConfig, tracer: Option<&ConnectionTracer>) -> Result<Client> {
    let mut builder = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .referer(false)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .tcp_keepalive(config.tcp_keepalive)
        .http1_title_case_headers()
        .tls_info(true);

    if let Some(max_time) = config.max_time {
        builder = builder.timeout(max_time);
    }

    if let Some(ref proxy) = config.proxy {
        let proxy = reqwest::Proxy::all(proxy.as_str()).map_err(|e| {
            let err = CurlError::InvalidProxy(format!("{}: {}", proxy, e));
            error!("{}", err);
            err
        })?;
        builder = builder.proxy(proxy);
    }

    if let Some(tracer) = tracer {
        builder = builder
            .dns_resolver(tracer.resolver())
            .connector_layer(tracer.connect_layer());
    }

    builder.build().map_err(|e| {
        error!("build http client error: {}", e);
        CurlError::Transport(e)
    })
}

/// Headers as they go on the wire, framing included
fn wire_headers(request: &BuiltRequest) -> http::HeaderMap {
    let mut headers = request.headers.clone();
    if let Some(length) = request.content_length {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    } else if request.chunked && !request.body.is_empty() {
        headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
    }
    headers
}

/// Copy every body chunk to `sink` while passing it on unchanged
pub fn tee_body<W>(body: RequestBody, sink: W) -> RequestBody
where
    W: Write + Send + 'static,
{
    let mut source: ByteStream = match body {
        RequestBody::Empty => return RequestBody::Empty,
        RequestBody::Bytes(bytes) => once_stream(bytes),
        RequestBody::Stream(stream) => stream,
    };

    let (writer, reader) = pipe();
    tokio::spawn(async move {
        let mut sink = sink;
        while let Some(chunk) = source.next().await {
            match chunk {
                Ok(bytes) => {
                    if let Err(e) = sink.write_all(&bytes) {
                        error!("copy body to stderr err: {}", e);
                    }
                    if writer.write(bytes).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    error!("copy body to stderr err: {}", e);
                    writer.close_with_error(e).await;
                    return;
                }
            }
        }
        let _ = sink.flush();
    });
    RequestBody::Stream(Box::pin(reader))
}

/// Log the request head and, with `--verbose-req-body`, tee the body to stderr
fn dump_request(mut request: BuiltRequest, with_body: bool) -> BuiltRequest {
    let head = format_request_head(
        request.method.as_str(),
        &request.url,
        request.host_override.as_deref(),
        &wire_headers(&request),
    );

    let with_body = with_body && !request.body.is_empty();
    if with_body {
        info!("print request with body: \n{}", head);
        request.body = tee_body(request.body, std::io::stderr());
    } else {
        info!("print request without body: \n{}", head);
    }
    request
}

/// Send `request` on `client`
pub async fn execute(
    client: &Client,
    request: BuiltRequest,
    tracer: Option<&ConnectionTracer>,
) -> Result<Response> {
    let headers = wire_headers(&request);
    let BuiltRequest { method, url, trailers, body, chunked, .. } = request;

    if let Some(tracer) = tracer {
        tracer.get_conn(&url);
        tracer.wrote_header_fields(&headers);
    }

    let mut builder = client.request(method.to_reqwest(), url);
    let mut headers = headers;
    headers.remove(TRANSFER_ENCODING);
    builder = builder.headers(headers);

    builder = match body {
        RequestBody::Empty => builder,
        RequestBody::Bytes(bytes) if !chunked => builder.body(bytes),
        RequestBody::Bytes(bytes) => builder.body(chunked_body(once_stream(bytes), trailers)),
        RequestBody::Stream(stream) if chunked => builder.body(chunked_body(stream, trailers)),
        RequestBody::Stream(stream) => builder.body(reqwest::Body::wrap_stream(stream)),
    };

    let response = builder.send().await.map_err(|e| {
        error!("send request error: {}", e);
        CurlError::Transport(e)
    })?;

    if let Some(tracer) = tracer {
        tracer.wrote_request();
        tracer.observe_response(&response);
    }
    Ok(response)
}

fn chunked_body(stream: ByteStream, trailers: http::HeaderMap) -> reqwest::Body {
    if trailers.is_empty() {
        reqwest::Body::wrap_stream(stream)
    } else {
        body_with_trailers(stream, trailers)
    }
}

/// Runs one request/response cycle
#[derive(Debug)]
pub struct RequestDispatcher {
    spec: RequestSpec,
    env: Environment,
}

impl RequestDispatcher {
    pub fn new(spec: RequestSpec, env: Environment) -> Self {
        Self { spec, env }
    }

    /// Build, send and render, writing the body to `stdout`.
    ///
    /// A response with status 400 or above is still rendered, followed by an
    /// empty line, and then reported as [`CurlError::HttpStatus`].
    pub async fn dispatch<W: Write>(&self, stdout: W) -> Result<()> {
        let mut request = RequestBuilder::new(&self.spec).build().await?;

        if self.spec.verbosity.is_debug() {
            request = dump_request(request, self.spec.verbose_req_body);
        }

        let tracer = self.spec.verbosity.is_trace().then(ConnectionTracer::new);
        let client = build_client(&TransportConfig::from_spec(&self.spec), tracer.as_ref())?;
        let response = execute(&client, request, tracer.as_ref()).await?;
        let status = response.status().as_u16();

        let mut renderer = ResponseRenderer::new(RenderOptions::new(&self.spec, &self.env), stdout);
        renderer.render(response).await?;

        if ExitStatus::from_http_status(status) == ExitStatus::Error {
            let mut stdout = renderer.into_inner();
            writeln!(stdout).map_err(|e| CurlError::file_write("stdout", e))?;
            let err = CurlError::HttpStatus(status);
            error!("{}", err);
            return Err(err);
        }
        Ok(())
    }
}

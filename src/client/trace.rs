//! Connection lifecycle tracing (`--trace`)
//!
//! Hooks are attached in three places: a DNS resolver that logs lookups, a
//! connector layer that times TCP connect plus TLS handshake, and the
//! dispatcher, which reports header writes and what the response says about
//! the connection it arrived on. Every hook only logs.

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use http::header::EXPECT;
use http::{HeaderMap, Version};
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use tower_layer::Layer;
use tower_service::Service;
use tracing::{error, trace};
use url::Url;

use crate::output::formatters::headers::version_label;

/// Observes one request's connection lifecycle
#[derive(Debug, Clone)]
pub struct ConnectionTracer {
    started: Instant,
    connects: Arc<AtomicUsize>,
}

impl Default for ConnectionTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionTracer {
    pub fn new() -> Self {
        Self { started: Instant::now(), connects: Arc::new(AtomicUsize::new(0)) }
    }

    /// DNS resolver reporting DNSStart / DNSDone
    pub fn resolver(&self) -> Arc<TracingResolver> {
        Arc::new(TracingResolver)
    }

    /// Connector layer reporting ConnectStart / ConnectDone
    pub fn connect_layer(&self) -> ConnectTraceLayer {
        ConnectTraceLayer { connects: Arc::clone(&self.connects) }
    }

    /// New connections opened so far
    pub fn connection_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn get_conn(&self, url: &Url) {
        let host = url.host_str().unwrap_or_default();
        let port = url.port_or_known_default().unwrap_or_default();
        trace!("GetConn, host_port: {}:{}", host, port);
    }

    pub fn wrote_header_fields(&self, headers: &HeaderMap) {
        for (name, value) in headers {
            trace!(
                "WroteHeaderField, key: {}, value: {}",
                name,
                value.to_str().unwrap_or("<binary>")
            );
        }
        let expects_continue = headers
            .get(EXPECT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("100-continue"));
        if expects_continue {
            trace!("Wait100Continue");
        }
    }

    pub fn wrote_request(&self) {
        trace!("WroteRequest, elapsed: {:?}", self.started.elapsed());
    }

    /// Report everything the response tells about its connection
    pub fn observe_response(&self, response: &reqwest::Response) {
        trace!("GotFirstResponseByte, elapsed: {:?}", self.started.elapsed());

        let reused = self.connection_count() == 0;
        match response.remote_addr() {
            Some(addr) => trace!(
                "GotConn, remote_addr: {}, reused: {}, elapsed: {:?}",
                addr,
                reused,
                self.started.elapsed()
            ),
            None => trace!("GotConn, reused: {}, elapsed: {:?}", reused, self.started.elapsed()),
        }

        if let Some(info) = response.extensions().get::<reqwest::tls::TlsInfo>() {
            let cert_size = info.peer_certificate().map(<[u8]>::len).unwrap_or_default();
            trace!("{}", handshake_done(response.version(), cert_size));
        }
    }
}

/// Trace line for a completed TLS handshake
fn handshake_done(http_version: Version, peer_certificate_bytes: usize) -> String {
    format!(
        "TLSHandshakeDone, http_version: {}, peer_certificate_bytes: {}",
        version_label(http_version),
        peer_certificate_bytes
    )
}

/// System resolver that logs each lookup
#[derive(Debug, Clone, Copy)]
pub struct TracingResolver;

impl Resolve for TracingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let host = name.as_str().to_string();
        Box::pin(async move {
            let started = Instant::now();
            trace!("DNSStart, host: {}", host);
            match tokio::net::lookup_host((host.as_str(), 0)).await {
                Ok(addrs) => {
                    let addrs: Vec<SocketAddr> = addrs.collect();
                    let ips = addrs.iter().map(|a| a.ip().to_string()).collect::<Vec<_>>();
                    trace!("DNSDone, addrs: [{}], elapsed: {:?}", ips.join(", "), started.elapsed());
                    let addrs: Addrs = Box::new(addrs.into_iter());
                    Ok(addrs)
                }
                Err(e) => {
                    error!("DNSDone, host: {}, error: {}, elapsed: {:?}", host, e, started.elapsed());
                    let err: Box<dyn std::error::Error + Send + Sync> = Box::new(e);
                    Err(err)
                }
            }
        })
    }
}

/// Wraps the transport connector with [`ConnectTraceService`]
#[derive(Debug, Clone)]
pub struct ConnectTraceLayer {
    connects: Arc<AtomicUsize>,
}

impl<S> Layer<S> for ConnectTraceLayer {
    type Service = ConnectTraceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ConnectTraceService { inner, connects: Arc::clone(&self.connects) }
    }
}

/// Times each new connection, TLS handshake included
#[derive(Debug, Clone)]
pub struct ConnectTraceService<S> {
    inner: S,
    connects: Arc<AtomicUsize>,
}

impl<S, R> Service<R> for ConnectTraceService<S>
where
    S: Service<R>,
    S::Response: Send + 'static,
    S::Error: fmt::Display + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: R) -> Self::Future {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let started = Instant::now();
        trace!("ConnectStart");
        let connecting = self.inner.call(req);
        Box::pin(async move {
            let result = connecting.await;
            match result {
                Ok(_) => trace!("ConnectDone, elapsed: {:?}", started.elapsed()),
                Err(ref e) => error!("ConnectDone, error: {}, elapsed: {:?}", e, started.elapsed()),
            }
            result
        })
    }
}

//! HTTP client functionality

pub mod http;
pub mod trace;

// Re-exports
pub use self::http::{build_client, execute, RequestDispatcher, TransportConfig};
pub use trace::ConnectionTracer;

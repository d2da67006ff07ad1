//! CLI argument definitions using clap
//!
//! This module defines all command-line flags for rcurl. Flag names follow
//! curl where curl has an equivalent.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use crate::version::default_user_agent;

/// rcurl - send a raw HTTP request and print the response
#[derive(Parser, Debug, Clone)]
#[command(name = "rcurl", about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Args {
    /// Request URL (http:// is assumed when no scheme is given)
    #[arg(value_name = "URL")]
    pub url_arg: Option<String>,

    /// Request URL, used when no positional URL is given
    #[arg(long = "url", value_name = "URL")]
    pub url: Option<String>,

    /// Set the User-Agent header
    #[arg(short = 'A', long = "user-agent", value_name = "NAME", default_value_t = default_user_agent())]
    pub user_agent: String,

    /// Request method (HEAD|GET|POST|PUT|PATCH|DELETE|CONNECT|OPTIONS|TRACE)
    #[arg(short = 'X', long = "request", value_name = "METHOD")]
    pub request: Option<String>,

    /// Extra header "key:value"; repeatable, explicit headers override defaults
    #[arg(short = 'H', long = "header", value_name = "HEADER", action = ArgAction::Append)]
    pub headers: Vec<String>,

    /// Body data; @file reads a file, @- reads standard input
    #[arg(short = 'd', long = "data", value_name = "DATA", conflicts_with = "form")]
    pub data: Option<String>,

    /// Multipart form entry "name=value[;filename=..][;type=..]", @file uploads a file
    #[arg(short = 'F', long = "form", value_name = "ENTRY", action = ArgAction::Append)]
    pub form: Vec<String>,

    /// Write the response body to a file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print version information
    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    pub version: bool,

    /// Write the response status line and headers to a file
    #[arg(short = 'D', long = "dump-header", value_name = "FILE")]
    pub dump_header: Option<PathBuf>,

    /// Use proxy [protocol://]host[:port]
    #[arg(short = 'x', long = "proxy", value_name = "URL")]
    pub proxy: Option<String>,

    /// Send a HEAD request by default and print only the response head
    #[arg(short = 'I', long = "head", action = ArgAction::SetTrue)]
    pub head: bool,

    /// Debug logging, including request and response heads
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Copy the request body to stderr in verbose mode
    #[arg(long = "verbose-req-body", action = ArgAction::SetTrue)]
    pub verbose_req_body: bool,

    /// Include the response body in the verbose response dump
    #[arg(long = "verbose-resp-body", action = ArgAction::SetTrue)]
    pub verbose_resp_body: bool,

    /// Trace logging, including connection lifecycle events
    #[arg(long = "trace", action = ArgAction::SetTrue)]
    pub trace: bool,

    /// Discard all log output
    #[arg(short = 's', long = "silent", action = ArgAction::SetTrue)]
    pub silent: bool,

    /// Pretty print JSON, BSON and XML response bodies
    #[arg(short = 'p', long = "pretty", action = ArgAction::SetTrue)]
    pub pretty: bool,

    /// Add a Content-MD5 header (or trailer when chunked) for -d bodies
    #[arg(long = "content-md5", action = ArgAction::SetTrue)]
    pub content_md5: bool,

    /// Trailer "key:value" sent after a chunked body; repeatable
    #[arg(long = "trailer", value_name = "TRAILER", action = ArgAction::Append)]
    pub trailers: Vec<String>,

    /// Maximum time in fractional seconds for the whole request (0 = no limit)
    #[arg(short = 'm', long = "max-time", value_name = "SECONDS", default_value_t = 0.0)]
    pub max_time: f64,

    /// Maximum time in fractional seconds to establish the connection
    #[arg(long = "connect-timeout", value_name = "SECONDS", default_value_t = 30.0)]
    pub connect_timeout: f64,

    /// Log line format
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log format for diagnostic output
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text lines (default)
    #[default]
    Text,
    /// JSON Lines format for parsing
    Json,
}

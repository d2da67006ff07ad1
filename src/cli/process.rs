//! Post-processing argument logic
//!
//! Turns parsed flags into a validated [`RequestSpec`]: URL selection,
//! method validation or inference, body source classification and timeout
//! conversion. Nothing here touches the network or the file system.

use std::time::Duration;

use crate::cli::args::Args;
use crate::errors::CurlError;
use crate::http::Method;
use crate::logging::Verbosity;
use crate::request::{BodySource, RequestSpec};

/// Pick the target URL: the positional argument wins over `--url`
pub fn resolve_url_arg(args: &Args) -> Result<String, CurlError> {
    args.url_arg
        .clone()
        .or_else(|| args.url.clone())
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| CurlError::InvalidArgument("url argument is required".to_string()))
}

fn seconds(flag: &str, value: f64) -> Result<Duration, CurlError> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| CurlError::InvalidArgument(format!("invalid {} value: {}", flag, value)))
}

/// Process raw CLI arguments into a usable form
pub fn process_args(args: &Args) -> Result<RequestSpec, CurlError> {
    let url = resolve_url_arg(args)?;

    let data = args.data.as_deref().map(BodySource::from_data).unwrap_or_default();
    let body = match (data, args.form.is_empty()) {
        (data, true) => data,
        (BodySource::None, false) => BodySource::Form(args.form.clone()),
        (_, false) => {
            return Err(CurlError::InvalidArgument(
                "--data and --form cannot be used together".to_string(),
            ))
        }
    };

    let method = match args.request.as_deref() {
        Some(m) if !m.trim().is_empty() => m.parse::<Method>()?,
        _ => Method::infer(!body.is_none(), args.head),
    };

    let max_time = match seconds("--max-time", args.max_time)? {
        d if d.is_zero() => None,
        d => Some(d),
    };

    Ok(RequestSpec {
        url,
        method,
        headers: args.headers.clone(),
        trailers: args.trailers.clone(),
        body,
        user_agent: Some(args.user_agent.clone()).filter(|ua| !ua.is_empty()),
        content_md5: args.content_md5,
        head: args.head,
        pretty: args.pretty,
        verbosity: Verbosity::from_flags(args.silent, args.trace, args.verbose),
        verbose_req_body: args.verbose_req_body,
        verbose_resp_body: args.verbose_resp_body,
        output: args.output.clone(),
        dump_header: args.dump_header.clone(),
        proxy: args.proxy.clone().filter(|p| !p.is_empty()),
        connect_timeout: seconds("--connect-timeout", args.connect_timeout)?,
        max_time,
    })
}

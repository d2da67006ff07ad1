//! HTTP message head serialization
//!
//! Produces the text used for `-D`, `-I` and the debug dumps: a start line,
//! one `Name: value` line per header value and a terminating blank line,
//! all CRLF separated.

use http::{HeaderMap, StatusCode, Version};
use url::Url;

/// Canonical `Title-Case` form of a header name
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        upper = c == '-';
    }
    out
}

/// Protocol label for a start line
pub fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}

fn write_header_lines(out: &mut String, headers: &HeaderMap, sorted: bool) {
    let mut names: Vec<_> = headers.keys().collect();
    if sorted {
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    }
    for name in names {
        let title = title_case(name.as_str());
        for value in headers.get_all(name) {
            out.push_str(&title);
            out.push_str(": ");
            out.push_str(&String::from_utf8_lossy(value.as_bytes()));
            out.push_str("\r\n");
        }
    }
}

/// Status line and headers, sorted by name, ending with a blank line
pub fn format_response_head(version: Version, status: StatusCode, headers: &HeaderMap) -> String {
    let mut out = format!(
        "{} {} {}\r\n",
        version_label(version),
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    );
    write_header_lines(&mut out, headers, true);
    out.push_str("\r\n");
    out
}

/// Request line, `Host` and headers in insertion order, ending with a blank line
pub fn format_request_head(
    method: &str,
    url: &Url,
    host_override: Option<&str>,
    headers: &HeaderMap,
) -> String {
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    let host = match host_override {
        Some(host) => host.to_string(),
        None => match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        },
    };

    let mut out = format!("{} {} HTTP/1.1\r\nHost: {}\r\n", method, target, host);
    let mut rest = headers.clone();
    rest.remove(http::header::HOST);
    write_header_lines(&mut out, &rest, false);
    out.push_str("\r\n");
    out
}

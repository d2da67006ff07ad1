//! Version report and default user agent

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit id stamped by the release build, if any
pub const COMMIT_ID: &str = match option_env!("RCURL_COMMIT_ID") {
    Some(id) => id,
    None => "<unknown-commit-id>",
};

/// Build timestamp stamped by the release build, if any
pub const BUILD_TIME: &str = match option_env!("RCURL_BUILD_TIME") {
    Some(time) => time,
    None => "<unknown-build-time>",
};

pub const RUST_VERSION: &str = match option_env!("RCURL_RUSTC_VERSION") {
    Some(v) => v,
    None => "<unknown-rust-version>",
};

pub fn runtime_platform() -> String {
    format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH)
}

/// `rcurl/<version>/(<os>/<arch>)`
pub fn default_user_agent() -> String {
    format!("rcurl/{}/({})", VERSION, runtime_platform())
}

pub fn hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "<unknown-hostname>".to_string())
}

pub fn username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "<unknown-user>".to_string())
}

/// Lines printed by `-V/--version`
pub fn version_info() -> String {
    let lines = [
        format!("Version: {}", VERSION),
        format!("CommitID: {}", COMMIT_ID),
        format!("BuildTime: {}", BUILD_TIME),
        format!("RustVersion: {}", RUST_VERSION),
        format!("DefaultUserAgent: {}", default_user_agent()),
        format!("Platform: {}", runtime_platform()),
        format!("Hostname: {}", hostname()),
        format!("Username: {}", username()),
    ];
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

//! Common test utilities for rcurl integration tests
//!
//! This module provides shared test infrastructure including:
//! - CLI invocation helpers
//! - Output inspection helpers
//! - Temporary fixture files

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// A URL whose port should never be listening
pub const CLOSED_PORT_URL: &str = "http://127.0.0.1:9/get";

/// Result of running the CLI
#[derive(Debug)]
pub struct CliResponse {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Raw exit code
    pub exit_code: i32,
}

impl CliResponse {
    /// Check if stdout contains a substring
    pub fn contains(&self, needle: &str) -> bool {
        self.stdout.contains(needle)
    }

    /// Parse stdout as JSON
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(self.stdout.trim()).ok()
    }
}

impl std::ops::Deref for CliResponse {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.stdout
    }
}

/// Run rcurl with the given arguments (excluding the program name)
pub fn rcurl(args: &[&str]) -> CliResponse {
    run(args, None)
}

/// Run rcurl feeding `stdin` to the process
pub fn rcurl_with_stdin(args: &[&str], stdin: &[u8]) -> CliResponse {
    run(args, Some(stdin))
}

fn run(args: &[&str], stdin: Option<&[u8]>) -> CliResponse {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rcurl"));

    // Keep a hung exchange from stalling the suite
    cmd.args(["--max-time", "5"]);
    cmd.args(args);
    cmd.env_remove("RCURL_LOG");
    cmd.env("NO_COLOR", "1");

    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    match stdin {
        Some(data) => {
            cmd.stdin(Stdio::piped());
            let mut child = cmd.spawn().expect("Failed to spawn command");
            {
                let mut pipe = child.stdin.take().expect("Failed to open stdin");
                pipe.write_all(data).expect("Failed to write to stdin");
            }
            let output = child.wait_with_output().expect("Failed to wait for command");
            parse_output(output)
        }
        None => {
            cmd.stdin(Stdio::null());
            let output = cmd.output().expect("Failed to execute command");
            parse_output(output)
        }
    }
}

fn parse_output(output: Output) -> CliResponse {
    CliResponse {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(1),
    }
}

/// Strip ANSI color codes from a string
pub fn strip_colors(s: &str) -> String {
    let re = regex::Regex::new(r"\x1b\[[\d;]*m").unwrap();
    re.replace_all(s, "").to_string()
}

/// Create a temporary file with the given content
pub fn create_temp_file(name: &str, content: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = dir.path().join(name);
    std::fs::write(&file_path, content).expect("Failed to write temp file");
    (dir, file_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_colors() {
        let colored = "\x1b[38;5;14m\"a\"\x1b[0m";
        assert_eq!(strip_colors(colored), "\"a\"");
    }
}

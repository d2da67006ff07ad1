//! Environment struct (terminal detection)

use std::fs::File;

/// Execution environment
#[derive(Debug, Clone)]
pub struct Environment {
    pub stdin_isatty: bool,
    pub stdout_isatty: bool,
    pub stderr_isatty: bool,
    /// Colour pretty output sent to a terminal
    pub colors: bool,
    pub program_name: String,
}

impl Environment {
    /// Probe the real process streams
    pub fn init() -> Self {
        Self::default()
    }

    /// An environment where no stream is a terminal
    pub fn detached() -> Self {
        Self {
            stdin_isatty: false,
            stdout_isatty: false,
            stderr_isatty: false,
            colors: false,
            program_name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        let stdout_isatty = atty::is(atty::Stream::Stdout);
        Self {
            stdin_isatty: atty::is(atty::Stream::Stdin),
            stdout_isatty,
            stderr_isatty: atty::is(atty::Stream::Stderr),
            colors: stdout_isatty && std::env::var_os("NO_COLOR").is_none(),
            program_name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

/// Whether an opened output file is a character device (e.g. `/dev/tty`)
pub fn is_char_device(file: &File) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        file.metadata().map(|m| m.file_type().is_char_device()).unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        let _ = file;
        false
    }
}

//! Diagnostic logging setup
//!
//! The level is derived once from the command line and handed to the
//! components that change behavior with it, instead of being queried from
//! the subscriber.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::LogFormat;

/// Environment variable holding `EnvFilter` directives that override the
/// level chosen by flags
pub const LOG_ENV: &str = "RCURL_LOG";

/// Diagnostic verbosity tiers, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// No log output at all
    Silent,
    #[default]
    Info,
    /// Request/response heads are logged
    Debug,
    /// Builder decisions and connection lifecycle events are logged
    Trace,
}

impl Verbosity {
    /// `--silent` wins over `--trace`, which wins over `--verbose`
    pub fn from_flags(silent: bool, trace: bool, verbose: bool) -> Self {
        if silent {
            Verbosity::Silent
        } else if trace {
            Verbosity::Trace
        } else if verbose {
            Verbosity::Debug
        } else {
            Verbosity::Info
        }
    }

    /// Whether request/response dumps should be produced
    pub fn is_debug(self) -> bool {
        self >= Verbosity::Debug
    }

    pub fn is_trace(self) -> bool {
        self == Verbosity::Trace
    }

    fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Silent => LevelFilter::OFF,
            Verbosity::Info => LevelFilter::INFO,
            Verbosity::Debug => LevelFilter::DEBUG,
            Verbosity::Trace => LevelFilter::TRACE,
        }
    }
}

/// Install the global subscriber writing to stderr.
///
/// Nothing is installed for [`Verbosity::Silent`]. Calling this twice is
/// harmless; the second installation is ignored.
pub fn init(verbosity: Verbosity, format: LogFormat) {
    if verbosity == Verbosity::Silent {
        return;
    }

    // Dependencies stay at warn so --trace shows our events, not the transport's.
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,{}={}",
            env!("CARGO_CRATE_NAME"),
            verbosity.level_filter()
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if result.is_err() {
        tracing::debug!("log subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_precedence() {
        assert_eq!(Verbosity::from_flags(true, true, true), Verbosity::Silent);
        assert_eq!(Verbosity::from_flags(false, true, true), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(false, false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false, false), Verbosity::Info);
    }

    #[test]
    fn test_ordering() {
        assert!(Verbosity::Trace.is_debug());
        assert!(Verbosity::Debug.is_debug());
        assert!(!Verbosity::Info.is_debug());
        assert!(!Verbosity::Silent.is_debug());
        assert!(Verbosity::Trace.is_trace());
        assert!(!Verbosity::Debug.is_trace());
    }
}

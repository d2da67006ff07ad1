use clap::Parser;

use crate::cli::{process_args, Args};
use crate::client::RequestDispatcher;
use crate::context::Environment;
use crate::errors::CurlError;
use crate::logging;
use crate::status::ExitStatus;
use crate::version::version_info;

/// Main entry point for the CLI.
///
/// Parses arguments, installs logging and runs one request on a fresh
/// runtime. Every failure maps to [`ExitStatus::Error`].
pub fn run(args: Vec<String>, mut env: Environment) -> ExitStatus {
    if let Some(name) = args.first() {
        if let Some(basename) = std::path::Path::new(name).file_stem() {
            env.program_name = basename.to_string_lossy().to_string();
        }
    }

    let parsed = match Args::try_parse_from(&args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    if parsed.version {
        print!("{}", version_info());
        return ExitStatus::Success;
    }

    let spec = match process_args(&parsed) {
        Ok(spec) => spec,
        Err(e) => return handle_error(e),
    };

    logging::init(spec.verbosity, parsed.log_format);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => return handle_error(CurlError::Io(e)),
    };

    let dispatcher = RequestDispatcher::new(spec, env);
    match runtime.block_on(dispatcher.dispatch(std::io::stdout())) {
        Ok(()) => ExitStatus::Success,
        Err(e) => handle_error(e),
    }
}

fn handle_error(error: CurlError) -> ExitStatus {
    eprintln!("Error: {}", error);
    ExitStatus::Error
}

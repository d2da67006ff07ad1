//! rcurl binary entry point

use rcurl::context::Environment;
use rcurl::status::ExitStatus;

/// Returns ExitStatus directly, which implements std::process::Termination.
fn main() -> ExitStatus {
    let args: Vec<String> = std::env::args().collect();
    rcurl::core::run(args, Environment::init())
}

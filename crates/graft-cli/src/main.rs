//! CLI entrypoint for the graft structural search and replace tool.
//!
//! The binary delegates to [`graft_cli::run`], which parses arguments,
//! loads configuration, and transforms each file named on the command line.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    graft_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}

//! Startup option handling.

use crate::error::ShellError;
use std::io::{self, Write};

/// What `main` should do after looking at the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupAction {
    /// Usage was printed; exit without entering the loop.
    Help,
    /// The version was printed; exit without entering the loop.
    Version,
    /// Enter the read-eval loop.
    Interactive,
}

/// Scan startup arguments (program name excluded).
///
/// The first argument that starts with `--` decides the outcome and ends the
/// scan; other arguments are ignored. `--help` and `--version` print to `out`
/// and request exit. Any other `--x`, `--` included, reports that no option
/// was specified and continues into interactive mode.
pub fn scan_options<S: AsRef<str>>(args: &[S], out: &mut dyn Write) -> io::Result<StartupAction> {
    let Some(option) = args.iter().find_map(|arg| arg.as_ref().strip_prefix("--")) else {
        return Ok(StartupAction::Interactive);
    };
    match option {
        "help" => {
            crate::write_help(out)?;
            Ok(StartupAction::Help)
        }
        "version" => {
            writeln!(out, "{} {}", crate::PNAME, crate::VERSION)?;
            Ok(StartupAction::Version)
        }
        _ => {
            writeln!(out, "{}", ShellError::NoOption)?;
            Ok(StartupAction::Interactive)
        }
    }
}

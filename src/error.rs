//! Diagnostics reported by the shell.
//!
//! Every variant renders as the complete one-line message that is printed to
//! the user, so callers only ever need `writeln!(out, "{err}")`.

use nix::errno::Errno;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// A built-in required an argument that was not supplied.
    #[error("ash {0}: error: expected argument ")]
    MissingArgument(String),

    /// A built-in argument failed its value-format check.
    #[error("ash {0}: error: incorrect value type ")]
    InvalidValue(String),

    /// `builtin <name>` was asked about a name that is not a built-in.
    #[error("ash {0}: error: unrecognized command ")]
    UnrecognizedCommand(String),

    /// An operating system call made by a built-in failed.
    #[error("ash {command}: error: {} ", describe(.source))]
    Builtin { command: String, source: io::Error },

    /// The built-in's argument parser rejected the arguments.
    #[error("ash {command}: error: {message} ")]
    InvalidArguments { command: String, message: String },

    /// The external program could not be located or started.
    #[error("ash: error: {command}: {}", describe(.source))]
    Spawn { command: String, source: io::Error },

    /// The external program was killed by a signal.
    #[error("ash {0}: error: abnormal termination ")]
    AbnormalTermination(String),

    #[error("ash: error: too many arguments (max {})", crate::lexer::MAX_ARGS)]
    TooManyArguments,

    #[error("ash: error: no option specified")]
    NoOption,
}

/// Platform description of an I/O error, without Rust's `(os error N)` suffix.
pub fn describe(err: &io::Error) -> String {
    match err.raw_os_error() {
        Some(code) => Errno::from_raw(code).desc().to_owned(),
        None => err.to_string(),
    }
}

//! ash, the acorn shell.
//!
//! A small interactive command interpreter: it reads a line, splits it into
//! arguments, resolves a handful of built-in commands and read-only `$NAME`
//! variables, and otherwise launches an external program and waits for it.
//!
//! The main entry point is [`Interpreter`], which owns the session
//! [`Environment`](env::Environment) and a list of command factories. Lines
//! come from a [`LineReader`](io_adapters::LineReader): a `rustyline` editor
//! on a terminal, or any buffered stream otherwise.

mod builtin;
pub mod cli;
pub mod command;
pub mod env;
pub mod error;
mod external;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod logging;
pub mod parser;
pub mod vars;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;

pub use builtin::write_help;

/// Program name used as the prefix of every diagnostic.
pub const PNAME: &str = "ash";

/// Version string reported by `--version` and `$VERSION`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serializes tests that change the process working directory.
#[cfg(test)]
pub(crate) fn lock_current_dir() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

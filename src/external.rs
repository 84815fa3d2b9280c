use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Streams};
use crate::env::Environment;
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::vars::Variable;
use anyhow::Result;
use log::debug;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};

/// Search path used when `PATH` was not set at startup.
pub const DEFAULT_SEARCH_PATH: &str = "/bin:/usr/bin";

/// Command that is not a builtin.
pub struct ExternalCommand {
    name: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    fn report_spawn_failure(&self, io: Streams<'_>, source: io::Error) -> Result<ExitCode> {
        let err = ShellError::Spawn {
            command: self.name.clone(),
            source,
        };
        writeln!(io.stdout, "{err}")?;
        Ok(127)
    }
}

/// Accepts every name, so it must be the last factory consulted.
impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        Some(Box::new(ExternalCommand::new(
            name,
            args.iter().map(|x| x.to_string()).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, io: Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        let search_paths = env.vars.get(Variable::Path).unwrap_or(DEFAULT_SEARCH_PATH);
        let Some(program) = find_command_path(OsStr::new(search_paths), Path::new(&self.name))
        else {
            return self.report_spawn_failure(io, io::Error::from(Errno::ENOENT));
        };

        // The child shares our stdout; anything we buffered must come first.
        io.stdout.flush()?;

        debug!("spawning {} as {:?}", self.name, program);
        let status = std::process::Command::new(&*program)
            .arg0(&self.name)
            .args(&self.args)
            .status();

        let exit_status = match status {
            Ok(status) => status,
            Err(e) => return self.report_spawn_failure(io, e),
        };

        match exit_status.code() {
            Some(x) => {
                debug!("{} exited with status {x}", self.name);
                Ok(x)
            }
            None => {
                // No exit code means the child was killed by a signal.
                let signal = exit_status.signal().unwrap_or_default();
                let err = ShellError::AbnormalTermination(self.name.clone());
                writeln!(io.stdout, "{err}")?;
                writeln!(io.stderr, "{}: exit status: {signal}", self.name)?;
                debug!(
                    "{} killed by {}",
                    self.name,
                    Signal::try_from(signal).map_or("unknown signal", Signal::as_str)
                );
                Ok(128 + signal)
            }
        }
    }
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it exists.
/// - `./foo`: returns it if it exists.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first existing match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    if path.starts_with("./") && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

/// First executable regular file named `cmd` in `search_paths`.
///
/// Entries that exist but cannot be run are skipped. If nothing runnable is
/// found, the first of them is returned so that spawning it reports the
/// permission error.
fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    let mut not_runnable = None;
    for path in std::env::split_paths(search_paths).map(|dir| dir.join(cmd)) {
        if is_executable_file(&path) {
            return Some(path);
        }
        if not_runnable.is_none() && path.exists() {
            not_runnable = Some(path);
        }
    }
    not_runnable
}

fn is_executable_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

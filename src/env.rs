use crate::vars::{Variable, Variables};
use log::{debug, warn};
use nix::unistd::{self, User};
use std::env as stdenv;
use std::path::{Path, PathBuf};

/// Shown in the prompt when the user name cannot be resolved.
pub const DEFAULT_USER: &str = "[?]";
/// Shown in the prompt when the host name cannot be resolved.
pub const DEFAULT_HOST: &str = "[unknown]";
/// Prompt character.
pub const PROMPT: char = '$';

/// Session state of the interpreter.
///
/// The environment contains:
/// - `vars`: the `$NAME` registry (user, host, home, path, working directory).
/// - `current_dir`: the working directory as last observed, if known.
/// - `display_dir`: the short form of `current_dir` shown in the prompt.
/// - `should_exit`: set by the `exit` built-in to stop the read-eval loop.
///
/// It is created once at startup and only changes through
/// [`Environment::refresh_working_directory`] and `should_exit`.
#[derive(Debug, Clone)]
pub struct Environment {
    pub vars: Variables,
    pub current_dir: Option<PathBuf>,
    pub display_dir: String,
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process state into a new `Environment`.
    ///
    /// User name and home come from the passwd entry of the real user id,
    /// `HOME` and `PATH` from the process environment. Later changes to the
    /// process environment are not observed.
    pub fn capture() -> Self {
        let account = match User::from_uid(unistd::getuid()) {
            Ok(account) => account,
            Err(e) => {
                warn!("cannot read passwd entry: {e}");
                None
            }
        };

        let user = account
            .as_ref()
            .map(|u| u.name.clone())
            .unwrap_or_else(|| DEFAULT_USER.to_string());

        let host = match unistd::gethostname() {
            Ok(name) => name.to_string_lossy().into_owned(),
            Err(e) => {
                warn!("cannot read host name: {e}");
                DEFAULT_HOST.to_string()
            }
        };

        let home = stdenv::var("HOME")
            .ok()
            .or_else(|| account.map(|u| u.dir.to_string_lossy().into_owned()));
        let path = stdenv::var("PATH").ok();

        Self::with_identity(&user, &host, home.as_deref(), path.as_deref())
    }

    /// Build an environment from explicit identity values.
    ///
    /// The working directory is still read from the process.
    pub fn with_identity(user: &str, host: &str, home: Option<&str>, path: Option<&str>) -> Self {
        let mut vars = Variables::new();
        vars.set(Variable::Logname, user);
        vars.set(Variable::Host, host);
        if let Some(home) = home {
            vars.set(Variable::Home, home);
        }
        if let Some(path) = path {
            vars.set(Variable::Path, path);
        }

        let mut env = Self {
            vars,
            current_dir: None,
            display_dir: ".".to_string(),
            should_exit: false,
        };
        env.refresh_working_directory();
        env
    }

    /// Re-read the working directory, update `$PWD` and the display directory.
    pub fn refresh_working_directory(&mut self) {
        match stdenv::current_dir() {
            Ok(dir) => {
                self.vars.set(Variable::Pwd, dir.to_string_lossy());
                self.current_dir = Some(dir);
            }
            Err(e) => {
                warn!("cannot determine working directory: {e}");
                self.current_dir = None;
            }
        }
        self.display_dir = display_dir(self.current_dir.as_deref(), self.home());
        debug!("working directory is now {:?}", self.current_dir);
    }

    pub fn home(&self) -> Option<&str> {
        self.vars.get(Variable::Home)
    }

    /// Render the prompt: `<user>::<host> <dir>|$ `.
    pub fn prompt(&self) -> String {
        let user = self.vars.get(Variable::Logname).unwrap_or(DEFAULT_USER);
        let host = self.vars.get(Variable::Host).unwrap_or(DEFAULT_HOST);
        format!("{user}::{host} {dir}|{PROMPT} ", dir = self.display_dir)
    }

    /// Expand a leading `~` to the home directory.
    ///
    /// `~` and `~/rest` are relative to home; anything after the tilde is
    /// joined to home, so `~rest` also resolves to `<home>/rest`. Without a
    /// known home the argument is returned unchanged.
    pub fn expand_home(&self, arg: &str) -> PathBuf {
        match (arg.strip_prefix('~'), self.home()) {
            (Some(rest), Some(home)) => {
                let rest = rest.strip_prefix('/').unwrap_or(rest);
                if rest.is_empty() {
                    PathBuf::from(home)
                } else {
                    Path::new(home).join(rest)
                }
            }
            _ => PathBuf::from(arg),
        }
    }
}

/// Short form of the working directory used in the prompt.
pub fn display_dir(cwd: Option<&Path>, home: Option<&str>) -> String {
    let Some(cwd) = cwd else {
        return ".".to_string();
    };
    if home.is_some_and(|home| cwd == Path::new(home)) {
        return "~".to_string();
    }
    match cwd.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => cwd.to_string_lossy().into_owned(),
    }
}

use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Streams};
use crate::env::Environment;
use crate::error::ShellError;
use crate::interpreter::Factory;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use std::env as stdenv;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

/// Identifier of every command implemented inside the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    Builtin,
    Cd,
    Echo,
    Exit,
    Help,
    Sleep,
}

impl BuiltinKind {
    /// All built-ins, in listing order.
    pub const ALL: [BuiltinKind; 6] = [
        BuiltinKind::Builtin,
        BuiltinKind::Cd,
        BuiltinKind::Echo,
        BuiltinKind::Exit,
        BuiltinKind::Help,
        BuiltinKind::Sleep,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinKind::Builtin => "builtin",
            BuiltinKind::Cd => "cd",
            BuiltinKind::Echo => "echo",
            BuiltinKind::Exit => "exit",
            BuiltinKind::Help => "help",
            BuiltinKind::Sleep => "sleep",
        }
    }

    /// Exact, case-sensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// One-line usage, e.g. `sleep [sec] :: sleep for [sec] seconds`.
    pub fn usage(self) -> String {
        let (operands, summary) = match self {
            BuiltinKind::Builtin => ("", "list builtin commands"),
            BuiltinKind::Cd => (" [dir]", "change directory"),
            BuiltinKind::Echo => ("", "print to stdout"),
            BuiltinKind::Exit => ("", "exit shell session"),
            BuiltinKind::Help => ("", "show usage info"),
            BuiltinKind::Sleep => (" [sec]", "sleep for [sec] seconds"),
        };
        format!("{}{operands} :: {summary}", self.name())
    }
}

/// Built-in commands known to the shell at compile time.
///
/// Built-ins are parsed through [`argh::FromArgs`] and executed in-process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    const KIND: BuiltinKind;

    /// Executes the command, writing its output to `stdout`.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, io: Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        match <T as BuiltinCommand>::execute(*self, &mut *io.stdout, env) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(io.stdout, "{e}")?;
                Ok(1)
            }
        }
    }
}

/// Result of an argument parse that ended early: help text or a usage error.
struct InvalidArgs {
    command: String,
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, io: Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        if !self.is_error {
            write!(io.stdout, "{}", self.output)?;
            return Ok(0);
        }
        let err = ShellError::InvalidArguments {
            command: self.command,
            message: self.output.lines().next().unwrap_or_default().to_string(),
        };
        writeln!(io.stdout, "{err}")?;
        Ok(1)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name != T::KIND.name() {
            return None;
        }
        Some(match T::from_args(&[name], args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                command: name.to_string(),
                output,
                is_error: status.is_err(),
            }),
        })
    }
}

/// Accept zero or one positional argument, verbatim.
///
/// Used where flag-looking values (`sleep -1`, `cd --x`) must reach the
/// command instead of being treated as options.
fn at_most_one(args: &[&str]) -> Result<Option<String>, EarlyExit> {
    match args {
        [] => Ok(None),
        [one] => Ok(Some(one.to_string())),
        [_, extra, ..] => Err(EarlyExit::from(format!("unexpected argument: {extra}"))),
    }
}

/// Write the usage banner shown by `help` and `--help`.
pub fn write_help(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "ash: acorn shell {}", crate::VERSION)?;
    writeln!(out, "usage: type commands e.g. help\n")?;
    for line in [
        "        $$$      ",
        "         $$      ",
        "       $$$$$$    ",
        "     $$$$$$$$$$  ",
        "    $$$oooooo$$$ ",
        "    $$oooooooo$$ ",
        "     $oooooooo$  ",
        "      oooooooo   ",
        "        oooo     ",
    ] {
        writeln!(out, "{line}")?;
    }
    writeln!(out)
}

/// Exit the shell session. Arguments are ignored.
pub struct Exit;

impl FromArgs for Exit {
    fn from_args(_command_name: &[&str], _args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Exit)
    }
}

impl BuiltinCommand for Exit {
    const KIND: BuiltinKind = BuiltinKind::Exit;

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}

/// Show the shell usage banner. Arguments are ignored.
pub struct Help;

impl FromArgs for Help {
    fn from_args(_command_name: &[&str], _args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Help)
    }
}

impl BuiltinCommand for Help {
    const KIND: BuiltinKind = BuiltinKind::Help;

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        write_help(stdout)?;
        Ok(0)
    }
}

/// Write the arguments to standard output, separated by spaces.
///
/// Every argument is printed as-is; nothing is interpreted as an option.
pub struct Echo {
    pub args: Vec<String>,
}

impl FromArgs for Echo {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Self {
            args: args.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Echo {
    const KIND: BuiltinKind = BuiltinKind::Echo;

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        if !self.args.is_empty() {
            writeln!(stdout, "{}", self.args.join(" "))?;
        }
        Ok(0)
    }
}

/// Suspend execution for a whole number of seconds.
pub struct Sleep {
    pub seconds: Option<String>,
}

impl FromArgs for Sleep {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Self {
            seconds: at_most_one(args)?,
        })
    }
}

impl Sleep {
    /// Validate the argument. Only decimal digits are accepted.
    fn duration(&self) -> Result<Duration, ShellError> {
        let name = Self::KIND.name();
        let arg = self
            .seconds
            .as_deref()
            .ok_or_else(|| ShellError::MissingArgument(name.to_string()))?;
        if !arg.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ShellError::InvalidValue(name.to_string()));
        }
        if arg.is_empty() {
            return Ok(Duration::ZERO);
        }
        let secs = arg
            .parse::<u64>()
            .map_err(|_| ShellError::InvalidValue(name.to_string()))?;
        Ok(Duration::from_secs(secs))
    }
}

impl BuiltinCommand for Sleep {
    const KIND: BuiltinKind = BuiltinKind::Sleep;

    fn execute(self, _stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        let duration = self.duration()?;
        if !duration.is_zero() {
            thread::sleep(duration);
        }
        Ok(0)
    }
}

/// Change the current working directory.
///
/// A leading `~` expands to the home directory. Without a target nothing
/// happens.
pub struct Cd {
    pub target: Option<String>,
}

impl FromArgs for Cd {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Self {
            target: at_most_one(args)?,
        })
    }
}

impl BuiltinCommand for Cd {
    const KIND: BuiltinKind = BuiltinKind::Cd;

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let Some(target) = self.target else {
            return Ok(0);
        };
        let dir = env.expand_home(&target);
        stdenv::set_current_dir(&dir).map_err(|source| ShellError::Builtin {
            command: Self::KIND.name().to_string(),
            source,
        })?;
        env.refresh_working_directory();
        Ok(0)
    }
}

/// List the built-in commands, or describe one of them.
pub struct BuiltinInfo {
    pub command: Option<String>,
}

impl FromArgs for BuiltinInfo {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Self {
            command: at_most_one(args)?,
        })
    }
}

impl BuiltinCommand for BuiltinInfo {
    const KIND: BuiltinKind = BuiltinKind::Builtin;

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        let Some(name) = self.command else {
            writeln!(stdout, "list of builtin commands:")?;
            writeln!(stdout, "type builtin [command] for more info\n")?;
            for kind in BuiltinKind::ALL {
                writeln!(stdout, "{}", kind.name())?;
            }
            return Ok(0);
        };
        match BuiltinKind::from_name(&name) {
            Some(kind) => {
                writeln!(stdout, "{}: command: {}", crate::PNAME, kind.usage())?;
                Ok(0)
            }
            None => Err(ShellError::UnrecognizedCommand(name).into()),
        }
    }
}

use crate::command::{CommandFactory, ExitCode, Streams};
use crate::env::Environment;
use crate::error::ShellError;
use crate::io_adapters::LineReader;
use crate::lexer::{self, LexingError};
use crate::parser::{self, Invocation};
use log::debug;
use std::io::Write;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only commands defined in this crate have factories: built-ins and [`ExternalCommand`](crate::external::ExternalCommand).
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter maintains an [`Environment`] and a list of [`CommandFactory`] objects
/// that are queried, in order, to create commands by name. See [`Default`] for the
/// factories included out of the box.
///
/// Example
/// ```
/// use ash::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.run("echo", &["hello", "world"]).unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::capture(),
            commands,
        }
    }

    /// Create an interpreter with the default commands over a given environment.
    pub fn with_environment(env: Environment) -> Self {
        Self {
            env,
            commands: default_commands(),
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Run a single command invocation by name with arguments, on the process's
    /// standard streams.
    pub fn run(&mut self, name: &str, args: &[&str]) -> anyhow::Result<ExitCode> {
        let mut stdout = std::io::stdout();
        let mut stderr = std::io::stderr();
        self.run_with(name, args, Streams::new(&mut stdout, &mut stderr))
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Returns the command's exit code or an error if writing its output fails.
    pub fn run_with(
        &mut self,
        name: &str,
        args: &[&str],
        io: Streams<'_>,
    ) -> anyhow::Result<ExitCode> {
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args) {
                return cmd.execute(io, &mut self.env);
            }
        }
        Err(anyhow::anyhow!("command not found: {}", name))
    }

    /// Tokenize, resolve and dispatch one input line.
    ///
    /// Returns `None` when the line did not run anything.
    pub fn execute_line(&mut self, line: &str, io: Streams<'_>) -> anyhow::Result<Option<ExitCode>> {
        let tokens = match lexer::split_into_tokens(line) {
            Ok(tokens) => tokens,
            Err(LexingError::TooManyArguments) => {
                writeln!(io.stdout, "{}", ShellError::TooManyArguments)?;
                return Ok(None);
            }
        };

        match parser::construct_invocation(&tokens, &self.env.vars) {
            None => Ok(None),
            Some(Invocation::PrintVariable(value)) => {
                if let Some(value) = value {
                    writeln!(io.stdout, "{value}")?;
                }
                Ok(None)
            }
            Some(Invocation::Command(argv)) => {
                let Some((name, rest)) = argv.split_first() else {
                    return Ok(None);
                };
                if name.is_empty() {
                    return Ok(None);
                }
                let args: Vec<&str> = rest.iter().map(String::as_str).collect();
                debug!("dispatching {name} with {} argument(s)", args.len());
                self.run_with(name, &args, io).map(Some)
            }
        }
    }

    /// The read-eval loop.
    ///
    /// Runs until `exit` is called or the reader reaches end of input. Errors of
    /// individual commands are reported and never end the loop; only failures of
    /// the streams themselves are returned.
    pub fn repl(&mut self, reader: &mut dyn LineReader, io: Streams<'_>) -> anyhow::Result<()> {
        let Streams { stdout, stderr } = io;
        while !self.env.should_exit {
            let Some(line) = reader.read_line(&self.env.prompt())? else {
                debug!("end of input");
                break;
            };
            self.execute_line(&line, Streams::new(&mut *stdout, &mut *stderr))?;
            stdout.flush()?;
        }
        Ok(())
    }
}

fn default_commands() -> Vec<Box<dyn CommandFactory>> {
    use crate::builtin::*;
    use crate::external::ExternalCommand;
    vec![
        Box::new(Factory::<Exit>::default()),
        Box::new(Factory::<Echo>::default()),
        Box::new(Factory::<Sleep>::default()),
        Box::new(Factory::<Cd>::default()),
        Box::new(Factory::<Help>::default()),
        Box::new(Factory::<BuiltinInfo>::default()),
        Box::new(Factory::<ExternalCommand>::default()),
    ]
}

impl Default for Interpreter {
    /// Create an interpreter over the captured process environment with the
    /// default set of commands:
    /// - built-ins: `exit`, `echo`, `sleep`, `cd`, `help`, `builtin`
    /// - external command launcher
    fn default() -> Self {
        Self::with_environment(Environment::capture())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_adapters::StreamReader;
    use std::io::Cursor;

    fn interpreter() -> Interpreter {
        Interpreter::with_environment(Environment::with_identity(
            "u",
            "box",
            Some("/home/u"),
            Some("/bin:/usr/bin"),
        ))
    }

    fn line(sh: &mut Interpreter, input: &str) -> (Option<ExitCode>, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = sh
            .execute_line(input, Streams::new(&mut out, &mut err))
            .unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_blank_line_dispatches_nothing() {
        let mut sh = interpreter();
        assert_eq!(line(&mut sh, "   \t\n"), (None, String::new()));
        assert_eq!(line(&mut sh, "\n"), (None, String::new()));
    }

    #[test]
    fn test_quoted_echo() {
        let mut sh = interpreter();
        assert_eq!(line(&mut sh, "echo \"a b\" c\n"), (Some(0), "a b c\n".to_string()));
    }

    #[test]
    fn test_variable_print() {
        let mut sh = interpreter();
        assert_eq!(line(&mut sh, "$HOME\n"), (None, "/home/u\n".to_string()));
        assert_eq!(line(&mut sh, "$UNSET\n"), (None, String::new()));
        assert_eq!(
            line(&mut sh, "$VERSION\n"),
            (None, format!("{}\n", crate::VERSION))
        );
    }

    #[test]
    fn test_variable_substitution_in_arguments() {
        let mut sh = interpreter();
        assert_eq!(
            line(&mut sh, "echo $LOGNAME on $HOST in $HOME\n"),
            (Some(0), "u on box in /home/u\n".to_string())
        );
        // The whole token after `$` is the name.
        assert_eq!(
            line(&mut sh, "echo $LOGNAME@$HOST x\n"),
            (Some(0), " x\n".to_string())
        );
        assert_eq!(line(&mut sh, "echo $NOPE\n"), (Some(0), "\n".to_string()));
    }

    #[test]
    fn test_empty_command_name_is_noop() {
        let mut sh = interpreter();
        assert_eq!(line(&mut sh, "\"\" x\n"), (None, String::new()));
    }

    #[test]
    fn test_too_many_arguments_is_reported() {
        let mut sh = interpreter();
        let input = format!("echo {}\n", vec!["x"; lexer::MAX_ARGS].join(" "));
        assert_eq!(
            line(&mut sh, &input),
            (None, "ash: error: too many arguments (max 255)\n".to_string())
        );
    }

    #[test]
    fn test_builtin_matching_is_exact() {
        let mut sh = interpreter();
        let (code, out) = line(&mut sh, "Echo hi\n");
        assert_eq!(code, Some(127));
        assert_eq!(out, "ash: error: Echo: No such file or directory\n");
    }

    #[test]
    fn test_builtin_errors_do_not_stop_the_loop() {
        let mut sh = interpreter();
        let input = "sleep abc\nbuiltin frobnicate\necho still here\n";
        let mut reader = StreamReader::new(Cursor::new(input), Vec::new());
        let mut out = Vec::new();
        let mut err = Vec::new();
        sh.repl(&mut reader, Streams::new(&mut out, &mut err)).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ash sleep: error: incorrect value type \n\
             ash frobnicate: error: unrecognized command \n\
             still here\n"
        );
    }

    #[test]
    fn test_exit_stops_reading() {
        let mut sh = interpreter();
        let input = "echo one\nexit\necho two\n";
        let mut reader = StreamReader::new(Cursor::new(input), Vec::new());
        let mut out = Vec::new();
        let mut err = Vec::new();
        sh.repl(&mut reader, Streams::new(&mut out, &mut err)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "one\n");
        assert!(sh.env().should_exit);
    }

    #[test]
    fn test_exit_with_arguments_still_stops_reading() {
        for first in ["exit -x", "exit help", "exit 3 4"] {
            let mut sh = interpreter();
            let input = format!("{first}\necho after\n");
            let mut reader = StreamReader::new(Cursor::new(input), Vec::new());
            let mut out = Vec::new();
            let mut err = Vec::new();
            sh.repl(&mut reader, Streams::new(&mut out, &mut err)).unwrap();
            assert!(out.is_empty(), "{first}: {:?}", String::from_utf8_lossy(&out));
            assert!(sh.env().should_exit, "{first}");
        }
    }

    #[test]
    fn test_prompt_is_written_before_each_read() {
        let mut sh = interpreter();
        let mut reader = StreamReader::new(Cursor::new("\n\n"), Vec::new());
        let mut out = Vec::new();
        let mut err = Vec::new();
        sh.repl(&mut reader, Streams::new(&mut out, &mut err)).unwrap();
        let prompt = sh.env().prompt();
        assert_eq!(
            String::from_utf8(reader.into_inner().1).unwrap(),
            prompt.repeat(3)
        );
        assert!(out.is_empty());
    }
}

use ash::Interpreter;
use ash::cli::{self, StartupAction};
use ash::command::Streams;
use ash::io_adapters::{InteractiveReader, StreamReader};
use std::io::{self, IsTerminal};

fn main() -> anyhow::Result<()> {
    ash::logging::init();

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    match cli::scan_options(&args, &mut io::stdout())? {
        StartupAction::Help | StartupAction::Version => return Ok(()),
        StartupAction::Interactive => {}
    }

    let mut sh = Interpreter::default();
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let streams = Streams::new(&mut stdout, &mut stderr);

    if io::stdin().is_terminal() {
        let mut reader = InteractiveReader::new()?;
        sh.repl(&mut reader, streams)
    } else {
        let mut reader = StreamReader::new(io::stdin().lock(), io::stdout());
        sh.repl(&mut reader, streams)
    }
}

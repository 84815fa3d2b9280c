//! Diagnostic logging to stderr.
//!
//! Log records never go to stdout, which carries the prompt and command output.

use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Environment variable holding the log level (`off`, `error`, `warn`,
/// `info`, `debug`, `trace`).
pub const LOG_ENV: &str = "ASH_LOG";

/// Install the global logger. Safe to call more than once; later calls are ignored.
pub fn init() {
    let level = level_from(std::env::var(LOG_ENV).ok().as_deref());
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn level_from(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(LevelFilter::Warn)
}

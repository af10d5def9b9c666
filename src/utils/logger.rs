//! Logging setup: a colored, level-prefixed `env_logger` formatter.

use std::io::Write;

use colored::Colorize;
use log::Level;

/// Initialize logging. `verbose` raises the default level from `info` to `debug`; `RUST_LOG`
/// always wins when set.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => "ERROR".red().bold(),
                Level::Warn => "WARN".yellow().bold(),
                Level::Info => "INFO".green(),
                Level::Debug => "DEBUG".blue(),
                Level::Trace => "TRACE".dimmed(),
            };
            writeln!(buf, "[{level}] {}", record.args())
        })
        .init();
}

//! Console logging.

use colored::Colorize;
use log::Level;
use std::io::Write;

/// Initializes the global logger.
///
/// Info and above are shown by default, debug output with `verbose`.
/// `RUST_LOG` still overrides both.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .parse_default_env()
        .format(|buf, record| {
            let tag = match record.level() {
                Level::Error => "[replica]".red().bold(),
                Level::Warn => "[replica]".yellow().bold(),
                Level::Info => "[replica]".blue().bold(),
                Level::Debug | Level::Trace => "[replica]".dimmed(),
            };
            writeln!(buf, "{} {}", tag, record.args())
        })
        .init();
}

/// Prints a success line to stdout.
pub fn success<S: AsRef<str>>(message: S) {
    println!("{} {}", "[replica]".green().bold(), message.as_ref());
}

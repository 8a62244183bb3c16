//! replica's main application entry point.
//! Parses the command line, sets up logging and dispatches to the command.

use replica::{cli::get_args, cmd, error::default_error_handler, logger::init_logger};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = cmd::run(args) {
        default_error_handler(err);
    }
}

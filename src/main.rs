use arsync::commands::{self, Cli};
use arsync::{ArsyncError, logging, sysexits};
use clap::Parser;
use std::process;

/// Entry point for the arsync CLI application.
/// Parses command-line arguments and dispatches to the command handlers.
fn main() {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose);

    match commands::execute(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            let code = e
                .downcast_ref::<ArsyncError>()
                .map_or(sysexits::EX_SOFTWARE, ArsyncError::exit_code);
            process::exit(code);
        }
    }
}

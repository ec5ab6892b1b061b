//! Rescue API entry point
//!
//! Parses arguments, dispatches to the CLI module, prints errors to stderr
//! and exits non-zero on failure. All other logic lives in the library.

use rescue_api::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

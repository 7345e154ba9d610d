//! icon_convert - convert images between icon formats.
//!
//! Thin binary over the library: parses arguments, sets up logging, runs the
//! conversion and exits with its status code.

use icon_convert::cli;
use icon_convert::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    let args = cli::parse_args();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_filter()),
    )
    .format_timestamp(None)
    .init();

    match cli::execute_command(args).await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Never quiet for fatal errors
            let output = OutputManager::new(false, false);
            output.error(&format!("Fatal error: {e}"));

            for suggestion in e.recovery_suggestions() {
                output.error_detail(&suggestion);
            }

            process::exit(1);
        }
    }
}

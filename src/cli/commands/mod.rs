//! Command execution.
//!
//! Validates the parsed arguments, runs the conversion, and turns the outcome
//! into an exit code plus user-facing output.

mod convert;

use crate::cli::{Args, RuntimeConfig};
use crate::error::{AppError, Result};

use convert::execute_convert;

/// Exit code for invalid arguments, matching clap's own usage errors.
pub const EXIT_USAGE: i32 = 2;

/// Execute the conversion described by `args` and return the exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        // Validation errors are never quiet
        let output = super::OutputManager::new(false, false);
        report(&output, &AppError::from(validation_error));
        return Ok(EXIT_USAGE);
    }

    let config = RuntimeConfig::from(&args);

    match execute_convert(&args, &config).await {
        Ok(()) => Ok(0),
        Err(e) => {
            report(config.output(), &e);
            Ok(1)
        }
    }
}

/// Prints an error followed by its recovery suggestions.
fn report(output: &super::OutputManager, error: &AppError) {
    output.error(&error.to_string());

    let suggestions = error.recovery_suggestions();
    if !suggestions.is_empty() {
        output.error_detail("Recovery suggestions:");
        for suggestion in suggestions {
            output.error_detail(&format!("• {suggestion}"));
        }
    }
}

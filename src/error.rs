//! Application error types for icon_convert.
//!
//! Wraps conversion failures and command line problems into one type that
//! carries actionable recovery suggestions for the terminal.

use crate::converter::{self, ErrorKind};
use thiserror::Error;

/// Result type alias for application-level operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Main error type for the command line application
#[derive(Error, Debug)]
pub enum AppError {
    /// Conversion pipeline errors
    #[error("Conversion failed: {0}")]
    Conversion(#[from] converter::Error),

    /// CLI argument errors
    #[error("{0}")]
    Cli(#[from] CliError),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Conflicting arguments
    #[error("Conflicting arguments: {}", .arguments.join(" and "))]
    ConflictingArguments {
        /// Arguments that conflict
        arguments: Vec<String>,
    },
}

impl AppError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            AppError::Conversion(error) => match error.kind() {
                ErrorKind::SourceNotFound => vec![
                    "Check the source path for typos".to_string(),
                    "Make sure the file exists and is readable".to_string(),
                ],
                ErrorKind::UnsupportedSource => vec![
                    "Use a PNG, JPEG, BMP, ICO, ICNS or SVG source".to_string(),
                    "Re-export the source from its editor; the file may be damaged".to_string(),
                ],
                ErrorKind::Encode => vec![
                    "Try a smaller or simpler source image".to_string(),
                    "Convert to PNG first, then to the target format".to_string(),
                ],
                ErrorKind::ExternalTool => vec![
                    "Check that Xcode command line tools are installed: xcode-select --install"
                        .to_string(),
                    "Use --no-compiler to write a PNG set instead of an .icns file".to_string(),
                ],
                ErrorKind::Filesystem => vec![
                    "Check permissions on the output directory".to_string(),
                    "Choose another output directory with --output-dir".to_string(),
                ],
            },
            AppError::Cli(CliError::InvalidArguments { .. }) => {
                vec!["Run with --help to see accepted values".to_string()]
            }
            AppError::Cli(CliError::ConflictingArguments { arguments }) => {
                vec![format!("Pass only one of {}", arguments.join(", "))]
            }
            AppError::Anyhow(_) => {
                vec!["Check the error message above for specific details".to_string()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn suggestions_follow_error_kind() {
        let err = AppError::from(converter::Error::SourceNotFound {
            path: PathBuf::from("missing.png"),
        });

        assert!(err.to_string().contains("missing.png"));
        assert!(err.recovery_suggestions()[0].contains("source path"));
    }

    #[test]
    fn cli_errors_carry_their_own_suggestions() {
        let err = AppError::from(CliError::ConflictingArguments {
            arguments: vec!["--verbose".to_string(), "--quiet".to_string()],
        });

        assert_eq!(
            err.to_string(),
            "Conflicting arguments: --verbose and --quiet"
        );
        assert_eq!(
            err.recovery_suggestions(),
            vec!["Pass only one of --verbose, --quiet".to_string()]
        );

        let err = AppError::from(CliError::InvalidArguments {
            reason: "bad".to_string(),
        });
        assert!(err.recovery_suggestions()[0].contains("--help"));
    }
}

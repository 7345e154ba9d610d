//! Command line argument parsing and validation.
//!
//! One invocation converts one file: point it at a source, name a target
//! format, and the result lands on the desktop unless `--output-dir` says
//! otherwise.

use crate::converter::{SourceKind, TargetFormat};
use crate::error::CliError;
use clap::{ArgAction, Parser};
use std::{path::PathBuf, time::Duration};

/// Convert images between icon formats
#[derive(Parser, Debug)]
#[command(
    name = "icon_convert",
    version,
    about = "Convert images between icon formats (ico, icns, png, favicon, svg)",
    long_about = "Convert an image into an icon format.

Sources: PNG, JPEG, BMP, ICO, ICNS, SVG (anything the decoders recognize).

Usage:
  icon_convert logo.png --to ico
  icon_convert AppIcon.svg --to icns --output-dir dist
  icon_convert Old.icns --to png
  icon_convert badge.svg --to png --svg-size 512x512

Outputs are written to the desktop unless --output-dir is given."
)]
pub struct Args {
    /// Source image
    #[arg(index = 1, value_name = "SOURCE")]
    pub source: PathBuf,

    /// Target format: ico, icns, png, favicon or svg
    #[arg(short = 't', long = "to", value_name = "FORMAT")]
    pub to: TargetFormat,

    /// Directory the output is written to (created if missing)
    #[arg(short, long, value_name = "DIR", env = "ICON_CONVERT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Rasterize SVG sources at this size instead of their own
    #[arg(long, value_name = "WxH", value_parser = parse_dimensions)]
    pub svg_size: Option<(u32, u32)>,

    /// Kill iconutil if it runs longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub compiler_timeout: Option<u64>,

    /// Directory for temporary files (default: system temp dir)
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Never run iconutil; ICNS targets produce a PNG set
    #[arg(long)]
    pub no_compiler: bool,

    /// More output (-v for info logs, -vv for debug logs)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Parses `WxH` (also `W*H` or `WXH`) into a non-zero size.
pub fn parse_dimensions(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X', '*'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;

    let parse = |part: &str| -> Result<u32, String> {
        match part.trim().parse::<u32>() {
            Ok(0) => Err(format!("dimensions must be greater than zero in '{value}'")),
            Ok(n) => Ok(n),
            Err(e) => Err(format!("invalid dimension '{}': {e}", part.trim())),
        }
    };

    Ok((parse(width)?, parse(height)?))
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), CliError> {
        if self.source.as_os_str().is_empty() {
            return Err(CliError::InvalidArguments {
                reason: "Source file is required".to_string(),
            });
        }
        if self.compiler_timeout == Some(0) {
            return Err(CliError::InvalidArguments {
                reason: "--compiler-timeout must be at least 1 second".to_string(),
            });
        }
        if self.verbose > 0 && self.quiet {
            return Err(CliError::ConflictingArguments {
                arguments: vec!["--verbose".to_string(), "--quiet".to_string()],
            });
        }
        if self.svg_size.is_some() && SourceKind::from_path(&self.source) != SourceKind::Svg {
            log::warn!("--svg-size only applies to SVG sources; ignoring it");
        }

        Ok(())
    }

    /// Default `env_logger` filter for the chosen verbosity.
    ///
    /// `RUST_LOG` still overrides it.
    pub fn log_filter(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, _) => "debug",
        }
    }

    /// Compiler timeout as a [`Duration`].
    pub fn compiler_timeout(&self) -> Option<Duration> {
        self.compiler_timeout.map(Duration::from_secs)
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose > 0, args.quiet)
    }
}

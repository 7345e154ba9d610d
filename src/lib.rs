//! # icon_convert
//!
//! Converts images between icon formats.
//!
//! This crate turns a single source image (PNG, JPEG, BMP, ICO, ICNS or SVG)
//! into a Windows icon, a macOS icon bundle, a PNG, a favicon pair or an SVG
//! document, cleaning up every temporary file it creates along the way.
//!
//! ## Features
//!
//! - **Multi-size icons**: ICO and favicon files with Lanczos3-resampled entries
//! - **ICNS with fallback**: `iconutil` when present, a PNG set otherwise
//! - **Transparent SVG rasterization**: straight alpha, never matted onto white
//! - **No leftovers**: per-call scratch directories and staged outputs
//!
//! ## Usage
//!
//! ```bash
//! icon_convert logo.png --to ico
//! icon_convert AppIcon.svg --to icns -o dist
//! icon_convert Old.icns --to png
//! ```
//!
//! ## Library
//!
//! ```no_run
//! use icon_convert::{ConversionRequest, Converter, TargetFormat};
//!
//! let result = Converter::default()
//!     .convert(&ConversionRequest::new("logo.png", TargetFormat::Favicon, "web"))?;
//! println!("{}", result.output_path.display());
//! # Ok::<(), icon_convert::converter::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod cli;
pub mod converter;
pub mod error;

// Re-export main types for public API
pub use cli::Args;
pub use converter::{
    ConversionRequest, ConversionResult, Converter, ConverterSettings, ResultKind,
    SettingsBuilder, TargetFormat,
};
pub use error::{AppError, CliError, Result};

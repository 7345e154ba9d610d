//! Icon format conversion pipeline.
//!
//! This module converts a single source image into ICO, ICNS, PNG, favicon or
//! SVG output. ICNS and SVG sources are first normalized into a raster image;
//! every other source is decoded with content sniffing.
//!
//! # Supported Sources
//!
//! | Source | Decoder | Notes |
//! |--------|---------|-------|
//! | `.icns` | `icns` | Largest element is used |
//! | `.svg` | `resvg` | Intrinsic size unless overridden |
//! | anything else | `image` | PNG, JPEG, BMP, ICO, ... |
//!
//! # Temporary Files
//!
//! Each call works inside its own scratch directory, which is deleted before
//! [`Converter::convert`] returns. Outputs are staged next to their final
//! location and renamed into place only once complete.
//!
//! # Integration
//!
//! ```no_run
//! use icon_convert::converter::{ConversionRequest, Converter, SettingsBuilder, TargetFormat};
//!
//! let settings = SettingsBuilder::new().build()?;
//! let converter = Converter::new(settings);
//!
//! let request = ConversionRequest::new("AppIcon.png", TargetFormat::Icns, "dist");
//! let result = converter.convert(&request)?;
//! if result.is_fallback() {
//!     println!("No iconutil here; wrote PNG set {}", result.output_path.display());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

mod builder;
mod compiler;
pub mod encoders;
mod error;
mod format;
pub mod resample;
mod settings;
pub mod source;
pub mod utils;

// Public re-exports
pub use builder::Converter;
pub use compiler::{IconSetCompiler, Iconutil};
pub use error::{Context, Error, ErrorExt, ErrorKind, Result};
pub use format::{SourceKind, TargetFormat};
pub use resample::{FAVICON_PNG_SIZE, FAVICON_SIZES, ICNS_SIZES, ICO_SIZES};
pub use settings::{ConverterSettings, SettingsBuilder, default_output_dir};

use std::path::{Path, PathBuf};

/// One conversion to perform.
///
/// # Examples
///
/// ```
/// use icon_convert::converter::{ConversionRequest, TargetFormat};
///
/// let request = ConversionRequest::new("logo.svg", TargetFormat::Png, "out")
///     .with_svg_size(512, 512);
/// assert_eq!(request.svg_size(), Some((512, 512)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    source_path: PathBuf,
    target_format: TargetFormat,
    output_dir: PathBuf,
    svg_size: Option<(u32, u32)>,
}

impl ConversionRequest {
    /// Creates a request. `output_dir` is created during conversion if absent.
    pub fn new(
        source_path: impl Into<PathBuf>,
        target_format: TargetFormat,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_format,
            output_dir: output_dir.into(),
            svg_size: None,
        }
    }

    /// Rasterizes SVG sources at exactly `width` x `height`.
    pub fn with_svg_size(mut self, width: u32, height: u32) -> Self {
        self.svg_size = Some((width, height));
        self
    }

    /// Returns the source path.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Returns the target format.
    pub fn target_format(&self) -> TargetFormat {
        self.target_format
    }

    /// Returns the output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the explicit SVG rasterization size, if any.
    pub fn svg_size(&self) -> Option<(u32, u32)> {
        self.svg_size
    }
}

/// Shape of a conversion's primary output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// A single file in the requested format.
    File,
    /// A directory of size-named PNGs written instead of an `.icns` file.
    PngSetFallback,
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// Primary output file (or directory, for [`ResultKind::PngSetFallback`]).
    pub output_path: PathBuf,

    /// Format that was requested.
    pub format: TargetFormat,

    /// Shape of `output_path`.
    pub kind: ResultKind,

    /// Further files written by the same conversion.
    ///
    /// Holds the standalone PNG of a favicon conversion; empty otherwise.
    pub extra_outputs: Vec<PathBuf>,
}

impl ConversionResult {
    pub(crate) fn file(output_path: PathBuf, format: TargetFormat) -> Self {
        Self {
            output_path,
            format,
            kind: ResultKind::File,
            extra_outputs: Vec::new(),
        }
    }

    pub(crate) fn png_set(output_dir: PathBuf) -> Self {
        Self {
            output_path: output_dir,
            format: TargetFormat::Icns,
            kind: ResultKind::PngSetFallback,
            extra_outputs: Vec::new(),
        }
    }

    pub(crate) fn with_extra_output(mut self, path: PathBuf) -> Self {
        self.extra_outputs.push(path);
        self
    }

    /// Whether an ICNS request produced a PNG set instead of an `.icns` file.
    pub fn is_fallback(&self) -> bool {
        self.kind == ResultKind::PngSetFallback
    }

    /// The primary output followed by any extra outputs.
    pub fn all_outputs(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.output_path.as_path())
            .chain(self.extra_outputs.iter().map(PathBuf::as_path))
    }
}

/// Output file stem for `source`: its file name without the extension.
pub(crate) fn base_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "image".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_strips_only_the_last_extension() {
        assert_eq!(base_name(Path::new("/a/b/App.Icon.png")), "App.Icon");
        assert_eq!(base_name(Path::new("pasted")), "pasted");
        assert_eq!(base_name(Path::new("/")), "image");
    }

    #[test]
    fn all_outputs_lists_primary_first() {
        let result = ConversionResult::file("a_favicon.ico".into(), TargetFormat::Favicon)
            .with_extra_output("a_favicon.png".into());

        let outputs: Vec<&Path> = result.all_outputs().collect();
        assert_eq!(
            outputs,
            vec![Path::new("a_favicon.ico"), Path::new("a_favicon.png")]
        );
        assert!(!result.is_fallback());
    }
}

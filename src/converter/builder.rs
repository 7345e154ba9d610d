//! Conversion orchestration.
//!
//! This module provides the [`Converter`], which runs one conversion request
//! from start to finish.
//!
//! # Overview
//!
//! A conversion:
//! 1. Checks that the source can be opened
//! 2. Creates the output directory if needed
//! 3. Creates a scratch directory owned by the call
//! 4. Runs the handler for the target format
//! 5. Removes the scratch directory, whatever the outcome
//!
//! # Example
//!
//! ```no_run
//! use icon_convert::converter::{ConversionRequest, Converter, TargetFormat};
//!
//! # fn example() -> icon_convert::converter::Result<()> {
//! let converter = Converter::default();
//! let request = ConversionRequest::new("logo.svg", TargetFormat::Favicon, "out");
//! let result = converter.convert(&request)?;
//!
//! for path in result.all_outputs() {
//!     println!("Created: {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

use crate::converter::{
    ConversionRequest, ConversionResult, ConverterSettings, base_name,
    encoders::{self, Job},
    error::{Error, ErrorExt, Result},
    format::SourceKind,
    utils::fs::Scratch,
};
use std::{fs, io};

/// Runs conversion requests.
///
/// A `Converter` holds no per-call state; one instance can serve any number
/// of requests, including from several threads at once.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    settings: ConverterSettings,
}

impl Converter {
    /// Creates a converter with the given settings.
    pub fn new(settings: ConverterSettings) -> Self {
        Self { settings }
    }

    /// Returns the converter's settings.
    pub fn settings(&self) -> &ConverterSettings {
        &self.settings
    }

    /// Converts one source file into the requested target format.
    ///
    /// Blocks until every output is written. Temporary artifacts are removed
    /// before this returns, on success and on failure.
    ///
    /// # Errors
    ///
    /// - [`Error::SourceNotFound`] if the source cannot be opened; nothing is
    ///   created in the output directory.
    /// - [`Error::UnsupportedSource`] if the source cannot be decoded.
    /// - [`Error::Encode`] if an encoder rejects the image.
    /// - [`Error::ExternalTool`] if the icon compiler fails.
    /// - [`Error::Fs`] for any other filesystem failure.
    pub fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult> {
        let source_path = request.source_path();
        check_source(source_path)?;

        let output_dir = request.output_dir();
        fs::create_dir_all(output_dir).fs_context("creating output directory", output_dir)?;

        let scratch = Scratch::create(self.settings.scratch_root())?;
        let job = Job {
            request,
            kind: SourceKind::from_path(source_path),
            base_name: base_name(source_path),
            scratch: &scratch,
            settings: &self.settings,
        };

        log::info!(
            "Converting {} ({:?}) to {}",
            source_path.display(),
            job.kind,
            request.target_format()
        );

        let outcome = encoders::handler(request.target_format())(&job);
        scratch.close();

        match &outcome {
            Ok(result) if result.is_fallback() => log::info!(
                "Created PNG set {} in place of an .icns file",
                result.output_path.display()
            ),
            Ok(result) => log::info!("Created {}", result.output_path.display()),
            Err(e) => log::debug!("Conversion of {} failed: {}", source_path.display(), e),
        }

        outcome
    }
}

/// The source must be an openable regular file.
fn check_source(path: &std::path::Path) -> Result<()> {
    let not_found = || Error::SourceNotFound {
        path: path.to_path_buf(),
    };

    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => return Err(not_found()),
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                log::debug!("Cannot stat {}: {}", path.display(), e);
            }
            return Err(not_found());
        }
    }

    fs::File::open(path).map(drop).map_err(|e| {
        log::debug!("Cannot open {}: {}", path.display(), e);
        not_found()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{ErrorKind, SettingsBuilder, TargetFormat};

    fn converter(scratch_root: &std::path::Path) -> Converter {
        Converter::new(
            SettingsBuilder::new()
                .scratch_root(scratch_root)
                .no_compiler()
                .build()
                .expect("settings"),
        )
    }

    #[test]
    fn directory_source_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("out");
        let request = ConversionRequest::new(dir.path(), TargetFormat::Png, &out);

        let err = converter(&dir.path().join("scratch"))
            .convert(&request)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SourceNotFound);
        assert!(!out.exists());
    }

    #[test]
    fn output_directory_is_created() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("dot.png");
        image::DynamicImage::new_rgba8(2, 2).save(&source).expect("save");
        let out = dir.path().join("nested").join("out");

        let result = converter(&dir.path().join("scratch"))
            .convert(&ConversionRequest::new(&source, TargetFormat::Png, &out))
            .expect("convert");

        assert_eq!(result.output_path, out.join("dot.png"));
        assert!(result.output_path.is_file());
    }
}

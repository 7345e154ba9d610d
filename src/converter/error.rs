//! Error types for conversion operations.
//!
//! Every failure inside [`Converter::convert`](super::Converter::convert) is one of
//! five kinds (see [`ErrorKind`]): the source is missing, the source cannot be
//! decoded, an encoder rejected the image, the icon compiler failed, or the
//! filesystem refused an operation. Errors keep enough context (paths, tool
//! output) to be shown to the user as a single readable message.
//!
//! # Example
//!
//! ```no_run
//! use icon_convert::converter::{Context, ErrorExt, Result};
//! use std::path::Path;
//!
//! fn read_source(path: &Path) -> Result<Vec<u8>> {
//!     std::fs::read(path).fs_context("reading source file", path)
//! }
//!
//! fn read_svg(path: &Path) -> Result<Vec<u8>> {
//!     read_source(path).context("preparing SVG passthrough")
//! }
//! ```

use std::{
    fmt::{self, Display},
    io,
    path::PathBuf,
};
use thiserror::Error as DeriveError;

use super::format::TargetFormat;

/// Errors returned by the conversion pipeline.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// The source path is missing or unreadable at request time.
    #[error("source file not found or unreadable: {path}")]
    SourceNotFound {
        /// Path supplied by the caller
        path: PathBuf,
    },

    /// The source exists but could not be decoded in its declared format.
    #[error("cannot decode {path}: {message}")]
    UnsupportedSource {
        /// Source path
        path: PathBuf,
        /// Message from the underlying decoder
        message: String,
    },

    /// The target encoder rejected the image data.
    #[error("{format} encoder rejected the image: {message}")]
    Encode {
        /// Format being produced
        format: TargetFormat,
        /// Message from the underlying encoder
        message: String,
    },

    /// The icon compiler could not run or exited unsuccessfully.
    ///
    /// `diagnostic` holds the tool's standard error verbatim.
    #[error("{tool} failed: {diagnostic}")]
    ExternalTool {
        /// Tool name (e.g. `iconutil`)
        tool: String,
        /// Captured diagnostic output
        diagnostic: String,
    },

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "creating output directory")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },
}

/// Coarse classification of [`Error`], independent of context wrapping.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// See [`Error::SourceNotFound`].
    SourceNotFound,
    /// See [`Error::UnsupportedSource`].
    UnsupportedSource,
    /// See [`Error::Encode`].
    Encode,
    /// See [`Error::ExternalTool`].
    ExternalTool,
    /// See [`Error::Fs`].
    Filesystem,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SourceNotFound => "source not found",
            ErrorKind::UnsupportedSource => "unsupported source",
            ErrorKind::Encode => "encode error",
            ErrorKind::ExternalTool => "external tool error",
            ErrorKind::Filesystem => "filesystem error",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Returns the kind of this error, looking through context layers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Context(_, inner) => inner.kind(),
            Error::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Error::UnsupportedSource { .. } => ErrorKind::UnsupportedSource,
            Error::Encode { .. } => ErrorKind::Encode,
            Error::ExternalTool { .. } => ErrorKind::ExternalTool,
            Error::Fs { .. } => ErrorKind::Filesystem,
        }
    }

    pub(crate) fn unsupported(path: impl Into<PathBuf>, message: impl Display) -> Self {
        Error::UnsupportedSource {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn encode(format: TargetFormat, message: impl Display) -> Self {
        Error::Encode {
            format,
            message: message.to_string(),
        }
    }

    /// Maps an `image` crate failure while writing `path`.
    ///
    /// I/O failures stay filesystem errors; everything else is the encoder
    /// rejecting the pixel data.
    pub(crate) fn from_image(
        format: TargetFormat,
        path: impl Into<PathBuf>,
        error: image::ImageError,
    ) -> Self {
        match error {
            image::ImageError::IoError(error) => Error::Fs {
                context: "writing image",
                path: path.into(),
                error,
            },
            other => Error::encode(format, other),
        }
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but keeps the pipeline's [`Error`] type, so
/// [`Error::kind`] still sees the original failure.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "copying iconset image".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_sees_through_context() {
        let err: Result<()> = Err(Error::ExternalTool {
            tool: "iconutil".into(),
            diagnostic: "bad iconset".into(),
        });
        let wrapped = err.context("compiling icns").unwrap_err();

        assert_eq!(wrapped.kind(), ErrorKind::ExternalTool);
        assert_eq!(
            wrapped.to_string(),
            "compiling icns: iconutil failed: bad iconset"
        );
    }

    #[test]
    fn fs_context_keeps_path() {
        let err = std::fs::read("/definitely/not/here.png")
            .fs_context("reading source", "/definitely/not/here.png")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Filesystem);
        assert!(err.to_string().starts_with("reading source /definitely/not/here.png"));
    }

    #[test]
    fn image_io_errors_stay_filesystem_errors() {
        let io_err = image::ImageError::IoError(io::Error::other("disk full"));
        let err = Error::from_image(TargetFormat::Png, "out.png", io_err);
        assert_eq!(err.kind(), ErrorKind::Filesystem);
    }
}

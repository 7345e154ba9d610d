//! Configuration for conversion operations.
//!
//! [`ConverterSettings`] holds everything about a conversion that is not part
//! of an individual [`ConversionRequest`](super::ConversionRequest): where
//! scratch directories go, which resampling filter is used, and which icon
//! compiler (if any) packs ICNS files.

use crate::converter::{
    compiler::{IconSetCompiler, Iconutil},
    error::{Error, Result},
};
use image::imageops::FilterType;
use std::{
    fmt, io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

/// Central configuration for the converter, constructed via [`SettingsBuilder`].
///
/// # Examples
///
/// ```no_run
/// use icon_convert::converter::{Converter, SettingsBuilder};
/// use std::time::Duration;
///
/// # fn example() -> icon_convert::converter::Result<()> {
/// let settings = SettingsBuilder::new()
///     .scratch_root("/tmp/icon-work")
///     .compiler_timeout(Duration::from_secs(30))
///     .build()?;
///
/// let converter = Converter::new(settings);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConverterSettings {
    /// Parent of per-call scratch directories. `None` means the OS temp dir.
    scratch_root: Option<PathBuf>,

    /// Filter used for every resize.
    resize_filter: FilterType,

    /// ICNS packer. `None` forces the PNG-set fallback.
    compiler: Option<Arc<dyn IconSetCompiler>>,
}

impl ConverterSettings {
    /// Returns the directory scratch directories are created in, if set.
    pub fn scratch_root(&self) -> Option<&Path> {
        self.scratch_root.as_deref()
    }

    /// Returns the resampling filter.
    pub fn resize_filter(&self) -> FilterType {
        self.resize_filter
    }

    /// Returns the icon compiler, if it is configured and currently available.
    pub fn compiler(&self) -> Option<&dyn IconSetCompiler> {
        self.compiler
            .as_deref()
            .filter(|compiler| compiler.is_available())
    }
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            scratch_root: None,
            resize_filter: FilterType::Lanczos3,
            compiler: Iconutil::detect().map(|c| Arc::new(c) as Arc<dyn IconSetCompiler>),
        }
    }
}

impl fmt::Debug for ConverterSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterSettings")
            .field("scratch_root", &self.scratch_root)
            .field("resize_filter", &self.resize_filter)
            .field("compiler", &self.compiler.as_ref().map(|c| c.name().to_string()))
            .finish()
    }
}

#[derive(Default)]
enum CompilerChoice {
    #[default]
    Detect,
    Disabled,
    Custom(Arc<dyn IconSetCompiler>),
}

/// Builder for [`ConverterSettings`].
///
/// Every field is optional; an empty builder gives the defaults (OS temp dir,
/// Lanczos3, `iconutil` if it is on `PATH`, no compiler timeout).
#[derive(Default)]
pub struct SettingsBuilder {
    scratch_root: Option<PathBuf>,
    resize_filter: Option<FilterType>,
    compiler_timeout: Option<Duration>,
    compiler: CompilerChoice,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the directory per-call scratch directories are created in.
    ///
    /// Created on first use if it does not exist.
    ///
    /// Default: the OS temp directory
    pub fn scratch_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.scratch_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the resampling filter.
    ///
    /// Default: [`FilterType::Lanczos3`]
    pub fn resize_filter(mut self, filter: FilterType) -> Self {
        self.resize_filter = Some(filter);
        self
    }

    /// Kills the detected `iconutil` after `timeout`.
    ///
    /// Has no effect on a compiler passed to [`compiler`](Self::compiler).
    ///
    /// Default: no timeout
    pub fn compiler_timeout(mut self, timeout: Duration) -> Self {
        self.compiler_timeout = Some(timeout);
        self
    }

    /// Uses a specific icon compiler instead of detecting `iconutil`.
    pub fn compiler(mut self, compiler: Arc<dyn IconSetCompiler>) -> Self {
        self.compiler = CompilerChoice::Custom(compiler);
        self
    }

    /// Disables ICNS compilation; ICNS targets always produce a PNG set.
    pub fn no_compiler(mut self) -> Self {
        self.compiler = CompilerChoice::Disabled;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fs`] if `scratch_root` exists but is not a directory.
    pub fn build(self) -> Result<ConverterSettings> {
        if let Some(root) = &self.scratch_root
            && root.exists()
            && !root.is_dir()
        {
            return Err(Error::Fs {
                context: "using scratch root",
                path: root.clone(),
                error: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        let compiler: Option<Arc<dyn IconSetCompiler>> = match self.compiler {
            CompilerChoice::Detect => Iconutil::detect().map(|iconutil| {
                Arc::new(iconutil.with_timeout(self.compiler_timeout)) as Arc<dyn IconSetCompiler>
            }),
            CompilerChoice::Disabled => None,
            CompilerChoice::Custom(compiler) => Some(compiler),
        };

        match &compiler {
            Some(compiler) => log::debug!("Icon compiler: {}", compiler.name()),
            None => log::debug!("No icon compiler; ICNS targets produce PNG sets"),
        }

        Ok(ConverterSettings {
            scratch_root: self.scratch_root,
            resize_filter: self.resize_filter.unwrap_or(FilterType::Lanczos3),
            compiler,
        })
    }
}

/// Output directory used when the caller does not name one.
///
/// Tries the user's desktop, then `~/Desktop`, then the directory containing
/// `source`, then the current directory.
pub fn default_output_dir(source: Option<&Path>) -> PathBuf {
    if let Some(desktop) = dirs::desktop_dir().filter(|dir| dir.is_dir()) {
        return desktop;
    }
    if let Some(desktop) = dirs::home_dir()
        .map(|home| home.join("Desktop"))
        .filter(|dir| dir.is_dir())
    {
        return desktop;
    }
    if let Some(parent) = source
        .and_then(Path::parent)
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        return parent.to_path_buf();
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::error::ErrorKind;

    #[test]
    fn disabled_compiler_is_none() {
        let settings = SettingsBuilder::new().no_compiler().build().expect("settings");
        assert!(settings.compiler().is_none());
        assert_eq!(settings.resize_filter(), FilterType::Lanczos3);
    }

    #[test]
    fn scratch_root_must_not_be_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("scratch");
        std::fs::write(&file, b"").expect("write");

        let err = SettingsBuilder::new().scratch_root(&file).build().err().expect("error");
        assert_eq!(err.kind(), ErrorKind::Filesystem);
    }

    #[test]
    fn missing_scratch_root_is_accepted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = SettingsBuilder::new()
            .scratch_root(dir.path().join("later"))
            .no_compiler()
            .build()
            .expect("settings");
        assert_eq!(settings.scratch_root(), Some(dir.path().join("later").as_path()));
    }

    #[test]
    fn default_output_dir_always_resolves() {
        let dir = default_output_dir(Some(Path::new("/some/where/logo.png")));
        assert!(!dir.as_os_str().is_empty());
    }
}

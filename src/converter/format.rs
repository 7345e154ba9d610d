//! Target and source format tags.
//!
//! [`TargetFormat`] selects one handler in the conversion dispatch table;
//! [`SourceKind`] decides how a source file is normalized into a raster image
//! before that handler runs.
//!
//! # Supported Targets
//!
//! | Target | Output | Sizes |
//! |--------|--------|-------|
//! | `ico` | `<base>.ico` | 16, 32, 48, 64, 128, 256 |
//! | `icns` | `<base>.icns` (or `<base>_icns/` PNG set) | 16, 32, 64, 128, 256, 512, 1024 |
//! | `png` | `<base>.png` | source size |
//! | `favicon` | `<base>_favicon.ico` + `<base>_favicon.png` | 16, 32, 48, 64 (+ 32) |
//! | `svg` | `<base>.svg` | source size |

use std::{fmt, path::Path, str::FromStr};

/// Output formats the converter can produce.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TargetFormat {
    /// Multi-resolution Windows icon.
    Ico,
    /// macOS icon bundle, or a PNG set where no icon compiler exists.
    Icns,
    /// Plain PNG, transparency preserved.
    Png,
    /// Small ICO plus a standalone 32x32 PNG.
    Favicon,
    /// SVG document; passthrough for SVG sources, raster embed otherwise.
    Svg,
}

impl TargetFormat {
    /// Every target, in display order.
    pub const ALL: [TargetFormat; 5] = [
        TargetFormat::Ico,
        TargetFormat::Icns,
        TargetFormat::Png,
        TargetFormat::Favicon,
        TargetFormat::Svg,
    ];

    /// Returns the lowercase identifier used on the command line and in messages.
    pub fn short_name(&self) -> &'static str {
        match self {
            TargetFormat::Ico => "ico",
            TargetFormat::Icns => "icns",
            TargetFormat::Png => "png",
            TargetFormat::Favicon => "favicon",
            TargetFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        TargetFormat::ALL
            .into_iter()
            .find(|format| format.short_name() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown target format '{}' (expected one of: ico, icns, png, favicon, svg)",
                    value.trim()
                )
            })
    }
}

/// How a source file is turned into a raster image.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SourceKind {
    /// macOS icon family, decoded with the `icns` crate.
    Icns,
    /// Vector document, rasterized with `resvg`.
    Svg,
    /// Anything else; the `image` decoder sniffs the content.
    Raster,
}

impl SourceKind {
    /// Classifies a source by its extension, case-insensitively.
    ///
    /// Paths without an extension are treated as generic rasters.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("icns") => SourceKind::Icns,
            Some("svg") => SourceKind::Svg,
            _ => SourceKind::Raster,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_target_names_case_insensitively() {
        assert_eq!("ICO".parse::<TargetFormat>(), Ok(TargetFormat::Ico));
        assert_eq!(" favicon ".parse::<TargetFormat>(), Ok(TargetFormat::Favicon));
        assert!("jpeg".parse::<TargetFormat>().is_err());
    }

    #[test]
    fn display_matches_parse() {
        for format in TargetFormat::ALL {
            assert_eq!(format.to_string().parse::<TargetFormat>(), Ok(format));
        }
    }

    #[test]
    fn classifies_sources_by_extension() {
        assert_eq!(SourceKind::from_path(Path::new("a/App.ICNS")), SourceKind::Icns);
        assert_eq!(SourceKind::from_path(Path::new("logo.Svg")), SourceKind::Svg);
        assert_eq!(SourceKind::from_path(Path::new("photo.jpeg")), SourceKind::Raster);
        assert_eq!(SourceKind::from_path(Path::new("pasted")), SourceKind::Raster);
    }
}

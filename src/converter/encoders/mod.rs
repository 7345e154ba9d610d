//! Per-format output handlers.
//!
//! Each target format has exactly one handler with the [`Handler`] signature.
//! [`handler`] is the dispatch table used by
//! [`Converter::convert`](super::Converter::convert).

pub mod icns;
pub mod ico;
pub mod png;
pub mod svg;

use crate::converter::{
    ConversionRequest, ConversionResult, ConverterSettings,
    error::{Error, ErrorExt, Result},
    format::{SourceKind, TargetFormat},
    source::{self, NormalizedSource},
    utils::fs::{Scratch, StagedOutput},
};
use image::{DynamicImage, ImageFormat};
use std::{
    io::{Cursor, Write},
    path::{Path, PathBuf},
};

/// Everything a handler needs for one conversion call.
#[derive(Debug)]
pub struct Job<'a> {
    /// The caller's request.
    pub request: &'a ConversionRequest,
    /// How the source is read.
    pub kind: SourceKind,
    /// Output file stem, taken from the source file name.
    pub base_name: String,
    /// Scratch directory owned by this call.
    pub scratch: &'a Scratch,
    /// Converter configuration.
    pub settings: &'a ConverterSettings,
}

impl Job<'_> {
    /// Source path of the request.
    pub fn source_path(&self) -> &Path {
        self.request.source_path()
    }

    /// `<output_dir>/<base><suffix>`.
    pub fn output_path(&self, suffix: &str) -> PathBuf {
        self.request
            .output_dir()
            .join(format!("{}{}", self.base_name, suffix))
    }

    /// Decodes the source into a raster image.
    pub fn normalize(&self) -> Result<NormalizedSource> {
        source::normalize(self.source_path(), self.request.svg_size(), self.scratch)
    }
}

/// Signature shared by every format handler.
pub type Handler = fn(&Job<'_>) -> Result<ConversionResult>;

/// Returns the handler for `format`.
pub fn handler(format: TargetFormat) -> Handler {
    match format {
        TargetFormat::Ico => ico::write_ico,
        TargetFormat::Icns => icns::write_icns,
        TargetFormat::Png => png::write_png,
        TargetFormat::Favicon => ico::write_favicon,
        TargetFormat::Svg => svg::write_svg,
    }
}

/// Encodes `image` as PNG bytes on behalf of `format`.
pub(crate) fn encode_png(image: &DynamicImage, format: TargetFormat) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| Error::encode(format, e))?;
    Ok(buf.into_inner())
}

/// Picks the pixel layout written to PNG.
///
/// Alpha-bearing images keep their layout and opaque ones become RGB8.
pub(crate) fn png_pixels(image: DynamicImage) -> DynamicImage {
    match image {
        // PNG has no float samples.
        DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb8(image.to_rgb8()),
        DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba8(image.to_rgba8()),
        image if image.color().has_alpha() => image,
        image => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

/// Stages `bytes` at `destination` without persisting it yet.
pub(crate) fn stage_bytes(destination: &Path, bytes: &[u8]) -> Result<StagedOutput> {
    let mut staged = StagedOutput::new(destination)?;
    staged
        .file_mut()
        .write_all(bytes)
        .fs_context("writing staged output", destination)?;
    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, Rgba32FImage};

    #[test]
    fn alpha_images_keep_their_layout() {
        let image = DynamicImage::new_luma_a8(4, 4);
        assert_eq!(png_pixels(image).color(), ColorType::La8);

        let image = DynamicImage::new_rgba16(4, 4);
        assert_eq!(png_pixels(image).color(), ColorType::Rgba16);
    }

    #[test]
    fn opaque_images_become_rgb() {
        assert_eq!(png_pixels(DynamicImage::new_luma8(4, 4)).color(), ColorType::Rgb8);
        assert_eq!(png_pixels(DynamicImage::new_rgb16(4, 4)).color(), ColorType::Rgb8);
        assert_eq!(png_pixels(DynamicImage::new_rgb32f(4, 4)).color(), ColorType::Rgb8);
    }

    #[test]
    fn float_images_encode_as_png() {
        let image = DynamicImage::ImageRgba32F(Rgba32FImage::from_pixel(
            4,
            4,
            image::Rgba([1.0, 0.5, 0.0, 0.25]),
        ));
        assert!(encode_png(&image, TargetFormat::Svg).is_err());

        let bytes = encode_png(&png_pixels(image), TargetFormat::Svg).expect("png");
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).expect("decode");
        assert_eq!(decoded.color(), ColorType::Rgba8);
    }
}

//! Source normalization.
//!
//! Turns any accepted source file into a [`DynamicImage`] the encoders can
//! resample. ICNS and SVG sources additionally leave a PNG intermediate in the
//! call's scratch directory; the PNG target installs it directly for ICNS
//! sources instead of encoding the pixels a second time.

use crate::converter::{
    error::{Error, ErrorExt, Result},
    format::{SourceKind, TargetFormat},
    utils::fs::Scratch,
};
use icns::{IconFamily, PixelFormat};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};

/// A decoded source, ready for the encoders.
#[derive(Debug)]
pub struct NormalizedSource {
    /// How the source was read.
    pub kind: SourceKind,
    /// Decoded pixels.
    pub image: DynamicImage,
    /// Temporary PNG written during normalization (ICNS and SVG sources).
    ///
    /// Lives inside the scratch directory and is removed with it. It holds
    /// exactly `image`, so a PNG output can be a copy of it.
    pub intermediate: Option<PathBuf>,
}

/// Decodes `path` according to its [`SourceKind`].
///
/// `svg_size` overrides the intrinsic document size of SVG sources and is
/// ignored for everything else.
pub fn normalize(
    path: &Path,
    svg_size: Option<(u32, u32)>,
    scratch: &Scratch,
) -> Result<NormalizedSource> {
    let kind = SourceKind::from_path(path);

    let (image, intermediate) = match kind {
        SourceKind::Icns => {
            let image = decode_icns(path)?;
            let png = scratch.artifact(&intermediate_name(path));
            image
                .save_with_format(&png, ImageFormat::Png)
                .map_err(|e| Error::from_image(TargetFormat::Png, &png, e))?;
            (image, Some(png))
        }
        SourceKind::Svg => {
            let png = scratch.artifact(&intermediate_name(path));
            let bytes = render_svg_png(path, svg_size)?;
            fs::write(&png, &bytes).fs_context("writing rasterized SVG", &png)?;
            let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
                .map_err(|e| Error::unsupported(path, e))?;
            (image, Some(png))
        }
        SourceKind::Raster => (decode_raster(path)?, None),
    };

    log::debug!(
        "Normalized {} ({:?}): {}x{} {:?}",
        path.display(),
        kind,
        image.width(),
        image.height(),
        image.color()
    );

    Ok(NormalizedSource {
        kind,
        image,
        intermediate,
    })
}

/// Decodes a raster file, sniffing the format from its content.
pub fn decode_raster(path: &Path) -> Result<DynamicImage> {
    ImageReader::open(path)
        .fs_context("opening source", path)?
        .with_guessed_format()
        .fs_context("reading source", path)?
        .decode()
        .map_err(|e| Error::unsupported(path, e))
}

/// Decodes the largest image of an ICNS icon family.
pub fn decode_icns(path: &Path) -> Result<DynamicImage> {
    let file = File::open(path).fs_context("opening source", path)?;
    let family = IconFamily::read(BufReader::new(file)).map_err(|e| Error::unsupported(path, e))?;

    let icon_type = family
        .available_icons()
        .into_iter()
        .max_by_key(|icon_type| icon_type.pixel_width() * icon_type.pixel_height())
        .ok_or_else(|| Error::unsupported(path, "icon family contains no decodable images"))?;

    let icon = family
        .get_icon_with_type(icon_type)
        .map_err(|e| Error::unsupported(path, e))?
        .convert_to(PixelFormat::RGBA);

    let (width, height) = (icon.width(), icon.height());
    let rgba = RgbaImage::from_raw(width, height, icon.into_data().into_vec())
        .ok_or_else(|| Error::unsupported(path, "decoded pixel buffer has the wrong length"))?;

    Ok(DynamicImage::ImageRgba8(rgba))
}

/// Rasterizes an SVG document onto a transparent pixmap.
///
/// Without `size` the document's intrinsic size is used; with it the
/// document is stretched to fill exactly `width` x `height`.
pub fn rasterize_svg(path: &Path, size: Option<(u32, u32)>) -> Result<tiny_skia::Pixmap> {
    let data = fs::read(path).fs_context("reading SVG source", path)?;

    let mut options = usvg::Options {
        resources_dir: path.parent().map(Path::to_path_buf),
        ..usvg::Options::default()
    };
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_data(&data, &options).map_err(|e| Error::unsupported(path, e))?;
    let intrinsic = tree.size();
    let (width, height) = size.unwrap_or((
        intrinsic.width().ceil() as u32,
        intrinsic.height().ceil() as u32,
    ));

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        Error::unsupported(path, format!("cannot rasterize at {width}x{height}"))
    })?;
    pixmap.fill(tiny_skia::Color::TRANSPARENT);

    let transform = tiny_skia::Transform::from_scale(
        width as f32 / intrinsic.width(),
        height as f32 / intrinsic.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    log::debug!("Rasterized {} at {}x{}", path.display(), width, height);
    Ok(pixmap)
}

/// Rasterizes an SVG document and encodes it as straight-alpha PNG bytes.
pub fn render_svg_png(path: &Path, size: Option<(u32, u32)>) -> Result<Vec<u8>> {
    rasterize_svg(path, size)?
        .encode_png()
        .map_err(|e| Error::encode(TargetFormat::Png, e))
}

fn intermediate_name(path: &Path) -> String {
    format!("{}_temp.png", super::base_name(path))
}

//! ICO and favicon output.

use super::{Job, encode_png, stage_bytes};
use crate::converter::{
    ConversionResult,
    error::{Error, Result},
    format::TargetFormat,
    resample::{FAVICON_PNG_SIZE, FAVICON_SIZES, ICO_SIZES, resize_square},
    utils::fs::commit_all,
};
use ico::{IconDir, IconDirEntry, IconImage, ResourceType};
use image::{DynamicImage, imageops::FilterType};

/// Builds an in-memory icon directory with one square entry per size.
pub fn build_icon_dir(
    image: &DynamicImage,
    sizes: &[u32],
    filter: FilterType,
    format: TargetFormat,
) -> Result<IconDir> {
    let mut icon_dir = IconDir::new(ResourceType::Icon);

    for &size in sizes {
        let resized = resize_square(image, size, filter);
        let icon_image = IconImage::from_rgba_data(size, size, resized.into_raw());
        let entry = IconDirEntry::encode(&icon_image).map_err(|e| Error::encode(format, e))?;
        icon_dir.add_entry(entry);
    }

    Ok(icon_dir)
}

fn encode_ico(icon_dir: &IconDir, format: TargetFormat) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    icon_dir
        .write(&mut buf)
        .map_err(|e| Error::encode(format, e))?;
    Ok(buf)
}

/// `<base>.ico` with 16, 32, 48, 64, 128 and 256 pixel entries.
pub fn write_ico(job: &Job<'_>) -> Result<ConversionResult> {
    let source = job.normalize()?;
    let icon_dir = build_icon_dir(
        &source.image,
        &ICO_SIZES,
        job.settings.resize_filter(),
        TargetFormat::Ico,
    )?;
    let bytes = encode_ico(&icon_dir, TargetFormat::Ico)?;

    let output = stage_bytes(&job.output_path(".ico"), &bytes)?.persist()?;
    Ok(ConversionResult::file(output, TargetFormat::Ico))
}

/// `<base>_favicon.ico` (16 to 64 pixels) plus a 32x32 `<base>_favicon.png`.
///
/// Both files are persisted together or not at all.
pub fn write_favicon(job: &Job<'_>) -> Result<ConversionResult> {
    let source = job.normalize()?;
    let filter = job.settings.resize_filter();

    let icon_dir = build_icon_dir(&source.image, &FAVICON_SIZES, filter, TargetFormat::Favicon)?;
    let ico_bytes = encode_ico(&icon_dir, TargetFormat::Favicon)?;

    let png = DynamicImage::ImageRgba8(resize_square(&source.image, FAVICON_PNG_SIZE, filter));
    let png_bytes = encode_png(&png, TargetFormat::Favicon)?;

    let ico_path = job.output_path("_favicon.ico");
    let png_path = job.output_path("_favicon.png");
    commit_all(vec![
        stage_bytes(&ico_path, &ico_bytes)?,
        stage_bytes(&png_path, &png_bytes)?,
    ])?;

    Ok(ConversionResult::file(ico_path, TargetFormat::Favicon).with_extra_output(png_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn icon_dir_has_one_entry_per_size() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(300, 200, Rgba([1, 2, 3, 128])));

        let icon_dir =
            build_icon_dir(&image, &ICO_SIZES, FilterType::Lanczos3, TargetFormat::Ico)
                .expect("icon dir");

        let sizes: Vec<u32> = icon_dir.entries().iter().map(|e| e.width()).collect();
        assert_eq!(sizes, ICO_SIZES.to_vec());
        assert!(icon_dir.entries().iter().all(|e| e.width() == e.height()));
    }

    #[test]
    fn encoded_ico_reads_back() {
        let image = DynamicImage::new_rgba8(64, 64);
        let icon_dir =
            build_icon_dir(&image, &FAVICON_SIZES, FilterType::Nearest, TargetFormat::Favicon)
                .expect("icon dir");
        let bytes = encode_ico(&icon_dir, TargetFormat::Favicon).expect("encode");

        let parsed = IconDir::read(std::io::Cursor::new(bytes)).expect("read");
        assert_eq!(parsed.entries().len(), FAVICON_SIZES.len());
    }
}

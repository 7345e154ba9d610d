//! Size tables and resampling helpers shared by the encoders.
//!
//! All resampling goes through RGBA8 so alpha survives every resize, and uses
//! the filter configured in [`ConverterSettings`](super::ConverterSettings)
//! (Lanczos3 unless overridden), which gives the best quality for the
//! downscaling icon work mostly consists of.

use image::{DynamicImage, RgbaImage, imageops::FilterType};

/// Entries packed into a `.ico` file.
pub const ICO_SIZES: [u32; 6] = [16, 32, 48, 64, 128, 256];

/// Entries packed into a `_favicon.ico` file.
pub const FAVICON_SIZES: [u32; 4] = [16, 32, 48, 64];

/// Edge length of the standalone `_favicon.png`.
pub const FAVICON_PNG_SIZE: u32 = 32;

/// Square sizes rendered for an ICNS bundle (and its PNG-set fallback).
pub const ICNS_SIZES: [u32; 7] = [16, 32, 64, 128, 256, 512, 1024];

/// Returns the `WxH` label used for size-keyed file names.
pub fn size_label(size: u32) -> String {
    format!("{size}x{size}")
}

/// Resamples `image` to a `size` x `size` RGBA buffer.
///
/// The source aspect ratio is not preserved; icon entries are always square.
pub fn resize_square(image: &DynamicImage, size: u32, filter: FilterType) -> RgbaImage {
    let rgba = image.to_rgba8();
    if rgba.dimensions() == (size, size) {
        return rgba;
    }

    log::debug!(
        "Resampling {}x{} -> {}x{} ({:?})",
        rgba.width(),
        rgba.height(),
        size,
        size,
        filter
    );
    image::imageops::resize(&rgba, size, size, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn resize_keeps_alpha() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            40,
            20,
            Rgba([10, 20, 30, 0]),
        ));

        let resized = resize_square(&source, 16, FilterType::Lanczos3);

        assert_eq!(resized.dimensions(), (16, 16));
        assert!(resized.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn same_size_is_a_plain_conversion() {
        let source = DynamicImage::new_rgb8(32, 32);
        let resized = resize_square(&source, 32, FilterType::Nearest);
        assert_eq!(resized.dimensions(), (32, 32));
        assert!(resized.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn labels_are_square() {
        assert_eq!(size_label(1024), "1024x1024");
    }
}

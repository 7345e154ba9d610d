//! SVG output.
//!
//! SVG sources are copied unchanged. Anything else is embedded as a base64
//! PNG inside a single `<image>` element; no tracing takes place.

use super::{Job, encode_png, png_pixels, stage_bytes};
use crate::converter::{
    ConversionResult,
    error::Result,
    format::{SourceKind, TargetFormat},
    utils::fs::install_copy,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};

/// `<base>.svg`.
pub fn write_svg(job: &Job<'_>) -> Result<ConversionResult> {
    let destination = job.output_path(".svg");

    let output = if job.kind == SourceKind::Svg {
        log::debug!("SVG source; copying {} unchanged", job.source_path().display());
        install_copy(job.source_path(), &destination)?
    } else {
        let normalized = job.normalize()?;
        let (width, height) = (normalized.image.width(), normalized.image.height());
        let png = encode_png(&png_pixels(normalized.image), TargetFormat::Svg)?;
        let document = embed_document(width, height, &png);
        stage_bytes(&destination, document.as_bytes())?.persist()?
    };

    Ok(ConversionResult::file(output, TargetFormat::Svg))
}

/// Wraps PNG bytes in a minimal SVG document of the given pixel size.
pub fn embed_document(width: u32, height: u32, png: &[u8]) -> String {
    let payload = STANDARD.encode(png);
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n",
            "<svg width=\"{w}\" height=\"{h}\" xmlns=\"http://www.w3.org/2000/svg\" ",
            "xmlns:xlink=\"http://www.w3.org/1999/xlink\">\n",
            "  <image width=\"{w}\" height=\"{h}\" xlink:href=\"data:image/png;base64,{payload}\"/>\n",
            "</svg>\n"
        ),
        w = width,
        h = height,
        payload = payload
    )
}

//! PNG output.

use super::{Job, encode_png, png_pixels, stage_bytes};
use crate::converter::{
    ConversionResult,
    error::Result,
    format::{SourceKind, TargetFormat},
    source,
    utils::fs::install_copy,
};

/// `<base>.png` at the source's own size.
///
/// SVG sources are rasterized straight into the output. ICNS sources reuse
/// the PNG intermediate written while decoding them. Other sources keep their
/// alpha channel if they have one and are saved as RGB otherwise.
pub fn write_png(job: &Job<'_>) -> Result<ConversionResult> {
    let destination = job.output_path(".png");

    let output = if job.kind == SourceKind::Svg {
        let bytes = source::render_svg_png(job.source_path(), job.request.svg_size())?;
        stage_bytes(&destination, &bytes)?.persist()?
    } else {
        let normalized = job.normalize()?;
        match &normalized.intermediate {
            Some(intermediate) => install_copy(intermediate, &destination)?,
            None => {
                let bytes = encode_png(&png_pixels(normalized.image), TargetFormat::Png)?;
                stage_bytes(&destination, &bytes)?.persist()?
            }
        }
    };

    Ok(ConversionResult::file(output, TargetFormat::Png))
}

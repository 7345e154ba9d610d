//! ICNS output.
//!
//! The source is resampled to every size in [`ICNS_SIZES`] inside a working
//! directory in scratch. With an icon compiler those PNGs are arranged into an
//! Apple iconset and packed into `<base>.icns`; without one they are published
//! as a `<base>_icns/` directory instead.

use super::Job;
use crate::converter::{
    ConversionResult,
    error::{Context, Error, ErrorExt, Result},
    format::TargetFormat,
    resample::{ICNS_SIZES, resize_square, size_label},
    utils::fs::{StagedDir, copy_file, install_copy},
};
use image::ImageFormat;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Apple iconset file names and the pixel size each one is drawn from.
pub const ICONSET_ENTRIES: [(&str, u32); 10] = [
    ("icon_16x16.png", 16),
    ("icon_16x16@2x.png", 32),
    ("icon_32x32.png", 32),
    ("icon_32x32@2x.png", 64),
    ("icon_128x128.png", 128),
    ("icon_128x128@2x.png", 256),
    ("icon_256x256.png", 256),
    ("icon_256x256@2x.png", 512),
    ("icon_512x512.png", 512),
    ("icon_512x512@2x.png", 1024),
];

/// `<base>.icns`, or the `<base>_icns/` PNG set when no compiler is available.
pub fn write_icns(job: &Job<'_>) -> Result<ConversionResult> {
    let source = job.normalize()?;
    let work = job.scratch.nested_dir("icns-")?;
    let filter = job.settings.resize_filter();

    let mut rendered: Vec<(u32, PathBuf)> = Vec::with_capacity(ICNS_SIZES.len());
    for size in ICNS_SIZES {
        let path = work.path().join(format!("{}.png", size_label(size)));
        resize_square(&source.image, size, filter)
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| Error::from_image(TargetFormat::Icns, &path, e))?;
        log::debug!("Rendered {}", path.display());
        rendered.push((size, path));
    }

    let Some(compiler) = job.settings.compiler() else {
        let destination = job.output_path("_icns");
        log::warn!(
            "No icon compiler available; writing PNG set to {}",
            destination.display()
        );

        let staged = StagedDir::new(&destination)?;
        for (_, path) in &rendered {
            let name = path.file_name().unwrap_or_default();
            copy_file(path, &staged.path().join(name))?;
        }
        let output = staged.persist().context("publishing PNG set")?;
        return Ok(ConversionResult::png_set(output));
    };

    let iconset = work.path().join("icon.iconset");
    build_iconset(&rendered, &iconset)?;

    let compiled = work.path().join(format!("{}.icns", job.base_name));
    log::info!("Compiling {} with {}", iconset.display(), compiler.name());
    compiler
        .compile_icon_set(&iconset, &compiled)
        .with_context(|| format!("compiling {}.icns", job.base_name))?;

    let output = install_copy(&compiled, &job.output_path(".icns"))?;
    Ok(ConversionResult::file(output, TargetFormat::Icns))
}

/// Copies rendered PNGs into `iconset` under Apple's names.
fn build_iconset(rendered: &[(u32, PathBuf)], iconset: &Path) -> Result<()> {
    fs::create_dir_all(iconset).fs_context("creating iconset", iconset)?;

    for (name, size) in ICONSET_ENTRIES {
        let Some((_, path)) = rendered.iter().find(|(rendered_size, _)| *rendered_size == size)
        else {
            return Err(Error::encode(
                TargetFormat::Icns,
                format!("no {} rendition for {name}", size_label(size)),
            ));
        };
        copy_file(path, &iconset.join(name))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_iconset_entry_has_a_rendered_size() {
        for (name, size) in ICONSET_ENTRIES {
            assert!(ICNS_SIZES.contains(&size), "{name} needs {size}px");
        }
    }

    #[test]
    fn iconset_holds_ten_apple_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let rendered: Vec<(u32, PathBuf)> = ICNS_SIZES
            .iter()
            .map(|&size| {
                let path = dir.path().join(format!("{}.png", size_label(size)));
                fs::write(&path, size.to_string()).expect("write");
                (size, path)
            })
            .collect();
        let iconset = dir.path().join("icon.iconset");

        build_iconset(&rendered, &iconset).expect("iconset");

        let mut names: Vec<String> = fs::read_dir(&iconset)
            .expect("read_dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        let mut expected: Vec<&str> = ICONSET_ENTRIES.iter().map(|(name, _)| *name).collect();
        expected.sort();
        assert_eq!(names, expected);
        assert_eq!(
            fs::read_to_string(iconset.join("icon_32x32@2x.png")).expect("read"),
            "64"
        );
    }

    #[test]
    fn missing_rendition_is_an_encode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = build_iconset(&[], &dir.path().join("icon.iconset")).unwrap_err();
        assert_eq!(err.kind(), crate::converter::ErrorKind::Encode);
    }
}

//! The `convert` command.

use crate::cli::{Args, RuntimeConfig};
use crate::converter::{
    ConversionRequest, Converter, ConverterSettings, SettingsBuilder, default_output_dir,
};
use crate::error::Result;
use anyhow::Context as _;

/// Builds converter settings from command line flags.
fn build_settings(args: &Args) -> Result<ConverterSettings> {
    let mut builder = SettingsBuilder::new();

    if let Some(dir) = &args.scratch_dir {
        builder = builder.scratch_root(dir);
    }
    if let Some(timeout) = args.compiler_timeout() {
        builder = builder.compiler_timeout(timeout);
    }
    if args.no_compiler {
        builder = builder.no_compiler();
    }

    Ok(builder.build()?)
}

/// Builds the request, resolving the default output directory.
fn build_request(args: &Args) -> ConversionRequest {
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(Some(&args.source)));

    let request = ConversionRequest::new(&args.source, args.to, output_dir);
    match args.svg_size {
        Some((width, height)) => request.with_svg_size(width, height),
        None => request,
    }
}

/// Runs one conversion on the blocking pool and reports the result.
pub(super) async fn execute_convert(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let settings = build_settings(args)?;
    let request = build_request(args);

    config.verbose_println(&format!(
        "Converting {} to {} in {}",
        request.source_path().display(),
        request.target_format(),
        request.output_dir().display()
    ));

    let converter = Converter::new(settings);
    let result = tokio::task::spawn_blocking(move || converter.convert(&request))
        .await
        .context("conversion task did not complete")??;

    if result.is_fallback() {
        config.warning_println(
            "iconutil is not available; wrote a PNG set instead of an .icns file",
        );
    }
    config.success_println(&format!("Created {}", result.output_path.display()));
    for extra in &result.extra_outputs {
        config.indent(&format!("also {}", extra.display()));
    }

    Ok(())
}

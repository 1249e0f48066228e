//! Image sink: framebuffer to 8-bit file.

use crate::config::OutputConfig;
use crate::error::{RenderError, RenderResult};
use crate::framebuffer::Framebuffer;
use ember_math::Interval;
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ColorType, ImageEncoder, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Map one linear channel value to a display byte.
pub fn encode_channel(value: f32, config: &OutputConfig) -> u8 {
    let mut v = value;
    if config.gamma_correction {
        v = v.max(0.0);
        v /= v + 1.0;
        v = v.powf(1.0 / 2.2);
    }
    // NaN falls through clamp; treat it as black
    let v = if v.is_nan() { 0.0 } else { Interval::UNIT.clamp(v) };
    (255.0 * v.powf(config.exponent)).round() as u8
}

/// Convert the framebuffer to an 8-bit RGB image.
///
/// Fails if the pixel count does not match the framebuffer's dimensions.
pub fn to_rgb8(framebuffer: &Framebuffer, config: &OutputConfig) -> RenderResult<RgbImage> {
    let bytes: Vec<u8> = framebuffer
        .pixels
        .iter()
        .flat_map(|c| {
            [
                encode_channel(c.x, config),
                encode_channel(c.y, config),
                encode_channel(c.z, config),
            ]
        })
        .collect();

    let (width, height) = (framebuffer.width, framebuffer.height);
    RgbImage::from_raw(width, height, bytes).ok_or(RenderError::BufferSize {
        width,
        height,
        expected: width as usize * height as usize,
        actual: framebuffer.pixels.len(),
    })
}

/// Write the framebuffer to `path`.
///
/// `.ppm` files are binary P6; any other extension is handed to the `image`
/// crate's format detection.
pub fn write_image(
    path: impl AsRef<Path>,
    framebuffer: &Framebuffer,
    config: &OutputConfig,
) -> RenderResult<()> {
    let path = path.as_ref();
    let rgb = to_rgb8(framebuffer, config)?;

    let is_ppm = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        let writer = BufWriter::new(File::create(path)?);
        let encoder = PnmEncoder::new(writer)
            .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary));
        encoder.write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)?;
    } else {
        rgb.save(path)?;
    }

    log::info!(
        "Wrote {}x{} image to {}",
        framebuffer.width,
        framebuffer.height,
        path.display()
    );
    Ok(())
}

/// `<width>x<height>_<spp>spp_<timestamp>.ppm`
pub fn output_file_name(width: u32, height: u32, spp: u32, timestamp: u64) -> String {
    format!("{}x{}_{}spp_{}.ppm", width, height, spp, timestamp)
}

/// Full output path for a render finishing now.
pub fn output_path(config: &OutputConfig, width: u32, height: u32, spp: u32) -> PathBuf {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    config
        .output_dir
        .join(output_file_name(width, height, spp, timestamp))
}

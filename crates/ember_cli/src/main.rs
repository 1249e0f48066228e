//! Ember - render the built-in Cornell box to an image file.

mod cornell;

use anyhow::{Context, Result};
use clap::Parser;
use ember_renderer::{output_path, render, write_image, RenderSettings};
use std::path::PathBuf;
use std::time::Instant;

/// Offline path tracer for the Cornell box
#[derive(Parser, Debug)]
#[command(name = "ember", version, about)]
struct Cli {
    /// Samples per pixel; zero or negative keeps the default
    #[arg(allow_negative_numbers = true)]
    spp: Option<i64>,

    /// Worker threads; zero or negative keeps the default
    #[arg(allow_negative_numbers = true)]
    threads: Option<i64>,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// JSON file with render settings; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the image is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Base seed; worker k uses seed + k
    #[arg(long)]
    seed: Option<u64>,

    /// Trace every sample through the pixel center
    #[arg(long)]
    no_antialias: bool,

    /// Tone map and gamma correct before the display curve
    #[arg(long)]
    gamma_correction: bool,
}

/// Positive values as `Some`, everything else as `None`.
fn positive(value: Option<i64>) -> Option<u64> {
    value.filter(|&v| v > 0).map(|v| v as u64)
}

impl Cli {
    fn settings(&self) -> Result<RenderSettings> {
        let mut settings = match &self.config {
            Some(path) => RenderSettings::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => RenderSettings::default(),
        };

        if let Some(spp) = positive(self.spp) {
            settings.samples_per_pixel = u32::try_from(spp).unwrap_or(u32::MAX);
        }
        if let Some(threads) = positive(self.threads) {
            settings.threads = usize::try_from(threads).unwrap_or(usize::MAX);
        }
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(dir) = &self.output_dir {
            settings.output.output_dir = dir.clone();
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if self.no_antialias {
            settings.antialias = false;
        }
        if self.gamma_correction {
            settings.output.gamma_correction = true;
        }

        Ok(settings.sanitized())
    }
}

fn format_elapsed(secs: u64) -> String {
    format!(
        "{} hours, {} minutes, {} seconds",
        secs / 3600,
        secs / 60 % 60,
        secs % 60
    )
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;

    log::info!("Starting Ember");

    let scene = cornell::build_scene()?;
    let camera = cornell::camera(settings.width, settings.height);

    let start = Instant::now();
    let framebuffer = render(&scene, &camera, &settings).context("Render failed")?;
    log::info!("Render complete: {}", format_elapsed(start.elapsed().as_secs()));

    std::fs::create_dir_all(&settings.output.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            settings.output.output_dir.display()
        )
    })?;
    let path = output_path(
        &settings.output,
        settings.width,
        settings.height,
        settings.samples_per_pixel,
    );
    write_image(&path, &framebuffer, &settings.output)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

//! Render settings, loadable from JSON.

use crate::error::RenderResult;
use crate::integrator::IntegratorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SAMPLES_PER_PIXEL: u32 = 16;
pub const DEFAULT_EXPONENT: f32 = 0.6;

/// Worker count used when none is configured.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// How the framebuffer is turned into 8-bit pixels and where it goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Display curve applied after clamping: `clamp(v, 0, 1)^exponent`
    pub exponent: f32,
    /// Apply `v / (v + 1)` tone mapping and 1/2.2 gamma before the curve
    pub gamma_correction: bool,
    pub output_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            exponent: DEFAULT_EXPONENT,
            gamma_correction: false,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Everything needed to render one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    /// Number of workers; one contiguous pixel range each
    pub threads: usize,
    /// Worker `k` seeds its generator with `seed + k`
    pub seed: u64,
    /// Jitter camera rays inside the pixel
    pub antialias: bool,
    pub integrator: IntegratorConfig,
    pub output: OutputConfig,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 784,
            height: 784,
            samples_per_pixel: DEFAULT_SAMPLES_PER_PIXEL,
            threads: default_threads(),
            seed: 0,
            antialias: true,
            integrator: IntegratorConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl RenderSettings {
    /// Load settings from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> RenderResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let settings = serde_json::from_str(&text)?;
        log::info!("Loaded render settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Replace unusable values with defaults, warning about each one.
    pub fn sanitized(mut self) -> Self {
        if self.samples_per_pixel == 0 {
            log::warn!(
                "samples_per_pixel must be positive, using {}",
                DEFAULT_SAMPLES_PER_PIXEL
            );
            self.samples_per_pixel = DEFAULT_SAMPLES_PER_PIXEL;
        }

        if self.threads == 0 {
            self.threads = default_threads();
            log::warn!("threads must be positive, using {}", self.threads);
        }

        let rr = self.integrator.russian_roulette;
        if !(rr > 0.0 && rr <= 1.0) {
            let fixed = if rr > 1.0 {
                1.0
            } else {
                IntegratorConfig::default().russian_roulette
            };
            log::warn!("russian_roulette {} outside (0, 1], using {}", rr, fixed);
            self.integrator.russian_roulette = fixed;
        }

        if !(self.integrator.pdf_floor > 0.0) {
            let fixed = IntegratorConfig::default().pdf_floor;
            log::warn!("pdf_floor must be positive, using {}", fixed);
            self.integrator.pdf_floor = fixed;
        }

        if !(self.output.exponent > 0.0) {
            log::warn!("exponent must be positive, using {}", DEFAULT_EXPONENT);
            self.output.exponent = DEFAULT_EXPONENT;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::RadianceClamp;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = RenderSettings::default();
        assert_eq!(settings.samples_per_pixel, 16);
        assert!(settings.threads >= 1);
        assert!(settings.antialias);
        assert_eq!(settings.output.exponent, 0.6);
        assert!(!settings.output.gamma_correction);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: RenderSettings = serde_json::from_str(
            r#"{
                "width": 64,
                "samples_per_pixel": 4,
                "integrator": { "clamp": "per_bounce" },
                "output": { "gamma_correction": true }
            }"#,
        )
        .expect("valid json");

        assert_eq!(settings.width, 64);
        assert_eq!(settings.height, 784);
        assert_eq!(settings.samples_per_pixel, 4);
        assert_eq!(settings.integrator.clamp, RadianceClamp::PerBounce);
        assert_eq!(settings.integrator.russian_roulette, 0.8);
        assert!(settings.output.gamma_correction);
        assert_eq!(settings.output.exponent, 0.6);
    }

    #[test]
    fn test_sanitized_replaces_zeroes() {
        let mut settings = RenderSettings {
            samples_per_pixel: 0,
            threads: 0,
            ..Default::default()
        };
        settings.integrator.russian_roulette = 0.0;
        settings.output.exponent = -1.0;

        let fixed = settings.sanitized();
        assert_eq!(fixed.samples_per_pixel, DEFAULT_SAMPLES_PER_PIXEL);
        assert_eq!(fixed.threads, default_threads());
        assert_eq!(fixed.integrator.russian_roulette, 0.8);
        assert_eq!(fixed.output.exponent, DEFAULT_EXPONENT);

        let mut greedy = RenderSettings::default();
        greedy.integrator.russian_roulette = 1.5;
        assert_eq!(greedy.sanitized().integrator.russian_roulette, 1.0);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "width": 32, "height": 16, "seed": 7 }}"#).expect("write");

        let settings = RenderSettings::from_json_file(file.path()).expect("load");
        assert_eq!((settings.width, settings.height, settings.seed), (32, 16, 7));
    }

    #[test]
    fn test_from_json_file_errors() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write");
        assert!(matches!(
            RenderSettings::from_json_file(file.path()),
            Err(crate::RenderError::Config(_))
        ));

        assert!(matches!(
            RenderSettings::from_json_file("/nonexistent/ember.json"),
            Err(crate::RenderError::Io(_))
        ));
    }
}

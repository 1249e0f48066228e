//! Range-based parallel rendering.
//!
//! The pixel index space `[0, width * height)` is cut into one contiguous
//! range per worker. Each worker owns the matching slice of the framebuffer,
//! so the workers never share a pixel and no locking is needed.

use crate::camera::Camera;
use crate::config::RenderSettings;
use crate::error::{RenderError, RenderResult};
use crate::framebuffer::Framebuffer;
use crate::integrator::{PathIntegrator, PathScratch};
use crate::scene::Scene;
use crate::Color;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;

/// Progress is reported every 1/PROGRESS_STEPS of a worker's range.
const PROGRESS_STEPS: usize = 20;

/// Split `[0, total)` into `workers` contiguous, disjoint ranges.
///
/// Every range gets `total / workers` indices and the first
/// `total % workers` ranges get one more.
pub fn partition(total: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let base = total / workers;
    let extra = total % workers;

    let mut start = 0;
    (0..workers)
        .map(|k| {
            let len = base + usize::from(k < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

/// One worker's share of the frame.
pub struct RenderJob<'a> {
    pub worker: usize,
    /// Pixel indices covered by `pixels`
    pub range: Range<usize>,
    pub samples_per_pixel: u32,
    pub camera: &'a Camera,
    pub pixels: &'a mut [Color],
    /// Log progress while rendering
    pub report_progress: bool,
}

impl RenderJob<'_> {
    /// Render every pixel of the job into its slice.
    pub fn run(
        self,
        scene: &Scene,
        integrator: &PathIntegrator,
        antialias: bool,
        rng: &mut dyn RngCore,
    ) {
        let width = self.camera.image_width() as usize;
        let spp = self.samples_per_pixel.max(1);
        let inv_spp = 1.0 / spp as f32;
        let step = (self.range.len() / PROGRESS_STEPS).max(1);
        let mut scratch = PathScratch::default();

        log::debug!(
            "Worker {} renders pixels {} to {}",
            self.worker,
            self.range.start,
            self.range.end
        );

        for (offset, pixel) in self.pixels.iter_mut().enumerate() {
            let index = self.range.start + offset;
            let i = (index % width) as u32;
            let j = (index / width) as u32;

            let mut color = Color::ZERO;
            for _ in 0..spp {
                let ray = if antialias {
                    self.camera.get_ray(i, j, rng)
                } else {
                    self.camera.center_ray(i, j)
                };
                color += integrator.estimate_with(scene, &ray, 0, &mut scratch, rng);
            }
            *pixel = color * inv_spp;

            if self.report_progress && offset % step == 0 && offset > 0 {
                log::info!("Progress: {}%", offset * 100 / self.range.len());
            }
        }

        if self.report_progress {
            log::info!("Progress: 100%");
        }
    }
}

/// Render `scene` as seen by `camera`.
///
/// Blocks until every worker is done. A panic in any worker discards the
/// frame and is returned as [`RenderError::WorkerPanicked`].
pub fn render(
    scene: &Scene,
    camera: &Camera,
    settings: &RenderSettings,
) -> RenderResult<Framebuffer> {
    let (width, height) = (settings.width, settings.height);
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidResolution { width, height });
    }

    let resized;
    let camera = if camera.image_width() == width && camera.image_height() == height {
        camera
    } else {
        log::debug!("Resizing camera to {}x{}", width, height);
        resized = camera.clone().with_resolution(width, height);
        &resized
    };

    let workers = settings.threads.max(1);
    let spp = settings.samples_per_pixel.max(1);
    let integrator = PathIntegrator::new(settings.integrator);
    let mut framebuffer = Framebuffer::new(width, height);

    log::info!(
        "Rendering {}x{} at {} spp with {} workers",
        width,
        height,
        spp,
        workers
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|k| format!("ember-worker-{k}"))
        .build()?;

    let ranges = partition(framebuffer.len(), workers);
    let mut jobs = Vec::with_capacity(ranges.len());
    let mut rest: &mut [Color] = &mut framebuffer.pixels;
    for (worker, range) in ranges.into_iter().enumerate() {
        let (pixels, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
        rest = tail;
        jobs.push(RenderJob {
            worker,
            range,
            samples_per_pixel: spp,
            camera,
            pixels,
            report_progress: worker == workers - 1,
        });
    }

    let panics: Mutex<Vec<String>> = Mutex::new(Vec::new());
    let integrator = &integrator;
    let panics_ref = &panics;

    pool.scope(|s| {
        for job in jobs {
            let seed = settings.seed.wrapping_add(job.worker as u64);
            let antialias = settings.antialias;
            s.spawn(move |_| {
                let worker = job.worker;
                let mut rng = StdRng::seed_from_u64(seed);
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    job.run(scene, integrator, antialias, &mut rng)
                }));

                if let Err(payload) = outcome {
                    let message = panic_message(payload.as_ref());
                    log::error!("Worker {} panicked: {}", worker, message);
                    if let Ok(mut list) = panics_ref.lock() {
                        list.push(format!("worker {worker}: {message}"));
                    }
                }
            });
        }
    });

    let panics = panics
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if !panics.is_empty() {
        return Err(RenderError::WorkerPanicked(panics.join("; ")));
    }

    log::info!("All {} workers finished", workers);
    Ok(framebuffer)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

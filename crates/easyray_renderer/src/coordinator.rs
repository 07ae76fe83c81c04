//! Parallel dispatch of primary rays.
//!
//! The film is cut into buckets and the buckets are dealt to a fixed set of
//! workers before tracing starts. Each worker traces its buckets into local
//! tiles; the tiles are merged into the camera film after every worker has
//! joined. No pixel is written by two workers, and nothing is written to the
//! camera while tracing runs.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::{Duration, Instant};

use easyray_core::{RenderJob, RenderSettings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::acceleration::{self, AccelerationStructure};
use crate::bucket::{generate_buckets, partition, Bucket, FilmTile, DEFAULT_BUCKET_SIZE};
use crate::camera::{Camera, RasterImage};
use crate::error::{RenderError, RenderResult};
use crate::scene::Scene;
use crate::tracer::{TraceSettings, TraceStats, Tracer};

/// Outcome of a completed render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSummary {
    /// Camera, reflection, glossy and refraction rays
    pub rays_traced: u64,
    pub shadow_rays: u64,
    pub primary_rays: u64,
    pub workers: usize,
    pub elapsed: Duration,
}

struct WorkerOutput {
    tiles: Vec<FilmTile>,
    stats: TraceStats,
    primary_rays: u64,
}

/// Drives a render of one scene through one acceleration structure.
pub struct TracingCoordinator<'a> {
    scene: &'a Scene,
    accel: &'a dyn AccelerationStructure,
    trace: TraceSettings,
    threads: Option<usize>,
    bucket_size: u32,
    seed: u64,
}

impl<'a> TracingCoordinator<'a> {
    pub fn new(scene: &'a Scene, accel: &'a dyn AccelerationStructure, settings: &RenderSettings) -> Self {
        Self {
            scene,
            accel,
            trace: TraceSettings::from(settings),
            threads: settings.threads,
            bucket_size: settings.bucket_size,
            seed: settings.seed,
        }
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_bucket_size(mut self, bucket_size: u32) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    /// Workers used for `buckets` buckets: the configured thread count or the
    /// machine's parallelism, never more than there are buckets.
    pub fn worker_count(&self, buckets: usize) -> usize {
        let threads = self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        threads.min(buckets).max(1)
    }

    /// Trace every primary ray of `camera` and accumulate into its film.
    ///
    /// On failure the film is left untouched.
    pub fn render(&self, camera: &mut Camera) -> RenderResult<RenderSummary> {
        let start = Instant::now();

        let bucket_size = if self.bucket_size == 0 {
            DEFAULT_BUCKET_SIZE
        } else {
            self.bucket_size
        };
        let buckets = generate_buckets(camera.film_width(), camera.film_height(), bucket_size);
        if buckets.is_empty() {
            return Err(RenderError::EmptyFilm);
        }

        let workers = self.worker_count(buckets.len());
        let partitions = partition(&buckets, workers);
        for (worker, part) in partitions.iter().enumerate() {
            log::debug!(
                "worker {}: {} buckets, {} pixels",
                worker,
                part.len(),
                part.iter().map(|b| b.pixel_count() as u64).sum::<u64>()
            );
        }

        log::info!(
            "Rendering {}x{} film at {} spp: {} buckets on {} workers",
            camera.film_width(),
            camera.film_height(),
            camera.samples_per_pixel(),
            buckets.len(),
            workers
        );

        let pool = build_pool(workers)?;
        let tracer = Tracer::new(self.scene, self.accel, self.trace);
        let view: &Camera = camera;
        let seed = self.seed;
        let outputs = execute(&pool, &partitions, |_, part| trace_partition(&tracer, view, part, seed))?;

        let mut stats = TraceStats::default();
        let mut primary_rays = 0;
        let film = camera.film_mut();
        for output in &outputs {
            for tile in &output.tiles {
                film.commit(tile);
            }
            stats.merge(&output.stats);
            primary_rays += output.primary_rays;
        }

        let summary = RenderSummary {
            rays_traced: stats.rays,
            shadow_rays: stats.shadow_rays,
            primary_rays,
            workers,
            elapsed: start.elapsed(),
        };

        log::info!(
            "Traced {} rays ({} primary, {} shadow) in {:.2?}",
            summary.rays_traced,
            summary.primary_rays,
            summary.shadow_rays,
            summary.elapsed
        );

        Ok(summary)
    }
}

/// Build and render `job`, resolving resource paths against `base_dir`.
pub fn render_job(job: &RenderJob, base_dir: Option<&Path>) -> RenderResult<(RasterImage, RenderSummary)> {
    let scene = Scene::from_description(&job.scene, base_dir);
    let accel = acceleration::build(job.settings.acceleration, scene.shared_surfaces());
    let mut camera = Camera::new(&job.camera);

    let summary = TracingCoordinator::new(&scene, accel.as_ref(), &job.settings).render(&mut camera)?;
    let image = camera.rasterize(job.settings.output_width, job.settings.output_height)?;
    Ok((image, summary))
}

fn build_pool(workers: usize) -> RenderResult<ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("easyray-worker-{}", i))
        .build()?;
    Ok(pool)
}

/// Run `work` once per partition on `pool`, turning a panic in any worker
/// into an error naming that worker.
fn execute<T, F>(pool: &ThreadPool, partitions: &[Vec<Bucket>], work: F) -> RenderResult<Vec<T>>
where
    T: Send,
    F: Fn(usize, &[Bucket]) -> T + Sync,
{
    let outcomes: Vec<Result<T, String>> = pool.install(|| {
        partitions
            .par_iter()
            .enumerate()
            .map(|(worker, part)| {
                panic::catch_unwind(AssertUnwindSafe(|| work(worker, part))).map_err(panic_message)
            })
            .collect()
    });

    let mut results = Vec::with_capacity(outcomes.len());
    let mut first_failure = None;
    for (worker, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(value) => results.push(value),
            Err(message) => {
                log::error!("worker {} panicked: {}", worker, message);
                first_failure.get_or_insert(RenderError::WorkerPanicked { worker, message });
            }
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(results),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn trace_partition(tracer: &Tracer<'_>, camera: &Camera, buckets: &[Bucket], seed: u64) -> WorkerOutput {
    let mut stats = TraceStats::default();
    let mut primary_rays = 0;
    let film_width = camera.film_width() as u64;

    let tiles = buckets
        .iter()
        .map(|bucket| {
            let mut tile = FilmTile::new(*bucket);
            for pixel in bucket.pixels() {
                let pixel_index = pixel.y as u64 * film_width + pixel.x as u64;
                let mut rng = StdRng::seed_from_u64(sample_seed(seed, pixel_index, 0));
                let rays = camera.pixel_rays(pixel, &mut rng);
                primary_rays += rays.len() as u64;

                for (sample, ray) in rays.iter().enumerate() {
                    let mut rng = StdRng::seed_from_u64(sample_seed(seed, pixel_index, sample as u64 + 1));
                    tile.add(pixel, tracer.trace(ray, &mut rng, &mut stats));
                }
            }
            tile
        })
        .collect();

    WorkerOutput {
        tiles,
        stats,
        primary_rays,
    }
}

/// Seed for one sample stream, independent of which worker traces it.
fn sample_seed(seed: u64, pixel: u64, sample: u64) -> u64 {
    // splitmix64 finalizer
    let mut z = seed
        ^ pixel.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ sample.wrapping_mul(0xD1B5_4A32_D192_ED03);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use easyray_core::{AccelerationChoice, RenderJob};
use easyray_renderer::{render_job, RasterImage};

/// Render a JSON scene description to a PNG.
#[derive(Parser, Debug)]
#[command(name = "easyray")]
#[command(about = "A recursive CPU ray tracer")]
struct Args {
    /// Render job (settings, camera and scene) as JSON
    job: PathBuf,

    /// Output image path; overrides settings.output_path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker thread count; defaults to the available parallelism
    #[arg(short, long)]
    threads: Option<usize>,

    /// Seed for every random sample stream
    #[arg(long)]
    seed: Option<u64>,

    /// "FreeObjects" or "RegularGrid:<density>"
    #[arg(long)]
    acceleration: Option<AccelerationChoice>,
}

impl Args {
    fn apply(&self, job: &mut RenderJob) {
        if let Some(output) = &self.output {
            job.settings.output_path = output.clone();
        }
        if let Some(threads) = self.threads {
            job.settings.threads = Some(threads);
        }
        if let Some(seed) = self.seed {
            job.settings.seed = seed;
        }
        if let Some(acceleration) = self.acceleration {
            job.settings.acceleration = acceleration;
        }
    }
}

fn save_png(image: RasterImage, path: &std::path::Path) -> Result<()> {
    let (width, height) = (image.width, image.height);
    let buffer = image::RgbImage::from_raw(width, height, image.into_raw())
        .context("raster size does not match its dimensions")?;
    buffer
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let mut job = RenderJob::load(&args.job)
        .with_context(|| format!("failed to load render job {}", args.job.display()))?;
    args.apply(&mut job);
    job.validate().context("invalid render job")?;

    log::info!(
        "Rendering {} with {} at {}x{}",
        args.job.display(),
        job.settings.acceleration,
        job.settings.output_width,
        job.settings.output_height
    );

    let base_dir = RenderJob::base_dir(&args.job);
    let (image, summary) = render_job(&job, Some(&base_dir)).context("render failed")?;

    save_png(image, &job.settings.output_path)?;
    log::info!(
        "Wrote {} ({} rays on {} workers in {:.2?})",
        job.settings.output_path.display(),
        summary.rays_traced,
        summary.workers,
        summary.elapsed
    );

    Ok(())
}

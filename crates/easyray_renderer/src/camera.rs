//! Camera for primary ray generation, plus the film it exposes.

use easyray_core::{CameraSettings, RenderMode, SampleStrategy};
use easyray_math::{Color, Frame, Pixel, Ray, Vec3};
use rand::Rng;

use crate::bucket::FilmTile;
use crate::error::{RenderError, RenderResult};
use crate::sampler::{self, Sample};

/// Accumulation buffer at film resolution, row-major.
///
/// Every sample adds `color / samples_per_pixel`, so a fully traced pixel
/// holds the average of its samples.
#[derive(Debug, Clone)]
pub struct Film {
    width: u32,
    height: u32,
    scale: f64,
    pixels: Vec<Color>,
}

impl Film {
    pub fn new(width: u32, height: u32, samples_per_pixel: usize) -> Self {
        Self {
            width,
            height,
            scale: 1.0 / samples_per_pixel.max(1) as f64,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn offset(&self, pixel: Pixel) -> usize {
        pixel.y as usize * self.width as usize + pixel.x as usize
    }

    pub fn get(&self, pixel: Pixel) -> Color {
        self.pixels[self.offset(pixel)]
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Add one sample's color to `pixel`.
    pub fn accumulate(&mut self, pixel: Pixel, color: Color) {
        let offset = self.offset(pixel);
        self.pixels[offset] += color * self.scale;
    }

    /// Add a worker's raw sample sums for one bucket.
    pub fn commit(&mut self, tile: &FilmTile) {
        let bucket = tile.bucket;
        for (i, color) in tile.pixels.iter().enumerate() {
            let i = i as u32;
            let pixel = Pixel::new(bucket.x + i % bucket.width, bucket.y + i / bucket.width);
            self.accumulate(pixel, *color);
        }
    }

    /// Nearest-neighbour resample to `width`×`height` RGB bytes.
    pub fn rasterize(&self, width: u32, height: u32) -> RenderResult<RasterImage> {
        if self.width == 0 || self.height == 0 || width == 0 || height == 0 {
            return Err(RenderError::EmptyFilm);
        }

        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            let src_y = (y as u64 * self.height as u64 / height as u64) as u32;
            for x in 0..width {
                let src_x = (x as u64 * self.width as u64 / width as u64) as u32;
                let color = self.get(Pixel::new(src_x, src_y));
                data.extend_from_slice(&color_to_rgb(color));
            }
        }

        Ok(RasterImage { width, height, data })
    }
}

/// Quantize a color to 8 bits per channel after clamping to [0, 1].
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let quantize = |c: f64| {
        let c = if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
        (c * 255.0 + 0.5) as u8
    };
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Final 8-bit RGB image handed to the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB triples
    pub data: Vec<u8>,
}

impl RasterImage {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

/// Camera generating primary rays for every film pixel.
#[derive(Debug, Clone)]
pub struct Camera {
    eye: Vec3,
    /// Viewing direction
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    mode: RenderMode,
    pixel_width: f64,
    half_fov_tan: f64,
    aspect: f64,
    sample_strategy: SampleStrategy,
    sample_count: u32,
    film: Film,
}

impl Camera {
    pub fn new(settings: &CameraSettings) -> Self {
        let forward = (settings.lookat - settings.eye).normalize_or_zero();
        let right = forward
            .cross(settings.up)
            .try_normalize()
            .unwrap_or_else(|| Frame::around(forward).u);
        let up = right.cross(forward);

        let samples_per_pixel =
            sampler::effective_count(settings.sample_strategy, settings.sample_count);
        let aspect = if settings.film_height > 0 {
            settings.film_width as f64 / settings.film_height as f64
        } else {
            1.0
        };

        Self {
            eye: settings.eye,
            forward,
            right,
            up,
            mode: settings.mode,
            pixel_width: settings.pixel_width,
            half_fov_tan: (settings.fov.to_radians() / 2.0).tan(),
            aspect,
            sample_strategy: settings.sample_strategy,
            sample_count: settings.sample_count,
            film: Film::new(settings.film_width, settings.film_height, samples_per_pixel),
        }
    }

    /// (forward, right, up) basis vectors.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.forward, self.right, self.up)
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn film_width(&self) -> u32 {
        self.film.width
    }

    pub fn film_height(&self) -> u32 {
        self.film.height
    }

    /// Rays traced for every pixel.
    pub fn samples_per_pixel(&self) -> usize {
        sampler::effective_count(self.sample_strategy, self.sample_count)
    }

    /// The ray through `pixel` at sub-pixel offset `sample`.
    pub fn primary_ray(&self, pixel: Pixel, [s0, s1]: Sample) -> Ray {
        let px = (pixel.x as f64 + s0) / self.film.width as f64;
        let py = (pixel.y as f64 + s1) / self.film.height as f64;
        // Screen coordinates in [-1, 1], y up
        let sx = 2.0 * px - 1.0;
        let sy = 1.0 - 2.0 * py;

        match self.mode {
            RenderMode::Perspective => {
                let scale = self.half_fov_tan * self.pixel_width;
                let dir = self.right * (sx * self.aspect * scale)
                    + self.up * (sy * scale)
                    + self.forward;
                Ray::primary(self.eye, dir, pixel)
            }
            RenderMode::Orthographic => {
                let origin = self.eye
                    + self.right * (sx * self.aspect * self.pixel_width)
                    + self.up * (sy * self.pixel_width);
                Ray::primary(origin, self.forward, pixel)
            }
        }
    }

    /// All sample rays for `pixel`.
    pub fn pixel_rays<R: Rng + ?Sized>(&self, pixel: Pixel, rng: &mut R) -> Vec<Ray> {
        sampler::samples(self.sample_strategy, self.sample_count, rng)
            .into_iter()
            .map(|sample| self.primary_ray(pixel, sample))
            .collect()
    }

    /// Every primary ray of the film, pixel by pixel in row-major order.
    pub fn primary_rays<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Ray> {
        let mut rays = Vec::with_capacity(
            self.film.width as usize * self.film.height as usize * self.samples_per_pixel(),
        );
        for y in 0..self.film.height {
            for x in 0..self.film.width {
                rays.extend(self.pixel_rays(Pixel::new(x, y), rng));
            }
        }
        rays
    }

    /// Add one sample's color to `pixel`.
    pub fn accumulate(&mut self, color: Color, pixel: Pixel) {
        self.film.accumulate(pixel, color);
    }

    pub fn film(&self) -> &Film {
        &self.film
    }

    pub fn film_mut(&mut self) -> &mut Film {
        &mut self.film
    }

    /// Resample the film to the output resolution.
    pub fn rasterize(&self, width: u32, height: u32) -> RenderResult<RasterImage> {
        self.film.rasterize(width, height)
    }
}

//! Bucket-based partitioning of the film.
//!
//! Divides the film into tiles (buckets) that are traced independently.
//! Every pixel belongs to exactly one bucket and every bucket to exactly one
//! worker, so workers never write the same pixel.

use easyray_math::{Color, Pixel};

/// A rectangular region of the film.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Pixels of the bucket in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| Pixel::new(x, y)))
    }

    pub fn contains(&self, pixel: Pixel) -> bool {
        pixel.x >= self.x
            && pixel.x < self.x + self.width
            && pixel.y >= self.y
            && pixel.y < self.y + self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 16;

/// Generate buckets for a film, sorted in spiral order from center.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();
    let mut index = 0;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from the film center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f64 / 2.0;
    let center_y = height as f64 / 2.0;
    let distance = |b: &Bucket| {
        let bx = b.x as f64 + b.width as f64 / 2.0;
        let by = b.y as f64 + b.height as f64 / 2.0;
        (bx - center_x).powi(2) + (by - center_y).powi(2)
    };

    // Stable sort keeps row-major order among equidistant buckets
    buckets.sort_by(|a, b| {
        distance(a)
            .partial_cmp(&distance(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Deal `buckets` round-robin onto `workers` partitions.
///
/// Always returns exactly `workers.max(1)` partitions; some may be empty
/// when there are more workers than buckets.
pub fn partition(buckets: &[Bucket], workers: usize) -> Vec<Vec<Bucket>> {
    let workers = workers.max(1);
    let mut partitions = vec![Vec::new(); workers];
    for (i, bucket) in buckets.iter().enumerate() {
        partitions[i % workers].push(*bucket);
    }
    partitions
}

/// Colors accumulated for one bucket, in row-major order.
#[derive(Debug, Clone)]
pub struct FilmTile {
    pub bucket: Bucket,
    pub pixels: Vec<Color>,
}

impl FilmTile {
    /// A black tile covering `bucket`.
    pub fn new(bucket: Bucket) -> Self {
        Self {
            bucket,
            pixels: vec![Color::ZERO; bucket.pixel_count() as usize],
        }
    }

    /// Add `color` to the film pixel `pixel`, which must lie in the bucket.
    pub fn add(&mut self, pixel: Pixel, color: Color) {
        debug_assert!(self.bucket.contains(pixel));
        let local_x = pixel.x - self.bucket.x;
        let local_y = pixel.y - self.bucket.y;
        self.pixels[(local_y * self.bucket.width + local_x) as usize] += color;
    }
}

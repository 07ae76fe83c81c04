//! 2D sample generation in the unit square.
//!
//! Every call takes the caller's random source, so concurrent workers never
//! share generator state.

use easyray_core::SampleStrategy;
use rand::seq::SliceRandom;
use rand::Rng;

/// A sample point in [0, 1)².
pub type Sample = [f64; 2];

/// Side of the square sub-grid used by the stratified strategies.
fn grid_side(count: u32) -> usize {
    ((count.max(1) as f64).sqrt().floor() as usize).max(1)
}

/// Number of samples `samples` actually produces for a requested count.
pub fn effective_count(strategy: SampleStrategy, count: u32) -> usize {
    match strategy {
        SampleStrategy::Uniform | SampleStrategy::MultiJitter => {
            let k = grid_side(count);
            k * k
        }
        SampleStrategy::Random => count.max(1) as usize,
        SampleStrategy::Single => 1,
    }
}

/// Generate `count` sample points under `strategy`.
///
/// Stratified strategies round down to the nearest perfect square; see
/// [`effective_count`].
pub fn samples<R: Rng + ?Sized>(strategy: SampleStrategy, count: u32, rng: &mut R) -> Vec<Sample> {
    match strategy {
        SampleStrategy::Uniform => uniform(count),
        SampleStrategy::Random => random(count, rng),
        SampleStrategy::MultiJitter => multi_jitter(count, rng),
        SampleStrategy::Single => vec![[0.5, 0.5]],
    }
}

/// Regular k×k grid, spaced 1/(k+1) so no point touches the boundary.
fn uniform(count: u32) -> Vec<Sample> {
    let k = grid_side(count);
    let spacing = 1.0 / (k as f64 + 1.0);

    let mut out = Vec::with_capacity(k * k);
    for i in 1..=k {
        for j in 1..=k {
            out.push([i as f64 * spacing, j as f64 * spacing]);
        }
    }
    out
}

fn random<R: Rng + ?Sized>(count: u32, rng: &mut R) -> Vec<Sample> {
    (0..count.max(1))
        .map(|_| [rng.gen::<f64>(), rng.gen::<f64>()])
        .collect()
}

/// Multi-jittered sampling over a k×k coarse grid of N = k² fine cells.
///
/// Starts from the canonical arrangement (coarse cell (cx, cy) takes fine
/// column cx·k + cy and fine row cy·k + cx), then shuffles the fine
/// offsets within each coarse column and each coarse row. Both shuffles
/// keep one sample per coarse cell and one per fine row and fine column.
fn multi_jitter<R: Rng + ?Sized>(count: u32, rng: &mut R) -> Vec<Sample> {
    let k = grid_side(count);
    let n = (k * k) as f64;

    // sub_x[cx][cy]: fine x offset inside coarse column cx
    let mut sub_x: Vec<Vec<usize>> = (0..k).map(|_| (0..k).collect()).collect();
    // sub_y[cy][cx]: fine y offset inside coarse row cy
    let mut sub_y: Vec<Vec<usize>> = (0..k).map(|_| (0..k).collect()).collect();

    for column in &mut sub_x {
        column.shuffle(rng);
    }
    for row in &mut sub_y {
        row.shuffle(rng);
    }

    let mut out = Vec::with_capacity(k * k);
    for cx in 0..k {
        for cy in 0..k {
            let fx = cx * k + sub_x[cx][cy];
            let fy = cy * k + sub_y[cy][cx];
            let x = (fx as f64 + rng.gen::<f64>()) / n;
            let y = (fy as f64 + rng.gen::<f64>()) / n;
            out.push([x, y]);
        }
    }
    out
}

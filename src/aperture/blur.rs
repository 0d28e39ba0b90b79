// src/aperture/blur.rs
// Separable Gaussian blur with clamped edges

use super::ScalarGrid;

/// Kernel radius for `sigma`; three standard deviations, at least one texel
#[inline]
pub fn kernel_radius(sigma: f32) -> f32 {
    (sigma * 3.0).ceil().max(1.0)
}

fn gaussian_kernel(sigma: f32, max_radius: usize) -> Vec<f32> {
    let radius = kernel_radius(sigma).min(max_radius as f32) as i64;
    let inv = 1.0 / (2.0 * sigma * sigma);
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-(i as f32).powi(2) * inv).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    kernel
}

/// Blur `grid` in place `passes` times; no-op for `passes == 0` or a non-positive sigma.
///
/// The kernel never reaches further than the grid is wide.
pub fn gaussian_blur(grid: &mut ScalarGrid, sigma: f32, passes: u32) {
    if passes == 0 || sigma.is_nan() || sigma <= 0.0 || grid.resolution() < 2 {
        return;
    }
    let n = grid.resolution();
    let kernel = gaussian_kernel(sigma, n);
    let radius = (kernel.len() / 2) as isize;
    let mut scratch = vec![0.0f32; n * n];

    for _ in 0..passes {
        let src = grid.values_mut();
        // horizontal into scratch
        for y in 0..n {
            for x in 0..n {
                let mut acc = 0.0;
                for (k, w) in kernel.iter().enumerate() {
                    let sx = (x as isize + k as isize - radius).clamp(0, n as isize - 1) as usize;
                    acc += src[y * n + sx] * w;
                }
                scratch[y * n + x] = acc;
            }
        }
        // vertical back into the grid
        for y in 0..n {
            for x in 0..n {
                let mut acc = 0.0;
                for (k, w) in kernel.iter().enumerate() {
                    let sy = (y as isize + k as isize - radius).clamp(0, n as isize - 1) as usize;
                    acc += scratch[sy * n + x] * w;
                }
                src[y * n + x] = acc;
            }
        }
    }
}

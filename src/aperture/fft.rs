// src/aperture/fft.rs
// In-place radix-2 2D FFT: row butterflies, then column butterflies via transpose
// RELEVANT FILES: src/aperture/spectrum.rs, src/config/mod.rs

use rayon::prelude::*;
use std::f64::consts::PI;

use super::ScalarGrid;
use crate::error::{FlareError, FlareResult};

/// Square complex signal with separate real and imaginary planes
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexGrid {
    resolution: usize,
    pub re: Vec<f64>,
    pub im: Vec<f64>,
}

impl ComplexGrid {
    /// Real channel from `grid`, imaginary channel zero
    pub fn from_real(grid: &ScalarGrid) -> Self {
        Self {
            resolution: grid.resolution(),
            re: grid.values().iter().map(|&v| v as f64).collect(),
            im: vec![0.0; grid.values().len()],
        }
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// `sqrt(re^2 + im^2)` per element
    pub fn magnitude(&self) -> Vec<f64> {
        self.re
            .iter()
            .zip(&self.im)
            .map(|(r, i)| r.hypot(*i))
            .collect()
    }

    fn check_len(&self) -> FlareResult<()> {
        let expected = self.resolution * self.resolution;
        for len in [self.re.len(), self.im.len()] {
            if len != expected {
                return Err(FlareError::GridSizeMismatch {
                    resolution: self.resolution,
                    len,
                });
            }
        }
        Ok(())
    }
}

/// Forward 2D discrete Fourier transform, in place
pub trait Transform2D: Send + Sync {
    fn forward(&self, signal: &mut ComplexGrid) -> FlareResult<()>;
}

/// Iterative Cooley-Tukey transform; rows run on the rayon pool when `parallel` is set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Radix2Fft {
    pub parallel: bool,
}

impl Radix2Fft {
    pub const fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    fn transform_rows(&self, re: &mut [f64], im: &mut [f64], n: usize, twiddles: &Twiddles) {
        if self.parallel {
            re.par_chunks_mut(n)
                .zip(im.par_chunks_mut(n))
                .for_each(|(r, i)| fft_in_place(r, i, twiddles));
        } else {
            re.chunks_mut(n)
                .zip(im.chunks_mut(n))
                .for_each(|(r, i)| fft_in_place(r, i, twiddles));
        }
    }
}

impl Transform2D for Radix2Fft {
    fn forward(&self, signal: &mut ComplexGrid) -> FlareResult<()> {
        let n = signal.resolution;
        if !n.is_power_of_two() {
            return Err(FlareError::NonPowerOfTwoResolution(n));
        }
        signal.check_len()?;

        let twiddles = Twiddles::new(n);

        // row pass
        self.transform_rows(&mut signal.re, &mut signal.im, n, &twiddles);

        // column pass on the transposed intermediates
        transpose(&mut signal.re, n);
        transpose(&mut signal.im, n);
        self.transform_rows(&mut signal.re, &mut signal.im, n, &twiddles);
        transpose(&mut signal.re, n);
        transpose(&mut signal.im, n);

        Ok(())
    }
}

/// `exp(-2 pi i k / n)` for `k < n / 2`
struct Twiddles {
    cos: Vec<f64>,
    sin: Vec<f64>,
}

impl Twiddles {
    fn new(n: usize) -> Self {
        let half = n / 2;
        let (cos, sin) = (0..half)
            .map(|k| {
                let angle = -2.0 * PI * k as f64 / n as f64;
                (angle.cos(), angle.sin())
            })
            .unzip();
        Self { cos, sin }
    }
}

/// One-dimensional transform of a power-of-two length line
fn fft_in_place(re: &mut [f64], im: &mut [f64], twiddles: &Twiddles) {
    let n = re.len();
    if n < 2 {
        return;
    }

    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if j > i {
            re.swap(i, j);
            im.swap(i, j);
        }
    }

    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let stride = n / size;
        for start in (0..n).step_by(size) {
            for k in 0..half {
                let (wr, wi) = (twiddles.cos[k * stride], twiddles.sin[k * stride]);
                let a = start + k;
                let b = a + half;
                let tr = re[b] * wr - im[b] * wi;
                let ti = re[b] * wi + im[b] * wr;
                re[b] = re[a] - tr;
                im[b] = im[a] - ti;
                re[a] += tr;
                im[a] += ti;
            }
        }
        size *= 2;
    }
}

fn transpose(data: &mut [f64], n: usize) {
    for y in 0..n {
        for x in (y + 1)..n {
            data.swap(y * n + x, x * n + y);
        }
    }
}

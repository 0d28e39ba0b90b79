// src/photometry/transmittance.rs
// Angle -> RGB transmission response of the coated lens stack, used to tint the starburst
// RELEVANT FILES: src/photometry/fresnel.rs, src/projector/project.rs

use glam::DVec3;
use std::f64::consts::FRAC_PI_2;

use super::fresnel::{reflectance, AntiReflectiveCoating};
use super::PhotometryConfig;
use crate::optics::RayTransferSolver;

/// Number of angle samples between 0 and pi/2
pub const TRANSMITTANCE_SAMPLES: usize = 64;

/// Normalised per-channel transmission for incidence angles in `[0, pi/2]`
#[derive(Clone, Debug, PartialEq)]
pub struct TransmittanceResponse {
    samples: Vec<[f32; 3]>,
}

impl TransmittanceResponse {
    /// Trace a zero-height ray through every refracting surface and accumulate
    /// how much of each sample wavelength survives the coatings.
    ///
    /// The ray angle is clamped to `transmittance_max_angle` before every surface.
    pub fn compute(solver: &RayTransferSolver, config: &PhotometryConfig) -> Self {
        let coating = AntiReflectiveCoating::new(config.coating_wavelength_nm);
        let aperture = solver.aperture_index();
        let [red, green, blue] = config.wavelengths_nm;
        let limit = config.transmittance_max_angle;

        let samples = (0..TRANSMITTANCE_SAMPLES)
            .map(|i| {
                let mut angle = i as f64 / (TRANSMITTANCE_SAMPLES - 1) as f64 * FRAC_PI_2;
                let mut height = 0.0;
                let mut transmitted = DVec3::ONE;

                for (index, t) in solver.transforms().iter().enumerate() {
                    if index == aperture {
                        continue;
                    }
                    angle = angle.clamp(-limit, limit);
                    let (n1, n3) = (t.n_before, t.n_after);
                    let d = coating.thickness(n1);
                    let n2 = AntiReflectiveCoating::layer_index(n1, n3);
                    let reflected = DVec3::new(
                        reflectance(red, d, angle, n1, n2, n3),
                        reflectance(green, d, angle, n1, n2, n3),
                        reflectance(blue, d, angle, n1, n2, n3),
                    );
                    transmitted *= DVec3::ONE - reflected;
                    (height, angle) = t.refraction.transform(height, angle);
                }

                normalize_channels(transmitted)
            })
            .collect();

        Self { samples }
    }

    pub fn samples(&self) -> &[[f32; 3]] {
        &self.samples
    }

    /// Linearly interpolated response for an angle in radians
    pub fn sample(&self, angle: f64) -> [f32; 3] {
        let last = self.samples.len().saturating_sub(1);
        if last == 0 {
            return self.samples.first().copied().unwrap_or([1.0; 3]);
        }
        let position = (angle.abs().min(FRAC_PI_2) / FRAC_PI_2) * last as f64;
        let lo = (position.floor() as usize).min(last);
        let hi = (lo + 1).min(last);
        let t = (position - lo as f64) as f32;
        let (a, b) = (self.samples[lo], self.samples[hi]);
        [
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
        ]
    }
}

/// Stretch the channels so the weakest maps to 0 and the strongest to 1.
fn normalize_channels(c: DVec3) -> [f32; 3] {
    let min = c.min_element();
    let max = c.max_element();
    if !(max - min).is_finite() || max - min < 1e-12 {
        return [1.0; 3];
    }
    let n = (c - DVec3::splat(min)) / (max - min);
    [n.x as f32, n.y as f32, n.z as f32]
}

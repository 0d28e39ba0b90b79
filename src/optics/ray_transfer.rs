// src/optics/ray_transfer.rs
// Paraxial ray transfer (ABCD) matrices per interface and whole-system composition
// RELEVANT FILES: src/optics/lens.rs, src/optics/ghosts.rs

use std::ops::{Mul, Range};

use glam::{DMat2, DVec2};
use serde::{Deserialize, Serialize};

use super::lens::{LensAssembly, Surface, REFRACTIVE_INDEX_AIR};
use crate::error::FlareResult;

/// 2x2 map from a ray state `(height, angle)` to the ray state further down the axis.
///
/// Row/column accessors follow the optics convention `[[A, B], [C, D]]`; storage is
/// glam's column-major `DMat2`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RayTransferMatrix(DMat2);

impl Default for RayTransferMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl RayTransferMatrix {
    pub const IDENTITY: Self = Self(DMat2::IDENTITY);

    /// Build from the row-major `[[a, b], [c, d]]` layout
    #[inline]
    pub const fn from_rows(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self(DMat2::from_cols(DVec2::new(a, c), DVec2::new(b, d)))
    }

    /// Free propagation: `height += distance * angle`
    #[inline]
    pub const fn translation(distance: f64) -> Self {
        Self::from_rows(1.0, distance, 0.0, 1.0)
    }

    #[inline]
    pub fn a(&self) -> f64 {
        self.0.x_axis.x
    }

    #[inline]
    pub fn b(&self) -> f64 {
        self.0.y_axis.x
    }

    #[inline]
    pub fn c(&self) -> f64 {
        self.0.x_axis.y
    }

    #[inline]
    pub fn d(&self) -> f64 {
        self.0.y_axis.y
    }

    #[inline]
    pub fn as_dmat2(&self) -> DMat2 {
        self.0
    }

    pub fn determinant(&self) -> f64 {
        self.0.determinant()
    }

    /// Apply to a ray given as `(height, angle)`
    #[inline]
    pub fn transform(&self, height: f64, angle: f64) -> (f64, f64) {
        let out = self.0 * DVec2::new(height, angle);
        (out.x, out.y)
    }

    /// Column-major single precision copy for GPU upload
    pub fn to_cols_array_f32(&self) -> [f32; 4] {
        self.0.to_cols_array().map(|v| v as f32)
    }
}

impl Mul for RayTransferMatrix {
    type Output = RayTransferMatrix;

    #[inline]
    fn mul(self, rhs: RayTransferMatrix) -> RayTransferMatrix {
        RayTransferMatrix(self.0 * rhs.0)
    }
}

/// All matrices describing one interface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterfaceTransforms {
    /// Propagation to the next interface (its own inverse direction-wise)
    pub translation: RayTransferMatrix,
    pub refraction: RayTransferMatrix,
    /// Refraction for light crossing the surface in the opposite direction
    pub refraction_inverse: RayTransferMatrix,
    pub reflection: RayTransferMatrix,
    pub reflection_inverse: RayTransferMatrix,
    /// Medium index in front of the surface
    pub n_before: f64,
    /// Medium index behind the surface
    pub n_after: f64,
}

impl InterfaceTransforms {
    fn build(distance_to_next: f64, surface: Surface, n_before: f64, n_after: f64) -> Self {
        let eta = n_before / n_after;
        let eta_inv = n_after / n_before;

        let (refraction, refraction_inverse, reflection, reflection_inverse) = match surface {
            Surface::Flat => (
                RayTransferMatrix::from_rows(1.0, 0.0, 0.0, eta),
                RayTransferMatrix::from_rows(1.0, 0.0, 0.0, eta_inv),
                RayTransferMatrix::IDENTITY,
                RayTransferMatrix::IDENTITY,
            ),
            Surface::Curved { radius } => (
                RayTransferMatrix::from_rows(
                    1.0,
                    0.0,
                    (n_before - n_after) / (radius * n_after),
                    eta,
                ),
                RayTransferMatrix::from_rows(
                    1.0,
                    0.0,
                    (n_after - n_before) / (-radius * n_before),
                    eta_inv,
                ),
                RayTransferMatrix::from_rows(1.0, 0.0, 2.0 / radius, 1.0),
                RayTransferMatrix::from_rows(1.0, 0.0, 2.0 / -radius, 1.0),
            ),
        };

        Self {
            translation: RayTransferMatrix::translation(distance_to_next),
            refraction,
            refraction_inverse,
            reflection,
            reflection_inverse,
            n_before,
            n_after,
        }
    }

    /// Refract through the surface, then travel to the next one
    #[inline]
    pub fn forward(&self) -> RayTransferMatrix {
        self.translation * self.refraction
    }

    /// Travel back across the gap, then refract backwards through the surface
    #[inline]
    pub fn backward(&self) -> RayTransferMatrix {
        self.refraction_inverse * self.translation
    }

    /// Cross the gap back to this surface, reflect off it, cross the gap again
    #[inline]
    pub fn bounce_inverse(&self) -> RayTransferMatrix {
        self.translation * self.reflection_inverse * self.translation
    }
}

/// Whole-system transforms split at the aperture stop
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LensSystem {
    pub entrance_to_aperture: RayTransferMatrix,
    pub aperture_to_sensor: RayTransferMatrix,
}

impl LensSystem {
    pub fn entrance_to_sensor(&self) -> RayTransferMatrix {
        self.aperture_to_sensor * self.entrance_to_aperture
    }

    /// Radius of the entrance pupil for an aperture of the given height
    pub fn entrance_pupil_radius(&self, aperture_height: f64) -> f64 {
        aperture_height / self.entrance_to_aperture.a()
    }
}

/// Per-interface matrices for a validated assembly
#[derive(Clone, Debug, PartialEq)]
pub struct RayTransferSolver {
    entrance: RayTransferMatrix,
    transforms: Vec<InterfaceTransforms>,
    aperture_index: usize,
}

impl RayTransferSolver {
    /// Validate the assembly and derive every interface's matrices.
    pub fn new(assembly: &LensAssembly) -> FlareResult<Self> {
        assembly.validate()?;

        let interfaces = assembly.interfaces();
        let mut transforms = Vec::with_capacity(interfaces.len());
        let mut n_before = REFRACTIVE_INDEX_AIR;
        for interface in &interfaces {
            let n_after = interface.refractive_index();
            transforms.push(InterfaceTransforms::build(
                interface.distance_to_next,
                interface.surface,
                n_before,
                n_after,
            ));
            n_before = n_after;
        }

        Ok(Self {
            entrance: RayTransferMatrix::translation(assembly.entrance_distance),
            transforms,
            aperture_index: assembly.aperture_index(),
        })
    }

    /// Translation from the system entrance to the first interface
    #[inline]
    pub fn entrance(&self) -> RayTransferMatrix {
        self.entrance
    }

    #[inline]
    pub fn transforms(&self) -> &[InterfaceTransforms] {
        &self.transforms
    }

    #[inline]
    pub fn aperture_index(&self) -> usize {
        self.aperture_index
    }

    #[inline]
    pub fn interface_count(&self) -> usize {
        self.transforms.len()
    }

    /// Left-multiply the forward step of every interface in `range` onto `seed`.
    pub fn propagate_forward(
        &self,
        range: Range<usize>,
        seed: RayTransferMatrix,
    ) -> RayTransferMatrix {
        self.transforms[range]
            .iter()
            .fold(seed, |acc, t| t.forward() * acc)
    }

    /// Left-multiply backward steps, walking `range` from its end towards its start.
    pub fn propagate_backward(
        &self,
        range: Range<usize>,
        seed: RayTransferMatrix,
    ) -> RayTransferMatrix {
        self.transforms[range]
            .iter()
            .rev()
            .fold(seed, |acc, t| t.backward() * acc)
    }

    pub fn lens_system(&self) -> LensSystem {
        let entrance_to_aperture = self.propagate_forward(0..self.aperture_index, self.entrance);
        let aperture_to_sensor = self.aperture_to_sensor();
        LensSystem {
            entrance_to_aperture,
            aperture_to_sensor,
        }
    }

    /// Aperture (inclusive) through the last interface
    pub fn aperture_to_sensor(&self) -> RayTransferMatrix {
        self.propagate_forward(
            self.aperture_index..self.transforms.len(),
            RayTransferMatrix::IDENTITY,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optics::lens::{LensInterface, Medium};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_translation_layout() {
        let t = RayTransferMatrix::translation(4.0);
        assert_eq!((t.a(), t.b(), t.c(), t.d()), (1.0, 4.0, 0.0, 1.0));
        let (h, u) = t.transform(1.0, 0.5);
        assert!(approx(h, 3.0));
        assert!(approx(u, 0.5));
    }

    #[test]
    fn test_composition_order() {
        // translate 2 then translate 3 is a translation by 5
        let m = RayTransferMatrix::translation(3.0) * RayTransferMatrix::translation(2.0);
        assert!(approx(m.b(), 5.0));

        let lens = RayTransferMatrix::from_rows(1.0, 0.0, -0.5, 1.0);
        let m = RayTransferMatrix::translation(2.0) * lens;
        // lens first: angle picks up -0.5 * height, then the translation applies it
        let (h, u) = m.transform(1.0, 0.0);
        assert!(approx(u, -0.5));
        assert!(approx(h, 0.0));
    }

    #[test]
    fn test_flat_refraction_scales_angle() {
        let t = InterfaceTransforms::build(1.0, Surface::Flat, 1.0, 1.5);
        assert!(approx(t.refraction.d(), 1.0 / 1.5));
        assert!(approx(t.refraction.c(), 0.0));
        assert!(approx(t.refraction_inverse.d(), 1.5));
        assert_eq!(t.reflection, RayTransferMatrix::IDENTITY);
        assert_eq!(t.reflection_inverse, RayTransferMatrix::IDENTITY);
    }

    #[test]
    fn test_curved_refraction_and_reflection() {
        let t = InterfaceTransforms::build(1.0, Surface::Curved { radius: 20.0 }, 1.0, 1.5);
        assert!(approx(t.refraction.c(), (1.0 - 1.5) / (20.0 * 1.5)));
        assert!(approx(t.refraction.d(), 1.0 / 1.5));
        assert!(approx(t.refraction_inverse.c(), (1.5 - 1.0) / (-20.0 * 1.0)));
        assert!(approx(t.reflection.c(), 2.0 / 20.0));
        assert!(approx(t.reflection_inverse.c(), -2.0 / 20.0));
    }

    #[test]
    fn test_refraction_determinant_is_index_ratio() {
        // det(R) = n_before / n_after for any refracting surface
        let t = InterfaceTransforms::build(0.0, Surface::Curved { radius: -35.0 }, 1.2, 1.7);
        assert!(approx(t.refraction.determinant(), 1.2 / 1.7));
    }

    #[test]
    fn test_stop_only_system_is_pure_translation() {
        let solver = RayTransferSolver::new(&LensAssembly::stop_only(7.5, 2.0)).unwrap();
        let system = solver.lens_system();
        assert_eq!(
            system.entrance_to_aperture,
            RayTransferMatrix::translation(7.5)
        );
        // the stop is air behind air: flat refraction by ~1, then the stop gap
        assert!(approx(system.aperture_to_sensor.b(), 2.0));
    }

    #[test]
    fn test_media_chain_through_stop() {
        let lens = LensAssembly::new(
            vec![LensInterface::flat(1.0, Medium::Glass { refractive_index: 1.5 })],
            vec![LensInterface::flat(1.0, Medium::Air)],
        );
        let solver = RayTransferSolver::new(&lens).unwrap();
        let t = solver.transforms();
        assert!(approx(t[0].n_before, REFRACTIVE_INDEX_AIR));
        assert!(approx(t[0].n_after, 1.5));
        assert!(approx(t[1].n_before, 1.5));
        assert!(approx(t[1].n_after, REFRACTIVE_INDEX_AIR));
    }
}

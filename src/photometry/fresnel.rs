//! Thin-film Fresnel reflectance for a single-layer anti-reflective coating
//!
//! Models a coating of index `n2` and thickness `d` separating media `n1` and
//! `n3`. Both polarisations are evaluated with the two-beam interference formula
//! and averaged, so the result describes unpolarised light.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Lowest index the coating material is allowed to take (MgF2)
pub const MIN_COATING_INDEX: f64 = 1.38;

/// Quarter-wave coating tuned for one design wavelength
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AntiReflectiveCoating {
    pub design_wavelength_nm: f64,
}

impl AntiReflectiveCoating {
    pub const fn new(design_wavelength_nm: f64) -> Self {
        Self {
            design_wavelength_nm,
        }
    }

    /// Physical thickness of a quarter-wave layer measured in the given medium
    #[inline]
    pub fn thickness(&self, medium_index: f64) -> f64 {
        self.design_wavelength_nm / 4.0 / medium_index
    }

    /// Coating index for a layer between `n1` and `n3`: the ideal `sqrt(n1 * n3)`,
    /// limited to what real coating materials reach.
    #[inline]
    pub fn layer_index(n1: f64, n3: f64) -> f64 {
        (n1 * n3).sqrt().max(MIN_COATING_INDEX)
    }
}

/// Refraction angle from Snell's law, with the sine clamped into the arcsine domain.
#[inline]
fn snell(n_from: f64, sin_from: f64, n_to: f64) -> f64 {
    (n_from * sin_from / n_to).clamp(-1.0, 1.0).asin()
}

/// Combine the amplitude coefficients of the two coating faces.
#[inline]
fn two_beam(r12: f64, r23: f64, cos_2beta: f64) -> f64 {
    let r12_2 = r12 * r12;
    let r23_2 = r23 * r23;
    let cross = 2.0 * r12 * r23 * cos_2beta;
    (r12_2 + r23_2 + cross) / (1.0 + r12_2 * r23_2 + cross)
}

/// Fraction of light reflected by a coated interface, in `[0, 1]`.
///
/// `angle` is the incidence angle in radians and must already be clamped by the
/// caller (see `PhotometryConfig::clamp_angle`). `wavelength` and
/// `coating_thickness` share a unit.
pub fn reflectance(
    wavelength: f64,
    coating_thickness: f64,
    angle: f64,
    n1: f64,
    n2: f64,
    n3: f64,
) -> f64 {
    let sin1 = angle.sin();
    let angle2 = snell(n1, sin1, n2);
    let angle3 = snell(n1, sin1, n3);

    let cos1 = angle.cos();
    let cos2 = angle2.cos();
    let cos3 = angle3.cos();

    let beta = (2.0 * PI) / wavelength * n2 * coating_thickness * cos2;
    let cos_2beta = (2.0 * beta).cos();

    // p-polarised
    let r12p = (n2 * cos1 - n1 * cos2) / (n2 * cos1 + n1 * cos2);
    let r23p = (n3 * cos2 - n2 * cos3) / (n3 * cos2 + n2 * cos3);
    let rp = two_beam(r12p, r23p, cos_2beta);

    // s-polarised
    let r12s = (n1 * cos1 - n2 * cos2) / (n1 * cos1 + n2 * cos2);
    let r23s = (n2 * cos2 - n3 * cos3) / (n2 * cos2 + n3 * cos3);
    let rs = two_beam(r12s, r23s, cos_2beta);

    let r = (rs + rp) * 0.5;
    if r.is_finite() {
        r.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

// src/photometry/ghost_eval.rs
// Screen placement, size, color and intensity of a single ghost for one light angle
// RELEVANT FILES: src/optics/ghosts.rs, src/photometry/fresnel.rs, src/projector/project.rs

use glam::DVec3;

use super::fresnel::{reflectance, AntiReflectiveCoating};
use super::PhotometryConfig;
use crate::optics::{Ghost, LensSystem};

/// Per-light inputs to ghost evaluation
#[derive(Clone, Copy, Debug)]
pub struct GhostLighting {
    /// Angle between the light and the optical axis, radians
    pub angle_to_light: f64,
    pub light_color: DVec3,
    pub light_intensity: f64,
}

/// Evaluated ghost in normalised sensor units (1.0 = half the sensor diagonal)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostAppearance {
    /// Signed offset along the screen axis through the light
    pub center: f64,
    pub radius: f64,
    pub color: DVec3,
    pub intensity: f64,
}

/// Heights on the entrance plane that land exactly on the aperture edges
#[inline]
fn entrance_heights(ghost: &Ghost, aperture_height: f64, angle: f64) -> Option<(f64, f64)> {
    let ma = ghost.entrance_to_aperture;
    if ma.a().abs() < f64::EPSILON {
        return None;
    }
    let h_e1 = (aperture_height - ma.b() * angle) / ma.a();
    let h_e2 = (-aperture_height - ma.b() * angle) / ma.a();
    Some((h_e1, h_e2))
}

/// Evaluate one ghost; `None` means the ghost is imperceptible or degenerate.
pub fn evaluate_ghost(
    ghost: &Ghost,
    system: &LensSystem,
    lighting: &GhostLighting,
    config: &PhotometryConfig,
) -> Option<GhostAppearance> {
    let angle = lighting.angle_to_light;
    let aperture_height = config.aperture_height();

    let (h_e1, h_e2) = entrance_heights(ghost, aperture_height, angle)?;

    let to_sensor = ghost.entrance_to_sensor();
    let half_sensor = config.sensor_size_mm * 0.5;
    let (h_p1, _) = to_sensor.transform(h_e1, angle);
    let (h_p2, _) = to_sensor.transform(h_e2, angle);
    let h_p1 = h_p1 / half_sensor;
    let h_p2 = h_p2 / half_sensor;

    let center = (h_p1 + h_p2) * 0.5;
    let radius = (h_p1 - h_p2).abs() * 0.5;
    if !radius.is_finite() || radius < config.negligible_epsilon {
        return None;
    }

    let pupil = system.entrance_pupil_radius(aperture_height);
    if !pupil.is_finite() || pupil.abs() < f64::EPSILON {
        return None;
    }

    // share of the entrance pupil feeding this ghost, spread over the ghost's area
    let mut intensity = (h_e1 - h_e2).powi(2) / (2.0 * pupil).powi(2) / (2.0 * radius).powi(2);
    intensity *= (1.0 - angle).clamp(0.0, 1.0);
    intensity *= config.f_number_attenuation();
    let intensity = intensity.clamp(0.0, 1.0);
    if !intensity.is_finite() || intensity < config.negligible_epsilon {
        return None;
    }

    let color = ghost_color(ghost, config, angle) * intensity * lighting.light_color
        * lighting.light_intensity;

    Some(GhostAppearance {
        center,
        radius,
        color,
        intensity,
    })
}

/// Coating reflectance of the ghost's second reflection at the three sample wavelengths
pub fn ghost_color(ghost: &Ghost, config: &PhotometryConfig, angle_to_light: f64) -> DVec3 {
    let angle = config.clamp_angle(angle_to_light);
    let coating = AntiReflectiveCoating::new(config.coating_wavelength_nm);
    let d = coating.thickness(ghost.n1);
    let n_coat = AntiReflectiveCoating::layer_index(ghost.n1, ghost.n2);
    let [red, green, blue] = config.wavelengths_nm;

    DVec3::new(
        reflectance(red, d, angle, ghost.n1, n_coat, ghost.n2),
        reflectance(green, d, angle, ghost.n1, n_coat, ghost.n2),
        reflectance(blue, d, angle, ghost.n1, n_coat, ghost.n2),
    )
}

//! Photometric evaluation: coating reflectance and ghost color/intensity
//!
//! Everything here is a pure function of its inputs. The incidence angle fed to
//! the Fresnel model is always clamped through `PhotometryConfig::clamp_angle`
//! first, so the arcsine in Snell's law stays inside its domain.

pub mod fresnel;
pub mod ghost_eval;
pub mod transmittance;

pub use fresnel::{reflectance, AntiReflectiveCoating, MIN_COATING_INDEX};
pub use ghost_eval::{evaluate_ghost, ghost_color, GhostAppearance, GhostLighting};
pub use transmittance::{TransmittanceResponse, TRANSMITTANCE_SAMPLES};

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::error::{FlareError, FlareResult};

/// Sample wavelengths for the red, green and blue channels, nanometres
pub const DEFAULT_WAVELENGTHS_NM: [f64; 3] = [700.0, 510.0, 450.0];

/// Photometric parameters shared by the ghost and starburst evaluation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhotometryConfig {
    /// Aperture value; the stop's half-height is `1 / f_number`
    #[serde(default = "PhotometryConfig::default_f_number")]
    pub f_number: f64,
    /// Wavelength the quarter-wave coatings are designed for
    #[serde(default = "PhotometryConfig::default_coating_wavelength")]
    pub coating_wavelength_nm: f64,
    #[serde(default = "PhotometryConfig::default_wavelengths")]
    pub wavelengths_nm: [f64; 3],
    /// Sensor diagonal, same unit as the lens prescription
    #[serde(default = "PhotometryConfig::default_sensor_size")]
    pub sensor_size_mm: f64,
    /// Lower bound applied to the incidence angle before reflectance evaluation
    #[serde(default = "PhotometryConfig::default_min_angle")]
    pub min_reflectance_angle: f64,
    /// Upper bound applied to the incidence angle before reflectance evaluation
    #[serde(default = "PhotometryConfig::default_max_angle")]
    pub max_reflectance_angle: f64,
    /// Bound on the ray angle at each surface when tracing the transmission response
    #[serde(default = "PhotometryConfig::default_transmittance_angle")]
    pub transmittance_max_angle: f64,
    /// Ghosts with a smaller radius or intensity are dropped
    #[serde(default = "PhotometryConfig::default_epsilon")]
    pub negligible_epsilon: f64,
}

impl Default for PhotometryConfig {
    fn default() -> Self {
        Self {
            f_number: Self::default_f_number(),
            coating_wavelength_nm: Self::default_coating_wavelength(),
            wavelengths_nm: Self::default_wavelengths(),
            sensor_size_mm: Self::default_sensor_size(),
            min_reflectance_angle: Self::default_min_angle(),
            max_reflectance_angle: Self::default_max_angle(),
            transmittance_max_angle: Self::default_transmittance_angle(),
            negligible_epsilon: Self::default_epsilon(),
        }
    }
}

impl PhotometryConfig {
    const fn default_f_number() -> f64 {
        1.0
    }

    const fn default_coating_wavelength() -> f64 {
        450.0
    }

    const fn default_wavelengths() -> [f64; 3] {
        DEFAULT_WAVELENGTHS_NM
    }

    const fn default_sensor_size() -> f64 {
        43.3
    }

    const fn default_min_angle() -> f64 {
        0.2
    }

    const fn default_max_angle() -> f64 {
        0.8
    }

    const fn default_transmittance_angle() -> f64 {
        0.2
    }

    const fn default_epsilon() -> f64 {
        1e-5
    }

    /// Half-height of the aperture stop
    #[inline]
    pub fn aperture_height(&self) -> f64 {
        1.0 / self.f_number
    }

    /// Exposure falls with the square of the f-number.
    #[inline]
    pub fn f_number_attenuation(&self) -> f64 {
        1.0 / (self.f_number * self.f_number)
    }

    #[inline]
    pub fn clamp_angle(&self, angle: f64) -> f64 {
        angle.clamp(self.min_reflectance_angle, self.max_reflectance_angle)
    }

    pub fn validate(&self) -> FlareResult<()> {
        if !self.f_number.is_finite() || self.f_number <= 0.0 {
            return Err(FlareError::config("photometry.f_number must be finite and > 0"));
        }
        if !self.coating_wavelength_nm.is_finite() || self.coating_wavelength_nm <= 0.0 {
            return Err(FlareError::config(
                "photometry.coating_wavelength_nm must be finite and > 0",
            ));
        }
        if self.wavelengths_nm.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(FlareError::config(
                "photometry.wavelengths_nm entries must be finite and > 0",
            ));
        }
        if !self.sensor_size_mm.is_finite() || self.sensor_size_mm <= 0.0 {
            return Err(FlareError::config("photometry.sensor_size_mm must be finite and > 0"));
        }
        let (lo, hi) = (self.min_reflectance_angle, self.max_reflectance_angle);
        if !lo.is_finite() || !hi.is_finite() || lo < 0.0 || lo > hi || hi >= FRAC_PI_2 {
            return Err(FlareError::config(
                "photometry reflectance angle range must satisfy 0 <= min <= max < pi/2",
            ));
        }
        let t = self.transmittance_max_angle;
        if !t.is_finite() || !(0.0..FRAC_PI_2).contains(&t) {
            return Err(FlareError::config(
                "photometry.transmittance_max_angle must satisfy 0 <= angle < pi/2",
            ));
        }
        if !self.negligible_epsilon.is_finite() || self.negligible_epsilon < 0.0 {
            return Err(FlareError::config(
                "photometry.negligible_epsilon must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

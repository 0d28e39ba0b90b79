// src/aperture/spectrum.rs
// Aperture mask -> centred, tone-mapped diffraction magnitude (starburst texture)
// RELEVANT FILES: src/aperture/fft.rs, src/aperture/blur.rs, src/aperture/mask.rs

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::blur::{gaussian_blur, kernel_radius};
use super::fft::{ComplexGrid, Transform2D};
use super::{ApertureMask, ApertureSpectrum, ScalarGrid};
use crate::config::normalize_key;
use crate::error::{FlareError, FlareResult};

/// Compression applied to the spectrum magnitude
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToneMapping {
    /// Raw magnitude, unnormalised
    #[serde(alias = "linear")]
    None,
    /// `ln(1 + g m) / ln(1 + g)` on the peak-normalised magnitude
    #[serde(alias = "logarithmic")]
    Log,
    /// `1 - exp(-e m)`, rescaled so the peak maps to 1
    Exposure,
}

impl ToneMapping {
    pub fn canonical(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Log => "log",
            Self::Exposure => "exposure",
        }
    }
}

impl FromStr for ToneMapping {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(value);
        Ok(match key.as_str() {
            "none" | "linear" | "raw" => Self::None,
            "log" | "logarithmic" => Self::Log,
            "exposure" | "exp" => Self::Exposure,
            _ => return Err("unknown tone mapping"),
        })
    }
}

/// Post-processing of the raw Fourier magnitude
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpectrumSettings {
    #[serde(default = "SpectrumSettings::default_tone_mapping")]
    pub tone_mapping: ToneMapping,
    #[serde(default = "SpectrumSettings::default_log_gain")]
    pub log_gain: f32,
    #[serde(default = "SpectrumSettings::default_exposure")]
    pub exposure: f32,
    /// Blur passes over the centred magnitude, before tone mapping
    #[serde(default = "SpectrumSettings::default_blur_passes")]
    pub blur_passes: u32,
    #[serde(default = "SpectrumSettings::default_blur_sigma")]
    pub blur_sigma: f32,
    /// Radius (fraction of half the grid) where the radial fade-out starts
    #[serde(default = "SpectrumSettings::default_edge_fade")]
    pub edge_fade: Option<f32>,
}

impl Default for SpectrumSettings {
    fn default() -> Self {
        Self {
            tone_mapping: Self::default_tone_mapping(),
            log_gain: Self::default_log_gain(),
            exposure: Self::default_exposure(),
            blur_passes: Self::default_blur_passes(),
            blur_sigma: Self::default_blur_sigma(),
            edge_fade: Self::default_edge_fade(),
        }
    }
}

impl SpectrumSettings {
    const fn default_tone_mapping() -> ToneMapping {
        ToneMapping::Log
    }

    const fn default_log_gain() -> f32 {
        1000.0
    }

    const fn default_exposure() -> f32 {
        64.0
    }

    const fn default_blur_passes() -> u32 {
        1
    }

    const fn default_blur_sigma() -> f32 {
        1.0
    }

    const fn default_edge_fade() -> Option<f32> {
        Some(0.75)
    }

    /// Centred magnitude only: no blur, no tone mapping, no fade
    pub const fn raw() -> Self {
        Self {
            tone_mapping: ToneMapping::None,
            log_gain: 1.0,
            exposure: 1.0,
            blur_passes: 0,
            blur_sigma: 1.0,
            edge_fade: None,
        }
    }

    /// Check the settings for a spectrum of `resolution` texels per side.
    pub fn validate(&self, resolution: usize) -> FlareResult<()> {
        if !self.log_gain.is_finite() || self.log_gain <= 0.0 {
            return Err(FlareError::config("spectrum.log_gain must be finite and > 0"));
        }
        if !self.exposure.is_finite() || self.exposure <= 0.0 {
            return Err(FlareError::config("spectrum.exposure must be finite and > 0"));
        }
        if self.blur_passes > 0 && (!self.blur_sigma.is_finite() || self.blur_sigma <= 0.0) {
            return Err(FlareError::config(
                "spectrum.blur_sigma must be finite and > 0 when blurring",
            ));
        }
        if self.blur_passes > 0 && kernel_radius(self.blur_sigma) > resolution as f32 {
            return Err(FlareError::config(format!(
                "spectrum.blur_sigma {} is too wide for a {resolution}x{resolution} grid",
                self.blur_sigma
            )));
        }
        if let Some(start) = self.edge_fade {
            if !(0.0..1.0).contains(&start) {
                return Err(FlareError::config("spectrum.edge_fade must be in [0, 1)"));
            }
        }
        Ok(())
    }
}

/// Move the zero frequency from `(0, 0)` to `(n / 2, n / 2)`.
fn shift_quadrants(values: &[f64], n: usize) -> Vec<f32> {
    let half = n / 2;
    let mut out = vec![0.0f32; n * n];
    for y in 0..n {
        let sy = (y + half) % n;
        for x in 0..n {
            let sx = (x + half) % n;
            out[y * n + x] = values[sy * n + sx] as f32;
        }
    }
    out
}

fn tone_map(values: &mut [f32], settings: &SpectrumSettings) {
    let peak = values.iter().copied().fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return;
    }
    match settings.tone_mapping {
        ToneMapping::None => {}
        ToneMapping::Log => {
            let g = settings.log_gain;
            let norm = (1.0 + g).ln();
            values
                .iter_mut()
                .for_each(|v| *v = (1.0 + g * *v / peak).ln() / norm);
        }
        ToneMapping::Exposure => {
            let e = settings.exposure;
            let norm = 1.0 - (-e).exp();
            values
                .iter_mut()
                .for_each(|v| *v = (1.0 - (-e * *v / peak).exp()) / norm);
        }
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fade to zero towards the grid border so the texture has no hard cutoff.
fn fade_edges(values: &mut [f32], n: usize, start: f32) {
    let half = (n / 2).max(1) as f32;
    let centre = (n / 2) as f32;
    for y in 0..n {
        for x in 0..n {
            let dx = x as f32 - centre;
            let dy = y as f32 - centre;
            let r = (dx * dx + dy * dy).sqrt() / half;
            values[y * n + x] *= 1.0 - smoothstep(start, 1.0, r);
        }
    }
}

/// Fourier magnitude of `mask`, zero frequency at the centre, post-processed per `settings`.
pub fn compute_spectrum(
    mask: &ApertureMask,
    settings: &SpectrumSettings,
    backend: &dyn Transform2D,
) -> FlareResult<ApertureSpectrum> {
    let n = mask.resolution();
    if !n.is_power_of_two() {
        return Err(FlareError::NonPowerOfTwoResolution(n));
    }
    settings.validate(n)?;

    let mut signal = ComplexGrid::from_real(mask);
    backend.forward(&mut signal)?;

    let mut spectrum = ScalarGrid::from_values(n, shift_quadrants(&signal.magnitude(), n))?;
    gaussian_blur(&mut spectrum, settings.blur_sigma, settings.blur_passes);
    tone_map(spectrum.values_mut(), settings);
    if let Some(start) = settings.edge_fade {
        fade_edges(spectrum.values_mut(), n, start);
    }
    Ok(spectrum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aperture::Radix2Fft;

    fn checkerboard(n: usize) -> ScalarGrid {
        ScalarGrid::from_fn(n, |x, y| ((x + y) % 2) as f32)
    }

    #[test]
    fn test_checkerboard_peaks() {
        let spectrum =
            compute_spectrum(&checkerboard(8), &SpectrumSettings::raw(), &Radix2Fft::default())
                .unwrap();
        // DC moved to the centre, Nyquist to the corner
        assert!((spectrum.get(4, 4) - 32.0).abs() < 1e-4);
        assert!((spectrum.get(0, 0) - 32.0).abs() < 1e-4);
        for y in 0..8 {
            for x in 0..8 {
                if (x, y) != (4, 4) && (x, y) != (0, 0) {
                    assert!(spectrum.get(x, y).abs() < 1e-4, "({x},{y})");
                }
            }
        }
    }

    #[test]
    fn test_tone_mapping_is_monotonic_and_bounded() {
        for mode in [ToneMapping::Log, ToneMapping::Exposure] {
            let mut values = vec![0.0, 0.5, 1.0, 4.0, 16.0];
            let settings = SpectrumSettings {
                tone_mapping: mode,
                ..SpectrumSettings::raw()
            };
            tone_map(&mut values, &settings);
            assert_eq!(values[0], 0.0);
            assert!((values[4] - 1.0).abs() < 1e-6);
            assert!(values.windows(2).all(|w| w[0] < w[1]), "{mode:?}: {values:?}");
        }
    }

    #[test]
    fn test_edge_fade_keeps_centre() {
        let mut values = vec![1.0; 64];
        fade_edges(&mut values, 8, 0.5);
        assert_eq!(values[4 * 8 + 4], 1.0);
        assert_eq!(values[0], 0.0);
    }

    #[test]
    fn test_tone_mapping_parse() {
        assert_eq!("Log".parse::<ToneMapping>(), Ok(ToneMapping::Log));
        assert_eq!("logarithmic".parse::<ToneMapping>(), Ok(ToneMapping::Log));
        assert_eq!(" RAW ".parse::<ToneMapping>(), Ok(ToneMapping::None));
        assert_eq!("exp".parse::<ToneMapping>(), Ok(ToneMapping::Exposure));
        assert!("reinhard".parse::<ToneMapping>().is_err());
        assert_eq!(ToneMapping::Exposure.canonical(), "exposure");
    }

    #[test]
    fn test_blur_wider_than_grid_rejected() {
        let settings = SpectrumSettings {
            blur_sigma: 1e5,
            ..Default::default()
        };
        assert!(matches!(settings.validate(512), Err(FlareError::Config(_))));
        assert!(SpectrumSettings::default().validate(4).is_ok());
        // radius 3 does not fit a 2x2 grid
        assert!(SpectrumSettings::default().validate(2).is_err());
        // without blur passes the sigma is never used
        let unblurred = SpectrumSettings {
            blur_passes: 0,
            ..settings
        };
        assert!(unblurred.validate(8).is_ok());
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let mask = ScalarGrid::zeros(100);
        assert_eq!(
            compute_spectrum(&mask, &SpectrumSettings::default(), &Radix2Fft::default()),
            Err(FlareError::NonPowerOfTwoResolution(100))
        );
    }
}

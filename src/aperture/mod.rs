// src/aperture/mod.rs
// Aperture shape rasterization and its diffraction spectrum (the starburst texture)
// Recomputed only when the aperture shape changes, never per frame

pub mod blur;
pub mod fft;
pub mod mask;
pub mod spectrum;

pub use blur::{gaussian_blur, kernel_radius};
pub use fft::{ComplexGrid, Radix2Fft, Transform2D};
pub use mask::{
    aperture_coverage, build_aperture_mask, ApertureShape, MAX_EDGE_COUNT, MIN_EDGE_COUNT,
};
pub use spectrum::{compute_spectrum, SpectrumSettings, ToneMapping};

use serde::{Deserialize, Serialize};

use crate::error::{FlareError, FlareResult};

/// Square single-channel image, row-major, `resolution * resolution` values
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarGrid {
    resolution: usize,
    values: Vec<f32>,
}

/// Aperture coverage in `[0, 1]`
pub type ApertureMask = ScalarGrid;

/// Centred, tone-mapped magnitude of the aperture's Fourier transform
pub type ApertureSpectrum = ScalarGrid;

impl ScalarGrid {
    pub fn zeros(resolution: usize) -> Self {
        Self {
            resolution,
            values: vec![0.0; resolution * resolution],
        }
    }

    pub fn from_values(resolution: usize, values: Vec<f32>) -> FlareResult<Self> {
        if values.len() != resolution * resolution {
            return Err(FlareError::GridSizeMismatch {
                resolution,
                len: values.len(),
            });
        }
        Ok(Self { resolution, values })
    }

    /// Build by evaluating `f(x, y)` for every pixel
    pub fn from_fn(resolution: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut values = Vec::with_capacity(resolution * resolution);
        for y in 0..resolution {
            for x in 0..resolution {
                values.push(f(x, y));
            }
        }
        Self { resolution, values }
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.resolution + x]
    }

    pub fn max_value(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }

    /// Position and value of the largest sample; first wins on ties
    pub fn argmax(&self) -> (usize, usize, f32) {
        let mut best = (0, f32::NEG_INFINITY);
        for (i, &v) in self.values.iter().enumerate() {
            if v > best.1 {
                best = (i, v);
            }
        }
        (best.0 % self.resolution.max(1), best.0 / self.resolution.max(1), best.1)
    }

    /// Grayscale RGBA8 copy for debug display
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.values.len() * 4);
        for &v in &self.values {
            let c = (v.clamp(0.0, 1.0) * 255.0) as u8;
            out.extend_from_slice(&[c, c, c, 255]);
        }
        out
    }
}

/// Aperture shape and texture parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApertureConfig {
    /// Number of diaphragm blades
    #[serde(default = "ApertureConfig::default_edge_count")]
    pub edge_count: u32,
    /// Corner rounding in `[0, 1]`
    #[serde(default = "ApertureConfig::default_smoothing")]
    pub smoothing: f32,
    /// Blade rotation, radians
    #[serde(default)]
    pub rotation: f32,
    /// Texture resolution; must be a power of two
    #[serde(default = "ApertureConfig::default_resolution")]
    pub resolution: usize,
    /// Zoom-out of the FFT input so the aperture fills `1 / fft_scale` of the grid
    #[serde(default = "ApertureConfig::default_fft_scale")]
    pub fft_scale: f32,
    /// Blur passes applied to the display mask
    #[serde(default = "ApertureConfig::default_mask_blur_passes")]
    pub mask_blur_passes: u32,
    #[serde(default = "ApertureConfig::default_mask_blur_sigma")]
    pub mask_blur_sigma: f32,
}

impl Default for ApertureConfig {
    fn default() -> Self {
        Self {
            edge_count: Self::default_edge_count(),
            smoothing: Self::default_smoothing(),
            rotation: 0.0,
            resolution: Self::default_resolution(),
            fft_scale: Self::default_fft_scale(),
            mask_blur_passes: Self::default_mask_blur_passes(),
            mask_blur_sigma: Self::default_mask_blur_sigma(),
        }
    }
}

impl ApertureConfig {
    const fn default_edge_count() -> u32 {
        6
    }

    const fn default_smoothing() -> f32 {
        0.1
    }

    const fn default_resolution() -> usize {
        512
    }

    const fn default_fft_scale() -> f32 {
        2.0
    }

    const fn default_mask_blur_passes() -> u32 {
        4
    }

    const fn default_mask_blur_sigma() -> f32 {
        1.0
    }

    /// Shape used for the display mask
    pub fn display_shape(&self) -> ApertureShape {
        ApertureShape {
            edge_count: self.edge_count,
            smoothing: self.smoothing,
            rotation: self.rotation,
            scale: 1.0,
        }
    }

    /// Shape used as FFT input
    pub fn fft_shape(&self) -> ApertureShape {
        ApertureShape {
            scale: self.fft_scale,
            ..self.display_shape()
        }
    }

    pub fn validate(&self) -> FlareResult<()> {
        if !self.resolution.is_power_of_two() {
            return Err(FlareError::NonPowerOfTwoResolution(self.resolution));
        }
        if self.mask_blur_passes > 0
            && (!self.mask_blur_sigma.is_finite() || self.mask_blur_sigma <= 0.0)
        {
            return Err(FlareError::config(
                "aperture.mask_blur_sigma must be finite and > 0 when blurring",
            ));
        }
        if self.mask_blur_passes > 0
            && kernel_radius(self.mask_blur_sigma) > self.resolution as f32
        {
            return Err(FlareError::config(format!(
                "aperture.mask_blur_sigma {} is too wide for a {}x{} grid",
                self.mask_blur_sigma, self.resolution, self.resolution
            )));
        }
        if !self.fft_scale.is_finite() || self.fft_scale < 1.0 {
            return Err(FlareError::config("aperture.fft_scale must be finite and >= 1"));
        }
        self.display_shape().validate()
    }
}

/// Everything the diffraction engine produces for one aperture configuration
#[derive(Clone, Debug, PartialEq)]
pub struct ApertureImages {
    /// Blurred aperture shape used to texture ghost quads
    pub mask: ApertureMask,
    /// Starburst texture
    pub spectrum: ApertureSpectrum,
}

/// Rasterize the aperture twice and transform the zoomed-out copy.
pub fn prepare_aperture(
    config: &ApertureConfig,
    settings: &SpectrumSettings,
    backend: &dyn Transform2D,
) -> FlareResult<ApertureImages> {
    config.validate()?;

    let mut mask = build_aperture_mask(&config.display_shape(), config.resolution)?;
    gaussian_blur(&mut mask, config.mask_blur_sigma, config.mask_blur_passes);

    let fft_input = build_aperture_mask(&config.fft_shape(), config.resolution)?;
    let spectrum = compute_spectrum(&fft_input, settings, backend)?;

    log::debug!(
        "aperture prepared: {} edges, {}x{} texels",
        config.edge_count,
        config.resolution,
        config.resolution
    );

    Ok(ApertureImages { mask, spectrum })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_size_checked() {
        assert!(ScalarGrid::from_values(4, vec![0.0; 16]).is_ok());
        assert_eq!(
            ScalarGrid::from_values(4, vec![0.0; 15]),
            Err(FlareError::GridSizeMismatch {
                resolution: 4,
                len: 15
            })
        );
    }

    #[test]
    fn test_argmax_and_rgba() {
        let grid = ScalarGrid::from_fn(4, |x, y| if (x, y) == (3, 1) { 2.0 } else { 0.5 });
        assert_eq!(grid.argmax(), (3, 1, 2.0));
        let rgba = grid.to_rgba8();
        assert_eq!(rgba.len(), 64);
        assert_eq!(&rgba[0..4], &[127, 127, 127, 255]);
        assert_eq!(&rgba[(4 + 3) * 4..(4 + 3) * 4 + 4], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_config_rejects_non_power_of_two() {
        let config = ApertureConfig {
            resolution: 100,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(FlareError::NonPowerOfTwoResolution(100)));
    }

    #[test]
    fn test_config_rejects_mask_blur_wider_than_grid() {
        let config = ApertureConfig {
            resolution: 16,
            mask_blur_sigma: 6.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FlareError::Config(_))));
        let unblurred = ApertureConfig {
            mask_blur_passes: 0,
            ..config
        };
        assert!(unblurred.validate().is_ok());
    }

    #[test]
    fn test_prepare_small_aperture() {
        let config = ApertureConfig {
            resolution: 32,
            ..Default::default()
        };
        let images = prepare_aperture(
            &config,
            &SpectrumSettings::default(),
            &Radix2Fft::new(false),
        )
        .unwrap();
        assert_eq!(images.mask.resolution(), 32);
        assert_eq!(images.spectrum.resolution(), 32);
        // the DC term lands in the centre
        let centre = images.spectrum.get(16, 16);
        assert!((centre - images.spectrum.max_value()).abs() < 1e-6);
    }
}

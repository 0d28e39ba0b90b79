use serde::{Deserialize, Serialize};

use crate::aperture::{ApertureConfig, SpectrumSettings};
use crate::error::FlareResult;
use crate::optics::LensAssembly;
use crate::photometry::PhotometryConfig;
use crate::projector::ProjectorConfig;

/// Lowercase and drop separators so `"Spot_Light"` and `"spot-light"` compare equal
pub fn normalize_key(value: &str) -> String {
    value
        .trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' ' | '.'))
        .collect()
}

/// Backend features resolved by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlareCapabilities {
    /// Run FFT row passes on the rayon pool
    #[serde(default = "FlareCapabilities::default_parallel_fft")]
    pub supports_parallel_fft: bool,
    /// Pack per-ghost matrices for instanced drawing
    #[serde(default)]
    pub supports_instanced_draw: bool,
}

impl Default for FlareCapabilities {
    fn default() -> Self {
        Self {
            supports_parallel_fft: Self::default_parallel_fft(),
            supports_instanced_draw: false,
        }
    }
}

impl FlareCapabilities {
    const fn default_parallel_fft() -> bool {
        true
    }
}

/// Complete lens flare configuration; every section falls back to its defaults
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlareConfig {
    #[serde(default)]
    pub lens: LensAssembly,
    #[serde(default)]
    pub aperture: ApertureConfig,
    #[serde(default)]
    pub spectrum: SpectrumSettings,
    #[serde(default)]
    pub photometry: PhotometryConfig,
    #[serde(default)]
    pub projector: ProjectorConfig,
    #[serde(default)]
    pub capabilities: FlareCapabilities,
}

impl FlareConfig {
    /// Check every section; the first violation wins.
    pub fn validate(&self) -> FlareResult<()> {
        self.lens.validate()?;
        self.aperture.validate()?;
        self.spectrum.validate(self.aperture.resolution)?;
        self.photometry.validate()?;
        self.projector.validate()?;
        Ok(())
    }
}

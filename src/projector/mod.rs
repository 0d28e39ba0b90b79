//! Per-frame flare projection
//!
//! Turns the prepared ghost list into screen-space draw descriptors for one
//! light and one camera. Nothing here allocates beyond the returned frame, and
//! lights are independent of each other, so `project_many` fans out over rayon.

pub mod camera;
pub mod descriptors;
pub mod project;

pub use camera::{CameraState, LightKind, LightState, Visibility};
pub use descriptors::{FlareDrawDescriptor, FlareFrame, GhostGpuData, StarburstDrawDescriptor};
pub use project::FlareProjector;

use serde::{Deserialize, Serialize};

use crate::error::{FlareError, FlareResult};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectorConfig {
    /// Starburst half-size in NDC height units at full visibility
    #[serde(default = "ProjectorConfig::default_starburst_base_size")]
    pub starburst_base_size: f32,
    /// Treat `Visibility::Unknown` as fully visible
    #[serde(default = "ProjectorConfig::default_fail_open")]
    pub occlusion_fail_open: bool,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            starburst_base_size: Self::default_starburst_base_size(),
            occlusion_fail_open: Self::default_fail_open(),
        }
    }
}

impl ProjectorConfig {
    const fn default_starburst_base_size() -> f32 {
        0.2
    }

    const fn default_fail_open() -> bool {
        true
    }

    pub fn validate(&self) -> FlareResult<()> {
        if !self.starburst_base_size.is_finite() || self.starburst_base_size < 0.0 {
            return Err(FlareError::config(
                "projector.starburst_base_size must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

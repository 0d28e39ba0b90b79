// src/model.rs
// Prepare stage and the owned, atomically swapped lens flare state
// RELEVANT FILES: src/config/mod.rs, src/projector/project.rs

use std::sync::{Arc, PoisonError, RwLock};

use crate::aperture::{prepare_aperture, ApertureImages, ApertureMask, ApertureSpectrum, Radix2Fft};
use crate::config::FlareConfig;
use crate::error::FlareResult;
use crate::optics::{enumerate_ghosts, Ghost, LensSystem, RayTransferSolver};
use crate::photometry::TransmittanceResponse;
use crate::projector::{
    CameraState, FlareFrame, FlareProjector, GhostGpuData, LightState, Visibility,
};

/// Everything derived from one configuration; immutable once built
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedFlare {
    pub config: FlareConfig,
    pub lens_system: LensSystem,
    pub ghosts: Vec<Ghost>,
    pub aperture: ApertureImages,
    pub transmittance: TransmittanceResponse,
    /// Present when the host draws ghosts instanced
    pub ghost_gpu_data: Option<Vec<GhostGpuData>>,
}

impl PreparedFlare {
    #[inline]
    pub fn aperture_mask(&self) -> &ApertureMask {
        &self.aperture.mask
    }

    #[inline]
    pub fn aperture_spectrum(&self) -> &ApertureSpectrum {
        &self.aperture.spectrum
    }

    pub fn projector(&self) -> FlareProjector<'_> {
        FlareProjector::new(self)
    }
}

/// Run the whole prepare stage for `config`.
pub fn prepare(config: &FlareConfig) -> FlareResult<PreparedFlare> {
    config.validate()?;

    let solver = RayTransferSolver::new(&config.lens)?;
    let lens_system = solver.lens_system();
    let ghosts = enumerate_ghosts(&solver);
    let transmittance = TransmittanceResponse::compute(&solver, &config.photometry);
    log::debug!(
        "lens solved: {} interfaces, stop at {}, {} ghosts",
        solver.interface_count(),
        solver.aperture_index(),
        ghosts.len()
    );

    let backend = Radix2Fft::new(config.capabilities.supports_parallel_fft);
    let aperture = prepare_aperture(&config.aperture, &config.spectrum, &backend)?;

    let ghost_gpu_data = config
        .capabilities
        .supports_instanced_draw
        .then(|| ghosts.iter().map(GhostGpuData::from_ghost).collect());

    log::info!(
        "lens flare prepared: {} ghosts, {}x{} aperture",
        ghosts.len(),
        config.aperture.resolution,
        config.aperture.resolution
    );

    Ok(PreparedFlare {
        config: config.clone(),
        lens_system,
        ghosts,
        aperture,
        transmittance,
        ghost_gpu_data,
    })
}

/// Owns the current prepared state. Readers take an `Arc` snapshot and never
/// see a half-updated state; `recompute` is the only way the state changes.
#[derive(Debug)]
pub struct LensFlareModel {
    state: RwLock<Arc<PreparedFlare>>,
}

impl LensFlareModel {
    pub fn new(config: &FlareConfig) -> FlareResult<Self> {
        let prepared = prepare(config)?;
        Ok(Self {
            state: RwLock::new(Arc::new(prepared)),
        })
    }

    /// Prepare `config` and swap it in. On failure the previous state stays
    /// active and the error is returned.
    pub fn recompute(&self, config: &FlareConfig) -> FlareResult<()> {
        let prepared = match prepare(config) {
            Ok(prepared) => Arc::new(prepared),
            Err(err) => {
                log::warn!(
                    "lens flare recompute rejected ({}): {}; keeping previous state",
                    err.category(),
                    err
                );
                return Err(err);
            }
        };
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = prepared;
        Ok(())
    }

    /// Current prepared state
    pub fn snapshot(&self) -> Arc<PreparedFlare> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn config(&self) -> FlareConfig {
        self.snapshot().config.clone()
    }

    pub fn project(
        &self,
        light: &LightState,
        camera: &CameraState,
        visibility: Visibility,
    ) -> FlareFrame {
        self.snapshot().projector().project(light, camera, visibility)
    }

    pub fn project_many(
        &self,
        lights: &[(LightState, Visibility)],
        camera: &CameraState,
    ) -> Vec<FlareFrame> {
        self.snapshot().projector().project_many(lights, camera)
    }
}

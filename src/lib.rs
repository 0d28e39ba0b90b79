//! Physically based lens flare model.
//!
//! Paraxial ray transfer matrices trace every double-reflection path ("ghost")
//! through a lens prescription, a thin-film coating model colours each ghost, and
//! the Fourier transform of the aperture shape gives the starburst texture. The
//! output is plain draw descriptors; rendering them is the host's job.
//!
//! The expensive part runs once per configuration via [`prepare`] (or
//! [`LensFlareModel::recompute`]); per-frame work is [`FlareProjector::project`].

pub mod aperture;
pub mod config;
pub mod error;
pub mod model;
pub mod optics;
pub mod photometry;
pub mod projector;

pub use aperture::{
    ApertureConfig, ApertureImages, ApertureMask, ApertureSpectrum, Radix2Fft, ScalarGrid,
    SpectrumSettings, ToneMapping, Transform2D,
};
pub use config::{FlareCapabilities, FlareConfig};
pub use error::{FlareError, FlareResult};
pub use model::{prepare, LensFlareModel, PreparedFlare};
pub use optics::{
    enumerate_ghosts, Ghost, LensAssembly, LensInterface, LensSystem, Medium, RayTransferMatrix,
    RayTransferSolver, Surface,
};
pub use photometry::{evaluate_ghost, reflectance, PhotometryConfig, TransmittanceResponse};
pub use projector::{
    CameraState, FlareDrawDescriptor, FlareFrame, FlareProjector, GhostGpuData, LightKind,
    LightState, ProjectorConfig, StarburstDrawDescriptor, Visibility,
};

// src/optics/mod.rs
// Paraxial optics: lens prescriptions, ray transfer matrices and ghost path enumeration
// This module is the geometric half of the prepare stage

pub mod ghosts;
pub mod lens;
pub mod ray_transfer;

pub use ghosts::{enumerate_ghosts, pair_count, Ghost, GhostSide};
pub use lens::{LensAssembly, LensInterface, Medium, Surface, REFRACTIVE_INDEX_AIR};
pub use ray_transfer::{InterfaceTransforms, LensSystem, RayTransferMatrix, RayTransferSolver};

// src/projector/descriptors.rs
// Plain draw records handed to the host renderer; they own no GPU resources
// RELEVANT FILES: src/projector/project.rs, src/model.rs

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::optics::Ghost;

/// One ghost quad for one light, in normalised device coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlareDrawDescriptor {
    /// Index into the prepared ghost list
    pub ghost_index: usize,
    /// Quad centre offset from the screen centre
    pub center: Vec2,
    /// Quad half-extent per axis (aspect corrected so ghosts stay round)
    pub scale: Vec2,
    /// Radius in normalised sensor units, before aspect correction
    pub radius: f32,
    pub color: Vec3,
    pub intensity: f32,
}

/// Diffraction glint drawn at the light itself
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarburstDrawDescriptor {
    /// Light position in NDC
    pub center: Vec2,
    pub scale: Vec2,
    /// Orientation of the screen axis through the light, radians
    pub rotation: f32,
    /// Angle between light and optical axis, radians
    pub angle_to_light: f32,
    pub tint: Vec3,
    pub intensity: f32,
}

/// Everything to draw for one light this frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlareFrame {
    pub ghosts: Vec<FlareDrawDescriptor>,
    pub starburst: Option<StarburstDrawDescriptor>,
}

impl FlareFrame {
    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty() && self.starburst.is_none()
    }
}

/// Per-ghost record for instanced evaluation on the GPU (48 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GhostGpuData {
    /// Column-major 2x2
    pub entrance_to_aperture: [f32; 4],
    /// Column-major 2x2
    pub aperture_to_sensor: [f32; 4],
    /// `[n1, n2, 0, 0]`
    pub indices: [f32; 4],
}

impl GhostGpuData {
    pub fn from_ghost(ghost: &Ghost) -> Self {
        Self {
            entrance_to_aperture: ghost.entrance_to_aperture.to_cols_array_f32(),
            aperture_to_sensor: ghost.aperture_to_sensor.to_cols_array_f32(),
            indices: [ghost.n1 as f32, ghost.n2 as f32, 0.0, 0.0],
        }
    }
}

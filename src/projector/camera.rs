// src/projector/camera.rs
// Per-frame light and camera inputs supplied by the host renderer
// RELEVANT FILES: src/projector/project.rs

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::config::normalize_key;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightKind {
    #[serde(alias = "point-light")]
    Point,
    #[serde(alias = "spot-light")]
    Spot,
    #[serde(alias = "dir")]
    Directional,
}

impl LightKind {
    pub fn canonical(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Spot => "spot",
            Self::Directional => "directional",
        }
    }
}

impl FromStr for LightKind {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(value);
        Ok(match key.as_str() {
            "point" | "pointlight" | "omni" => Self::Point,
            "spot" | "spotlight" => Self::Spot,
            "directional" | "dir" | "sun" => Self::Directional,
            _ => return Err("unknown light kind"),
        })
    }
}

/// One light as seen by the flare projector
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    pub kind: LightKind,
    /// World position; ignored for directional lights
    #[serde(default)]
    pub position: Vec3,
    /// Direction the light travels (spot axis, sun rays)
    #[serde(default = "LightState::default_direction")]
    pub direction: Vec3,
    #[serde(default = "LightState::default_color")]
    pub color: Vec3,
    #[serde(default = "LightState::default_intensity")]
    pub intensity: f32,
    /// Maximum reach of point and spot lights
    #[serde(default)]
    pub range: Option<f32>,
    /// Spot half-angle, radians
    #[serde(default)]
    pub cone_angle: Option<f32>,
}

impl LightState {
    fn default_direction() -> Vec3 {
        Vec3::NEG_Z
    }

    fn default_color() -> Vec3 {
        Vec3::ONE
    }

    const fn default_intensity() -> f32 {
        1.0
    }

    pub fn point(position: Vec3) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            direction: Self::default_direction(),
            color: Self::default_color(),
            intensity: Self::default_intensity(),
            range: None,
            cone_angle: None,
        }
    }

    pub fn directional(direction: Vec3) -> Self {
        Self {
            kind: LightKind::Directional,
            direction,
            ..Self::point(Vec3::ZERO)
        }
    }

    pub fn spot(position: Vec3, direction: Vec3, cone_angle: f32) -> Self {
        Self {
            kind: LightKind::Spot,
            direction,
            cone_angle: Some(cone_angle),
            ..Self::point(position)
        }
    }

    /// Point the projector treats as the light's location for this camera
    pub fn apparent_position(&self, camera: &CameraState) -> Vec3 {
        match self.kind {
            LightKind::Directional => {
                camera.position - self.direction.normalize_or_zero() * camera.far
            }
            LightKind::Point | LightKind::Spot => self.position,
        }
    }

    /// Whether the camera is lit at all: inside range and, for spots, inside the cone
    pub fn reaches(&self, camera_position: Vec3) -> bool {
        if self.kind == LightKind::Directional {
            return true;
        }
        let to_camera = camera_position - self.position;
        if let Some(range) = self.range {
            if to_camera.length() > range {
                return false;
            }
        }
        if let (LightKind::Spot, Some(cone)) = (self.kind, self.cone_angle) {
            let axis = self.direction.normalize_or_zero();
            let dir = to_camera.normalize_or_zero();
            if axis == Vec3::ZERO || dir == Vec3::ZERO {
                return true;
            }
            return axis.dot(dir).clamp(-1.0, 1.0).acos() <= cone;
        }
        true
    }
}

/// Camera pose and projection for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    /// Unit view direction
    pub forward: Vec3,
    /// World to clip
    pub view_proj: Mat4,
    /// Width over height
    pub aspect: f32,
    pub far: f32,
}

impl CameraState {
    /// Right-handed perspective camera looking from `eye` at `target`
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let view = Mat4::look_at_rh(eye, target, up);
        let proj = Mat4::perspective_rh(fov_y, aspect, near, far);
        Self {
            position: eye,
            forward: (target - eye).normalize_or_zero(),
            view_proj: proj * view,
            aspect,
            far,
        }
    }

    /// Normalised device coordinates of `point`; `None` at or behind the eye plane
    pub fn project_to_ndc(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.view_proj * point.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        Some(clip.xy() / clip.w)
    }

    /// Angle between the view direction and the direction towards `point`, radians
    pub fn angle_to(&self, point: Vec3) -> f32 {
        let to_point = (point - self.position).normalize_or_zero();
        let forward = self.forward.normalize_or_zero();
        if to_point == Vec3::ZERO || forward == Vec3::ZERO {
            return 0.0;
        }
        forward.dot(to_point).clamp(-1.0, 1.0).acos()
    }
}

/// Occlusion signal for one light, computed by the host
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Visibility {
    /// No occlusion information this frame
    #[default]
    Unknown,
    /// Fraction of the light that is visible, `0..=1`
    Factor(f32),
}

impl Visibility {
    pub fn from_occluded(occluded: bool) -> Self {
        Self::Factor(if occluded { 0.0 } else { 1.0 })
    }

    pub fn resolve(self, fail_open: bool) -> f32 {
        match self {
            Self::Unknown => {
                if fail_open {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Factor(f) if f.is_nan() => 0.0,
            Self::Factor(f) => f.clamp(0.0, 1.0),
        }
    }
}

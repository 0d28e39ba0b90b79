// src/projector/project.rs
// Light + camera -> ghost and starburst draw descriptors
// RELEVANT FILES: src/photometry/ghost_eval.rs, src/projector/camera.rs, src/model.rs

use glam::{Vec2, Vec3};
use rayon::prelude::*;
use std::f32::consts::FRAC_PI_2;

use super::camera::{CameraState, LightState, Visibility};
use super::descriptors::{FlareDrawDescriptor, FlareFrame, StarburstDrawDescriptor};
use crate::model::PreparedFlare;
use crate::photometry::{evaluate_ghost, GhostLighting};

/// Unit direction from the screen centre towards `ndc`, in aspect-corrected space
#[inline]
fn screen_axis(ndc: Vec2, aspect: f32) -> Vec2 {
    Vec2::new(ndc.x * aspect, ndc.y).normalize_or_zero()
}

/// Projects one prepared lens onto the screen; cheap to construct per frame
#[derive(Clone, Copy, Debug)]
pub struct FlareProjector<'a> {
    prepared: &'a PreparedFlare,
}

impl<'a> FlareProjector<'a> {
    pub fn new(prepared: &'a PreparedFlare) -> Self {
        Self { prepared }
    }

    /// Draw descriptors for a single light. Empty when the light is behind the
    /// camera, out of reach, or fully occluded.
    pub fn project(
        &self,
        light: &LightState,
        camera: &CameraState,
        visibility: Visibility,
    ) -> FlareFrame {
        let config = &self.prepared.config;
        let visibility = visibility.resolve(config.projector.occlusion_fail_open);
        if visibility <= 0.0 || !light.reaches(camera.position) {
            return FlareFrame::default();
        }

        let target = light.apparent_position(camera);
        let angle = camera.angle_to(target);
        if angle > FRAC_PI_2 {
            return FlareFrame::default();
        }
        let Some(ndc) = camera.project_to_ndc(target) else {
            return FlareFrame::default();
        };

        let aspect = if camera.aspect > 0.0 { camera.aspect } else { 1.0 };
        let axis = screen_axis(ndc, aspect);
        let lighting = GhostLighting {
            angle_to_light: angle as f64,
            light_color: light.color.as_dvec3(),
            light_intensity: light.intensity as f64,
        };

        let ghosts = self
            .prepared
            .ghosts
            .iter()
            .enumerate()
            .filter_map(|(ghost_index, ghost)| {
                let g = evaluate_ghost(
                    ghost,
                    &self.prepared.lens_system,
                    &lighting,
                    &config.photometry,
                )?;
                let center = g.center as f32;
                let radius = g.radius as f32;
                Some(FlareDrawDescriptor {
                    ghost_index,
                    center: Vec2::new(axis.x / aspect, axis.y) * center,
                    scale: Vec2::new(radius / aspect, radius),
                    radius,
                    color: g.color.as_vec3() * visibility,
                    intensity: g.intensity as f32 * visibility,
                })
            })
            .collect();

        let base = config.projector.starburst_base_size * visibility;
        let tint = light.color * Vec3::from(self.prepared.transmittance.sample(angle as f64));
        let starburst = StarburstDrawDescriptor {
            center: ndc,
            scale: Vec2::new(base / aspect, base),
            rotation: if axis == Vec2::ZERO {
                0.0
            } else {
                axis.y.atan2(axis.x)
            },
            angle_to_light: angle,
            tint,
            intensity: light.intensity * visibility,
        };

        FlareFrame {
            ghosts,
            starburst: Some(starburst),
        }
    }

    /// Project every light independently, in parallel; output order follows `lights`.
    pub fn project_many(
        &self,
        lights: &[(LightState, Visibility)],
        camera: &CameraState,
    ) -> Vec<FlareFrame> {
        lights
            .par_iter()
            .map(|(light, visibility)| self.project(light, camera, *visibility))
            .collect()
    }
}

// src/aperture/mask.rs
// Smooth signed-distance rasterization of an n-bladed diaphragm
// RELEVANT FILES: src/aperture/mod.rs, src/aperture/spectrum.rs

use glam::Vec2;
use std::f32::consts::{PI, TAU};

use super::{ApertureMask, ScalarGrid};
use crate::error::{FlareError, FlareResult};

/// Fewest and most diaphragm blades a shape may have
pub const MIN_EDGE_COUNT: u32 = 3;
pub const MAX_EDGE_COUNT: u32 = 16;

/// Smoothing radius at `smoothing = 1`, in normalised aperture units
const POLYGON_SMOOTHING_SCALE: f32 = 0.5;

/// Blend width between the polygon and its circumscribing circle
const CIRCLE_BLEND: f32 = 0.05;

/// Exponent that sharpens the coverage ramp at the blade edges
const EDGE_SHARPNESS: i32 = 64;

/// Geometry of one aperture rasterization
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApertureShape {
    pub edge_count: u32,
    pub smoothing: f32,
    pub rotation: f32,
    /// Pixel-space zoom; `2.0` shrinks the aperture to half the grid
    pub scale: f32,
}

impl ApertureShape {
    pub fn validate(&self) -> FlareResult<()> {
        if !(MIN_EDGE_COUNT..=MAX_EDGE_COUNT).contains(&self.edge_count) {
            return Err(FlareError::config(format!(
                "aperture.edge_count must be in {MIN_EDGE_COUNT}..={MAX_EDGE_COUNT}, got {}",
                self.edge_count
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(FlareError::config(format!(
                "aperture.smoothing must be in [0, 1], got {}",
                self.smoothing
            )));
        }
        if !self.rotation.is_finite() {
            return Err(FlareError::config("aperture.rotation must be finite"));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(FlareError::config("aperture scale must be finite and > 0"));
        }
        Ok(())
    }

    /// Blade edge normals, scaled so the polygon's vertices sit on the unit circle
    pub fn edge_axes(&self) -> Vec<Vec2> {
        let n = self.edge_count as f32;
        let inv_apothem = 1.0 / (PI / n).cos();
        (0..self.edge_count)
            .map(|k| Vec2::from_angle(self.rotation + TAU * k as f32 / n) * inv_apothem)
            .collect()
    }
}

/// Polynomial smooth minimum; `k <= 0` is a hard minimum
#[inline]
fn smooth_min(a: f32, b: f32, k: f32) -> f32 {
    if k <= 0.0 {
        return a.min(b);
    }
    let h = (0.5 + 0.5 * (b - a) / k).clamp(0.0, 1.0);
    b * (1.0 - h) + a * h - k * h * (1.0 - h)
}

#[inline]
fn smooth_max(a: f32, b: f32, k: f32) -> f32 {
    -smooth_min(-a, -b, k)
}

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Coverage of point `p` (aperture radius 1) by the rounded polygon.
///
/// `axes` comes from [`ApertureShape::edge_axes`]; it is passed in so callers can
/// reuse it across a whole grid.
pub fn aperture_coverage(p: Vec2, shape: &ApertureShape, axes: &[Vec2]) -> f32 {
    let k = shape.smoothing * POLYGON_SMOOTHING_SCALE;
    let polygon = axes
        .iter()
        .map(|axis| p.dot(*axis))
        .reduce(|acc, d| smooth_max(acc, d, k))
        .unwrap_or(0.0);

    let inside_polygon = 1.0 - polygon;
    let inside_circle = 1.0 - p.length();
    let inside = smooth_min(inside_polygon, inside_circle, CIRCLE_BLEND).clamp(0.0, 1.0);

    smoothstep(0.0, 1.0, 1.0 - (1.0 - inside).powi(EDGE_SHARPNESS))
}

/// Rasterize the aperture into a `resolution x resolution` coverage grid.
pub fn build_aperture_mask(shape: &ApertureShape, resolution: usize) -> FlareResult<ApertureMask> {
    shape.validate()?;
    if resolution == 0 {
        return Err(FlareError::config("aperture resolution must be > 0"));
    }

    let axes = shape.edge_axes();
    let inv = 1.0 / resolution as f32;
    Ok(ScalarGrid::from_fn(resolution, |x, y| {
        let uv = Vec2::new((x as f32 + 0.5) * inv, (y as f32 + 0.5) * inv);
        let p = (uv * 2.0 - Vec2::ONE) * shape.scale;
        aperture_coverage(p, shape, &axes)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hexagon(scale: f32) -> ApertureShape {
        ApertureShape {
            edge_count: 6,
            smoothing: 0.1,
            rotation: 0.0,
            scale,
        }
    }

    #[test]
    fn test_centre_open_corners_closed() {
        let mask = build_aperture_mask(&hexagon(1.0), 64).unwrap();
        assert!(mask.get(32, 32) > 0.99);
        assert_eq!(mask.get(0, 0), 0.0);
        assert_eq!(mask.get(63, 63), 0.0);
        assert!(mask.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_even_blade_count_is_point_symmetric() {
        let mask = build_aperture_mask(&hexagon(1.0), 32).unwrap();
        for y in 0..32 {
            for x in 0..32 {
                let a = mask.get(x, y);
                let b = mask.get(31 - x, 31 - y);
                assert!((a - b).abs() < 1e-4, "({x},{y}): {a} vs {b}");
            }
        }
    }

    #[test]
    fn test_fft_scale_shrinks_aperture() {
        let full = build_aperture_mask(&hexagon(1.0), 64).unwrap();
        let half = build_aperture_mask(&hexagon(2.0), 64).unwrap();
        let area = |m: &ApertureMask| m.values().iter().sum::<f32>();
        let ratio = area(&half) / area(&full);
        // linear size halves, so area drops to about a quarter
        assert!((ratio - 0.25).abs() < 0.05, "ratio = {ratio}");
        // nothing outside the central half survives
        assert_eq!(half.get(8, 32), 0.0);
    }

    #[test]
    fn test_blades_cut_the_circle() {
        let shape = ApertureShape {
            smoothing: 0.0,
            ..hexagon(1.0)
        };
        let axes = shape.edge_axes();
        // flat blade at cos(30deg) ~ 0.866 along its normal, corners reach the circle
        assert_eq!(aperture_coverage(Vec2::new(0.95, 0.0), &shape, &axes), 0.0);
        let corner = Vec2::from_angle(TAU / 12.0) * 0.9;
        assert!(aperture_coverage(corner, &shape, &axes) > 0.99);
        assert!(aperture_coverage(Vec2::ZERO, &shape, &axes) > 0.99);
    }

    #[test]
    fn test_invalid_shapes_rejected() {
        let triangle_minus = ApertureShape {
            edge_count: 2,
            ..hexagon(1.0)
        };
        assert!(build_aperture_mask(&triangle_minus, 16).is_err());
        let fan = ApertureShape {
            edge_count: u32::MAX,
            ..hexagon(1.0)
        };
        assert!(fan.validate().is_err());
        let most = ApertureShape {
            edge_count: MAX_EDGE_COUNT,
            ..hexagon(1.0)
        };
        assert!(most.validate().is_ok());
        let rough = ApertureShape {
            smoothing: 1.5,
            ..hexagon(1.0)
        };
        assert!(rough.validate().is_err());
    }
}

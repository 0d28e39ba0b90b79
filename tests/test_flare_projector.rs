// tests/test_flare_projector.rs
// Per-frame projection of prepared ghosts for different light kinds and camera poses

use glam::{Vec2, Vec3};
use lensflare::{
    prepare, CameraState, FlareConfig, LightState, PreparedFlare, Visibility,
};

fn prepared() -> PreparedFlare {
    let mut config = FlareConfig::default();
    config.aperture.resolution = 32;
    prepare(&config).expect("default lens prepares")
}

fn camera(aspect: f32) -> CameraState {
    CameraState::look_at(
        Vec3::new(0.0, 1.0, 5.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::Y,
        50f32.to_radians(),
        aspect,
        0.1,
        1000.0,
    )
}

#[test]
fn test_on_axis_light_centres_every_ghost() {
    let prepared = prepared();
    let cam = camera(16.0 / 9.0);
    for light in [
        LightState::point(Vec3::new(0.0, 1.0, -100.0)),
        LightState::directional(Vec3::Z),
    ] {
        let frame = prepared.projector().project(&light, &cam, Visibility::Unknown);
        assert_eq!(frame.ghosts.len(), prepared.ghosts.len());
        for g in &frame.ghosts {
            assert!(g.center.length() < 1e-5, "{:?}", g.center);
            assert!(g.radius > 0.0);
        }
    }
}

#[test]
fn test_lights_behind_camera_are_skipped() {
    let prepared = prepared();
    let cam = camera(1.5);
    let projector = prepared.projector();

    let behind = LightState::point(Vec3::new(0.5, 1.0, 40.0));
    assert!(projector.project(&behind, &cam, Visibility::Unknown).is_empty());

    // sun shining along the view direction sits behind the camera
    let sun = LightState::directional(Vec3::NEG_Z);
    assert!(projector.project(&sun, &cam, Visibility::Unknown).is_empty());
}

#[test]
fn test_spot_and_range_limits() {
    let prepared = prepared();
    let cam = camera(1.5);
    let projector = prepared.projector();

    let facing = LightState::spot(Vec3::new(0.0, 1.0, -20.0), Vec3::Z, 0.4);
    assert!(!projector.project(&facing, &cam, Visibility::Unknown).is_empty());

    let turned_away = LightState::spot(Vec3::new(0.0, 1.0, -20.0), Vec3::NEG_Z, 0.4);
    assert!(projector.project(&turned_away, &cam, Visibility::Unknown).is_empty());

    let mut short = LightState::point(Vec3::new(0.0, 1.0, -20.0));
    short.range = Some(10.0);
    assert!(projector.project(&short, &cam, Visibility::Unknown).is_empty());
}

#[test]
fn test_off_axis_ghosts_spread_along_axis() {
    let prepared = prepared();
    let cam = camera(2.0);
    let light = LightState::point(Vec3::new(-6.0, -2.0, -30.0));
    let frame = prepared.projector().project(&light, &cam, Visibility::Factor(1.0));
    let star = frame.starburst.expect("visible light has a starburst");
    let axis = Vec2::new(star.center.x * cam.aspect, star.center.y).normalize();

    assert!(frame.ghosts.iter().any(|g| g.center.length() > 1e-3));
    for g in &frame.ghosts {
        let p = Vec2::new(g.center.x * cam.aspect, g.center.y);
        assert!(p.perp_dot(axis).abs() < 1e-4);
    }
    assert!((star.rotation - axis.y.atan2(axis.x)).abs() < 1e-5);
    assert!(star.angle_to_light > 0.0);
    // the tint comes from the normalised transmission response
    assert!(star.tint.to_array().iter().all(|c| (0.0..=1.0).contains(c)));
}

#[test]
fn test_descriptors_reference_prepared_ghosts_in_order() {
    let prepared = prepared();
    let cam = camera(1.0);
    let light = LightState::point(Vec3::new(2.0, 3.0, -50.0));
    let frame = prepared.projector().project(&light, &cam, Visibility::Unknown);
    let indices: Vec<_> = frame.ghosts.iter().map(|g| g.ghost_index).collect();
    assert!(indices.windows(2).all(|w| w[0] < w[1]));
    assert!(indices.iter().all(|&i| i < prepared.ghosts.len()));
    for g in &frame.ghosts {
        assert!(g.intensity > 0.0 && g.intensity <= 1.0);
    }
}

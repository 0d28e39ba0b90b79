// tests/test_model_recompute.rs
// Prepare-stage idempotence and atomic state replacement on recompute

use std::sync::Arc;
use std::thread;

use glam::Vec3;
use lensflare::optics::{LensInterface, Medium};
use lensflare::{
    prepare, CameraState, FlareConfig, FlareError, LensFlareModel, LightState, Visibility,
};

fn config(resolution: usize) -> FlareConfig {
    let mut config = FlareConfig::default();
    config.aperture.resolution = resolution;
    config
}

#[test]
fn test_prepare_is_idempotent() {
    let cfg = config(32);
    let a = prepare(&cfg).unwrap();
    let b = prepare(&cfg).unwrap();
    assert_eq!(a.lens_system, b.lens_system);
    assert_eq!(a.ghosts, b.ghosts);
    assert_eq!(a.aperture_spectrum(), b.aperture_spectrum());
    assert_eq!(a.transmittance, b.transmittance);
}

#[test]
fn test_rejected_config_keeps_previous_state() {
    let model = LensFlareModel::new(&config(32)).unwrap();
    let before = model.snapshot();

    let mut bad = config(32);
    bad.lens.before_aperture[2] = LensInterface::curved(1.0, 0.0, Medium::Air);
    assert_eq!(
        model.recompute(&bad),
        Err(FlareError::ZeroCurvatureRadius { index: 2 })
    );

    let mut bad = config(32);
    bad.aperture.resolution = 100;
    assert!(model.recompute(&bad).is_err());

    // a blur kernel wider than the texture is refused instead of overflowing
    let mut bad = config(32);
    bad.spectrum.blur_sigma = 1e5;
    assert!(model.recompute(&bad).is_err());

    let after = model.snapshot();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(model.config(), config(32));
}

#[test]
fn test_recompute_changes_projection() {
    let model = LensFlareModel::new(&config(32)).unwrap();
    let cam = CameraState::look_at(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 1.0, 1.0, 0.1, 100.0);
    let light = LightState::point(Vec3::new(1.0, 1.0, -20.0));
    let wide_open = model.project(&light, &cam, Visibility::Unknown);

    let mut stopped_down = config(32);
    stopped_down.photometry.f_number = 8.0;
    model.recompute(&stopped_down).unwrap();
    let narrow = model.project(&light, &cam, Visibility::Unknown);

    let total = |f: &lensflare::FlareFrame| f.ghosts.iter().map(|g| g.intensity).sum::<f32>();
    assert!(total(&narrow) < total(&wide_open));
}

#[test]
fn test_readers_never_see_partial_state() {
    let full = config(16);
    let model = LensFlareModel::new(&full).unwrap();
    let mut without_rear = config(16);
    without_rear.lens.after_aperture.clear();
    without_rear.aperture.edge_count = 7;

    thread::scope(|scope| {
        scope.spawn(|| {
            for k in 0..20 {
                let cfg = if k % 2 == 0 { &without_rear } else { &full };
                model.recompute(cfg).unwrap();
            }
        });
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let snap = model.snapshot();
                    // ghost list always matches the lens it was derived from
                    let expected = if snap.config.lens.after_aperture.is_empty() { 10 } else { 13 };
                    assert_eq!(snap.ghosts.len(), expected);
                    assert_eq!(
                        snap.config.aperture.edge_count,
                        if expected == 10 { 7 } else { 6 }
                    );
                }
            });
        }
    });
}

// Host-side tests for scripted light motion and lightning flicker.

use glam::Vec3;
use rand::prelude::*;
use storm_core::lights::{update, Flicker, FlickerState, LightKind};
use storm_core::{LightMotionController, LightState};

fn storm_light(probability: f32) -> LightState {
    LightState::fixed_at(LightKind::Directional, Vec3::new(-6.0, 30.0, -20.0), 0.15).with_flicker(
        Flicker {
            probability_per_tick: probability,
            duration_ms: 120.0,
            flash_intensity: 6.0,
            state: FlickerState::Idle,
        },
    )
}

#[test]
fn orbiting_light_stays_on_its_circle() {
    let mut ctrl =
        LightMotionController::with_default_seed(vec![LightState::orbiting(8.0, 6.0, 0.5, 1.0)])
            .unwrap();
    for i in 0..2000 {
        let t = i as f32 * 0.37;
        ctrl.update(t);
        let p = ctrl.lights()[0].position;
        let r = (p.x * p.x + p.z * p.z).sqrt();
        assert!((r - 8.0).abs() < 1e-4, "radius drifted to {r} at t={t}");
        assert_eq!(p.y, 6.0);
    }
}

#[test]
fn orbit_follows_sin_cos_parametrisation() {
    let mut light = LightState::orbiting(3.0, 2.0, 1.0, 1.0);
    let mut rng = StdRng::seed_from_u64(0);
    update(&mut light, std::f32::consts::FRAC_PI_2, &mut rng);
    assert!((light.position - Vec3::new(3.0, 2.0, 0.0)).length() < 1e-5);
    update(&mut light, 0.0, &mut rng);
    assert!((light.position - Vec3::new(0.0, 2.0, 3.0)).length() < 1e-5);
}

#[test]
fn fixed_light_never_moves() {
    let at = Vec3::new(10.0, 10.0, -10.0);
    let mut ctrl = LightMotionController::with_default_seed(vec![LightState::fixed_at(
        LightKind::Directional,
        at,
        1.0,
    )])
    .unwrap();
    for i in 0..100 {
        ctrl.update(i as f32 * 1.7);
        assert!((ctrl.lights()[0].position - at).length() < 1e-4);
    }
}

#[test]
fn spread_phases_separates_shared_paths() {
    let mut ctrl = LightMotionController::with_default_seed(vec![
        LightState::fixed_at(LightKind::Directional, Vec3::new(0.0, 20.0, 5.0), 1.0),
        LightState::orbiting(8.0, 6.0, 0.5, 1.0),
        LightState::orbiting(8.0, 6.0, 0.5, 1.0),
    ])
    .unwrap();
    ctrl.spread_phases();
    ctrl.update(4.0);
    let l = ctrl.lights();
    // Two movers end up on opposite sides of the circle.
    assert!((l[1].position + l[2].position - Vec3::new(0.0, 12.0, 0.0)).length() < 1e-4);
    // The parked light keeps its own phase.
    assert!((l[0].position - Vec3::new(0.0, 20.0, 5.0)).length() < 1e-4);
}

#[test]
fn certain_flicker_flashes_on_the_first_tick() {
    let mut light = storm_light(1.0);
    let mut rng = StdRng::seed_from_u64(1);
    update(&mut light, 0.0, &mut rng);
    assert!(light.is_flashing());
    assert_eq!(light.intensity, 6.0);
}

#[test]
fn pending_flash_is_not_retriggered() {
    let mut light = storm_light(1.0);
    let mut rng = StdRng::seed_from_u64(1);
    update(&mut light, 1.0, &mut rng);
    update(&mut light, 1.05, &mut rng);
    update(&mut light, 1.1, &mut rng);
    assert_eq!(
        light.flicker.map(|f| f.state),
        Some(FlickerState::Flashing { since: 1.0 })
    );
}

#[test]
fn flash_restores_base_intensity_after_duration() {
    let mut light = storm_light(1.0);
    let mut rng = StdRng::seed_from_u64(1);
    update(&mut light, 2.0, &mut rng);
    assert!(light.is_flashing());

    if let Some(f) = light.flicker.as_mut() {
        f.probability_per_tick = 0.0;
    }
    update(&mut light, 2.05, &mut rng);
    assert!(light.is_flashing());
    assert_eq!(light.intensity, 6.0);

    update(&mut light, 2.2, &mut rng);
    assert!(!light.is_flashing());
    assert_eq!(light.intensity, 0.15);
}

#[test]
fn zero_probability_never_flashes() {
    let mut ctrl = LightMotionController::new(vec![storm_light(0.0)], 5).unwrap();
    for i in 0..10_000 {
        ctrl.update(i as f32 / 60.0);
        assert!(!ctrl.lights()[0].is_flashing());
        assert_eq!(ctrl.lights()[0].intensity, 0.15);
    }
}

#[test]
fn flashes_never_overlap() {
    let mut ctrl = LightMotionController::new(vec![storm_light(0.05)], 77).unwrap();
    let mut last_start: Option<f32> = None;
    let mut flashes = 0;
    for i in 0..20_000 {
        let t = i as f32 / 60.0;
        ctrl.update(t);
        if let Some(Flicker {
            state: FlickerState::Flashing { since },
            ..
        }) = ctrl.lights()[0].flicker
        {
            if last_start != Some(since) {
                if let Some(prev) = last_start {
                    assert!((since - prev) * 1000.0 >= 120.0);
                }
                last_start = Some(since);
                flashes += 1;
            }
        }
    }
    assert!(flashes > 0);
}

#[test]
fn same_seed_gives_same_flashes() {
    let mut a = LightMotionController::new(vec![storm_light(0.02)], 99).unwrap();
    let mut b = LightMotionController::new(vec![storm_light(0.02)], 99).unwrap();
    for i in 0..5000 {
        let t = i as f32 / 60.0;
        a.update(t);
        b.update(t);
        assert_eq!(a.lights(), b.lights());
    }
}

#[test]
fn out_of_range_probability_is_rejected() {
    assert!(LightMotionController::with_default_seed(vec![storm_light(1.5)]).is_err());
    assert!(LightMotionController::with_default_seed(vec![storm_light(-0.1)]).is_err());
}

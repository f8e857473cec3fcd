// Host-side tests for the rain pool.

use glam::{Vec2, Vec3};
use rand::prelude::*;
use storm_core::particles::{
    advance, Particle, RecycleContext, RespawnHeight, SpawnBounds,
};
use storm_core::{ParticlePool, RainConfig, RecyclePolicy};

fn drop_at(x: f32, y: f32, z: f32, velocity: f32) -> Particle {
    Particle {
        position: Vec3::new(x, y, z),
        fall_velocity: velocity,
        spawn_height: 50.0,
        ground_level: 0.0,
        recycles: 0,
    }
}

#[test]
fn pool_size_never_changes() {
    let mut pool = ParticlePool::new(RainConfig::default()).unwrap();
    let n = pool.len();
    assert_eq!(n, 5000);
    for _ in 0..1000 {
        pool.advance(1.0);
        assert_eq!(pool.len(), n);
    }
}

#[test]
fn initial_drops_start_inside_the_column() {
    let cfg = RainConfig::default();
    let pool = ParticlePool::new(cfg.clone()).unwrap();
    for p in pool.particles() {
        assert!(cfg.bounds.contains(p.position.x, p.position.z));
        assert!(p.position.y >= cfg.ground_level && p.position.y < cfg.spawn_height);
        assert!(p.fall_velocity < 0.0);
    }
}

#[test]
fn every_drop_recycles_at_least_once_in_250_ticks() {
    let cfg = RainConfig {
        count: 10_000,
        fall_speed: (0.2, 0.7),
        policy: RecyclePolicy::ResetHeightOnly,
        seed: 42,
        ..RainConfig::default()
    };
    let mut pool = ParticlePool::new(cfg).unwrap();
    for _ in 0..250 {
        pool.advance(1.0);
    }
    assert_eq!(pool.len(), 10_000);
    let stragglers = pool.particles().iter().filter(|p| p.recycles == 0).count();
    assert_eq!(stragglers, 0);
}

#[test]
fn height_only_recycle_keeps_the_column() {
    // Speeds that do not divide the 50 unit column, so the crossing is strict.
    for &v in &[0.3f32, 0.45, 0.7, 1.3] {
        let start = drop_at(3.25, 50.0, -7.5, -v);
        let mut pool = ParticlePool::from_particles(vec![start], RainConfig::default()).unwrap();
        let ticks = (50.0 / v).ceil() as usize;

        for _ in 0..ticks - 1 {
            pool.advance(1.0);
        }
        assert_eq!(pool.particles()[0].recycles, 0, "v={v} recycled early");

        pool.advance(1.0);
        let p = pool.particles()[0];
        assert_eq!(p.recycles, 1, "v={v} never recycled");
        assert_eq!(p.position.y, 50.0);
        assert_eq!(p.position.x.to_bits(), 3.25f32.to_bits());
        assert_eq!(p.position.z.to_bits(), (-7.5f32).to_bits());
        assert_eq!(p.fall_velocity, -v);
    }
}

#[test]
fn landing_exactly_on_the_ground_is_not_a_recycle() {
    let mut pool =
        ParticlePool::from_particles(vec![drop_at(0.0, 1.0, 0.0, -0.5)], RainConfig::default())
            .unwrap();
    assert_eq!(pool.advance(2.0), 0);
    assert_eq!(pool.particles()[0].position.y, 0.0);
    assert_eq!(pool.advance(1.0), 1);
}

#[test]
fn full_position_recycle_stays_in_bounds() {
    let bounds = SpawnBounds {
        min: Vec2::new(-4.0, 10.0),
        max: Vec2::new(2.0, 12.0),
    };
    let cfg = RainConfig {
        count: 500,
        bounds,
        fall_speed: (0.5, 1.5),
        policy: RecyclePolicy::ResetFullPosition,
        ..RainConfig::default()
    };
    let mut pool = ParticlePool::new(cfg).unwrap();
    for _ in 0..300 {
        pool.advance(1.0);
        for p in pool.particles() {
            assert!(bounds.contains(p.position.x, p.position.z));
        }
    }
    assert!(pool.particles().iter().all(|p| p.recycles > 0));
}

#[test]
fn redrawn_velocities_stay_in_range() {
    let cfg = RainConfig {
        count: 200,
        fall_speed: (0.2, 0.7),
        redraw_velocity_on_recycle: true,
        ..RainConfig::default()
    };
    let mut pool = ParticlePool::new(cfg).unwrap();
    for _ in 0..400 {
        pool.advance(1.0);
    }
    for p in pool.particles() {
        assert!(p.fall_velocity <= -0.2 && p.fall_velocity >= -0.7);
    }
}

#[test]
fn jittered_respawn_lands_inside_the_column() {
    let cfg = RainConfig {
        count: 300,
        fall_speed: (1.0, 2.0),
        respawn: RespawnHeight::Jittered,
        ..RainConfig::default()
    };
    let mut pool = ParticlePool::new(cfg).unwrap();
    for _ in 0..200 {
        pool.advance(1.0);
        for p in pool.particles() {
            assert!(p.position.y >= 0.0 && p.position.y <= 50.0);
        }
    }
}

#[test]
fn same_seed_gives_same_rain() {
    let cfg = RainConfig {
        count: 64,
        fall_speed: (0.2, 0.7),
        policy: RecyclePolicy::ResetFullPosition,
        redraw_velocity_on_recycle: true,
        ..RainConfig::default()
    };
    let mut a = ParticlePool::new(cfg.clone()).unwrap();
    let mut b = ParticlePool::new(cfg).unwrap();
    for _ in 0..300 {
        a.advance(1.0);
        b.advance(1.0);
    }
    assert_eq!(a.particles(), b.particles());
}

#[test]
fn dt_equivalent_scales_the_fall() {
    let mut pool =
        ParticlePool::from_particles(vec![drop_at(0.0, 40.0, 0.0, -0.25)], RainConfig::default())
            .unwrap();
    pool.advance(2.0);
    assert!((pool.particles()[0].position.y - 39.5).abs() < 1e-6);
    pool.advance(0.0);
    assert!((pool.particles()[0].position.y - 39.5).abs() < 1e-6);
}

#[test]
fn free_advance_reports_recycle_count() {
    let mut drops = vec![
        drop_at(0.0, 0.05, 0.0, -0.1),
        drop_at(1.0, 20.0, 1.0, -0.1),
        drop_at(2.0, 0.01, 2.0, -0.3),
    ];
    let mut rng = StdRng::seed_from_u64(9);
    let mut ctx = RecycleContext {
        policy: RecyclePolicy::ResetHeightOnly,
        respawn: RespawnHeight::Fixed,
        bounds: SpawnBounds::centered(25.0),
        fall_speed: None,
        rng: &mut rng,
    };
    assert_eq!(advance(&mut drops, 1.0, &mut ctx), 2);
    assert_eq!(drops[0].position.y, 50.0);
    assert_eq!(drops[2].position.y, 50.0);
    assert!((drops[1].position.y - 19.9).abs() < 1e-5);
}

#[test]
fn write_positions_reuses_the_buffer() {
    let pool = ParticlePool::new(RainConfig {
        count: 32,
        ..RainConfig::default()
    })
    .unwrap();
    let mut out = vec![[9.0; 3]; 100];
    pool.write_positions(&mut out);
    assert_eq!(out.len(), 32);
    assert_eq!(out[5], pool.particles()[5].position.to_array());
}

#[test]
fn invalid_configs_are_rejected() {
    let empty = RainConfig {
        count: 0,
        ..RainConfig::default()
    };
    assert!(ParticlePool::new(empty).is_err());

    let upside_down = RainConfig {
        spawn_height: -1.0,
        ..RainConfig::default()
    };
    assert!(ParticlePool::new(upside_down).is_err());

    let frozen = RainConfig {
        fall_speed: (0.0, 0.0),
        ..RainConfig::default()
    };
    assert!(ParticlePool::new(frozen).is_err());

    assert!(ParticlePool::from_particles(Vec::new(), RainConfig::default()).is_err());
    assert!(ParticlePool::from_particles(
        vec![drop_at(0.0, 10.0, 0.0, 0.2)],
        RainConfig::default()
    )
    .is_err());

    // Explicit drops are held to the same config rules as a generated pool.
    let inverted_speeds = RainConfig {
        fall_speed: (0.7, 0.2),
        redraw_velocity_on_recycle: true,
        ..RainConfig::default()
    };
    assert!(
        ParticlePool::from_particles(vec![drop_at(0.0, 10.0, 0.0, -0.5)], inverted_speeds)
            .is_err()
    );

    let buried = Particle {
        spawn_height: 0.0,
        ground_level: 10.0,
        ..drop_at(0.0, 5.0, 0.0, -0.5)
    };
    let jittered = RainConfig {
        respawn: RespawnHeight::Jittered,
        ..RainConfig::default()
    };
    assert!(ParticlePool::from_particles(vec![buried], jittered).is_err());
    assert!(ParticlePool::from_particles(vec![buried], RainConfig::default()).is_err());
}

#[test]
fn explicit_pool_reports_its_own_size() {
    let drops = vec![drop_at(0.0, 10.0, 0.0, -0.5), drop_at(1.0, 20.0, 1.0, -0.5)];
    let pool = ParticlePool::from_particles(drops, RainConfig::default()).unwrap();
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.config().count, 2);
}

//! Fixed-capacity rain pool.
//!
//! Drops are never created or destroyed after construction; a drop that falls
//! through the ground is moved back to the top according to the pool's
//! `RecyclePolicy`.

use crate::constants::{
    RAIN_COUNT, RAIN_FALL_SPEED, RAIN_GROUND_LEVEL, RAIN_HALF_EXTENT, RAIN_SEED,
    RAIN_SPAWN_HEIGHT,
};
use crate::error::{invalid, Result};
use glam::{Vec2, Vec3};
use rand::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// Signed per-tick displacement along y; always negative.
    pub fall_velocity: f32,
    pub spawn_height: f32,
    pub ground_level: f32,
    /// How many times this drop has been recycled.
    pub recycles: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecyclePolicy {
    /// Restore `y` only; the drop falls again along the same column.
    #[default]
    ResetHeightOnly,
    /// Also redraw `x`/`z` inside the pool bounds.
    ResetFullPosition,
}

/// Height a recycled drop restarts from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RespawnHeight {
    /// Exactly `spawn_height`.
    #[default]
    Fixed,
    /// Uniform in `[ground_level, spawn_height]`, which spreads drops back out
    /// over the whole column.
    Jittered,
}

/// Axis-aligned horizontal rectangle drops are spawned in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl SpawnBounds {
    pub fn centered(half_extent: f32) -> Self {
        Self {
            min: Vec2::splat(-half_extent),
            max: Vec2::splat(half_extent),
        }
    }

    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.y && z <= self.max.y
    }

    fn sample(&self, rng: &mut StdRng) -> (f32, f32) {
        (
            rng.gen_range(self.min.x..=self.max.x),
            rng.gen_range(self.min.y..=self.max.y),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RainConfig {
    pub count: usize,
    pub bounds: SpawnBounds,
    pub spawn_height: f32,
    pub ground_level: f32,
    /// Fall speed magnitude range (per reference frame); `min == max` gives a
    /// uniform speed.
    pub fall_speed: (f32, f32),
    pub policy: RecyclePolicy,
    pub respawn: RespawnHeight,
    pub redraw_velocity_on_recycle: bool,
    pub seed: u64,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            count: RAIN_COUNT,
            bounds: SpawnBounds::centered(RAIN_HALF_EXTENT),
            spawn_height: RAIN_SPAWN_HEIGHT,
            ground_level: RAIN_GROUND_LEVEL,
            fall_speed: (RAIN_FALL_SPEED, RAIN_FALL_SPEED),
            policy: RecyclePolicy::ResetHeightOnly,
            respawn: RespawnHeight::Fixed,
            redraw_velocity_on_recycle: false,
            seed: RAIN_SEED,
        }
    }
}

impl RainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(invalid("rain pool must hold at least one drop"));
        }
        if self.spawn_height <= self.ground_level {
            return Err(invalid(format!(
                "spawn height {} must be above ground level {}",
                self.spawn_height, self.ground_level
            )));
        }
        let (lo, hi) = self.fall_speed;
        if !(lo > 0.0 && hi >= lo) {
            return Err(invalid(format!("fall speed range ({lo}, {hi}) is not positive")));
        }
        if self.bounds.min.x > self.bounds.max.x || self.bounds.min.y > self.bounds.max.y {
            return Err(invalid("rain bounds are inverted"));
        }
        Ok(())
    }
}

/// Everything `advance` needs besides the particles themselves.
pub struct RecycleContext<'a> {
    pub policy: RecyclePolicy,
    pub respawn: RespawnHeight,
    pub bounds: SpawnBounds,
    pub fall_speed: Option<(f32, f32)>,
    pub rng: &'a mut StdRng,
}

/// Move every drop by `fall_velocity * dt_equivalent` and recycle the ones
/// that dropped below their ground level. Returns how many were recycled.
pub fn advance(pool: &mut [Particle], dt_equivalent: f32, ctx: &mut RecycleContext<'_>) -> usize {
    let mut recycled = 0;
    for p in pool.iter_mut() {
        p.position.y += p.fall_velocity * dt_equivalent;
        if p.position.y >= p.ground_level {
            continue;
        }
        p.position.y = match ctx.respawn {
            RespawnHeight::Fixed => p.spawn_height,
            RespawnHeight::Jittered => ctx.rng.gen_range(p.ground_level..=p.spawn_height),
        };
        if ctx.policy == RecyclePolicy::ResetFullPosition {
            let (x, z) = ctx.bounds.sample(ctx.rng);
            p.position.x = x;
            p.position.z = z;
        }
        if let Some((lo, hi)) = ctx.fall_speed {
            p.fall_velocity = -ctx.rng.gen_range(lo..=hi);
        }
        p.recycles += 1;
        recycled += 1;
    }
    recycled
}

pub struct ParticlePool {
    particles: Vec<Particle>,
    config: RainConfig,
    rng: StdRng,
}

impl ParticlePool {
    pub fn new(config: RainConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let (lo, hi) = config.fall_speed;
        let particles = (0..config.count)
            .map(|_| {
                let (x, z) = config.bounds.sample(&mut rng);
                let y = rng.gen_range(config.ground_level..config.spawn_height);
                Particle {
                    position: Vec3::new(x, y, z),
                    fall_velocity: -rng.gen_range(lo..=hi),
                    spawn_height: config.spawn_height,
                    ground_level: config.ground_level,
                    recycles: 0,
                }
            })
            .collect::<Vec<_>>();
        log::info!(
            "[rain] pool of {} drops, speed {:.2}..{:.2}, policy {:?}",
            particles.len(),
            lo,
            hi,
            config.policy
        );
        Ok(Self {
            particles,
            config,
            rng,
        })
    }

    /// Build a pool from explicit particles (e.g. a scripted scenario).
    /// The config's `count` is replaced by the number of particles given.
    pub fn from_particles(particles: Vec<Particle>, mut config: RainConfig) -> Result<Self> {
        config.count = particles.len();
        config.validate()?;
        if let Some(p) = particles.iter().find(|p| !(p.fall_velocity < 0.0)) {
            return Err(invalid(format!(
                "fall velocity must be negative, got {}",
                p.fall_velocity
            )));
        }
        if let Some(p) = particles.iter().find(|p| p.spawn_height <= p.ground_level) {
            return Err(invalid(format!(
                "drop spawn height {} must be above its ground level {}",
                p.spawn_height, p.ground_level
            )));
        }
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            particles,
            config,
            rng,
        })
    }

    pub fn advance(&mut self, dt_equivalent: f32) -> usize {
        let mut ctx = RecycleContext {
            policy: self.config.policy,
            respawn: self.config.respawn,
            bounds: self.config.bounds,
            fall_speed: self
                .config
                .redraw_velocity_on_recycle
                .then_some(self.config.fall_speed),
            rng: &mut self.rng,
        };
        advance(&mut self.particles, dt_equivalent, &mut ctx)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &RainConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Flatten positions into `out` for vertex upload, reusing its allocation.
    pub fn write_positions(&self, out: &mut Vec<[f32; 3]>) {
        out.clear();
        out.extend(self.particles.iter().map(|p| p.position.to_array()));
    }
}

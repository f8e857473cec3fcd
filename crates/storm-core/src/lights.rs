//! Scripted light motion and lightning flicker.

use crate::constants::{
    FLICKER_SEED, LIGHTNING_DURATION_MS, LIGHTNING_FLASH_INTENSITY, LIGHTNING_PROBABILITY,
};
use crate::error::{invalid, Result};
use glam::Vec3;
use rand::prelude::*;
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightKind {
    #[default]
    Point,
    /// Shines from `position` towards the origin.
    Directional,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FlickerState {
    Idle,
    /// Flash started at `since` seconds of elapsed time.
    Flashing { since: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flicker {
    pub probability_per_tick: f32,
    pub duration_ms: f32,
    pub flash_intensity: f32,
    pub state: FlickerState,
}

impl Default for Flicker {
    fn default() -> Self {
        Self {
            probability_per_tick: LIGHTNING_PROBABILITY,
            duration_ms: LIGHTNING_DURATION_MS,
            flash_intensity: LIGHTNING_FLASH_INTENSITY,
            state: FlickerState::Idle,
        }
    }
}

impl Flicker {
    pub fn is_flashing(&self) -> bool {
        matches!(self.state, FlickerState::Flashing { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightState {
    pub kind: LightKind,
    pub position: Vec3,
    pub path_radius: f32,
    pub path_height: f32,
    pub angular_speed: f32,
    /// Offset added to `angular_speed * t` so lights sharing a path do not overlap.
    pub phase: f32,
    pub intensity: f32,
    pub base_intensity: f32,
    pub color: Vec3,
    pub flicker: Option<Flicker>,
}

impl LightState {
    pub fn orbiting(radius: f32, height: f32, angular_speed: f32, intensity: f32) -> Self {
        Self {
            kind: LightKind::Point,
            position: Vec3::new(0.0, height, radius),
            path_radius: radius,
            path_height: height,
            angular_speed,
            phase: 0.0,
            intensity,
            base_intensity: intensity,
            color: Vec3::ONE,
            flicker: None,
        }
    }

    /// A light parked at `position`: radius and phase are derived so that
    /// `update` reproduces the position for every `t`.
    pub fn fixed_at(kind: LightKind, position: Vec3, intensity: f32) -> Self {
        let radius = (position.x * position.x + position.z * position.z).sqrt();
        Self {
            kind,
            position,
            path_radius: radius,
            path_height: position.y,
            angular_speed: 0.0,
            phase: position.x.atan2(position.z),
            intensity,
            base_intensity: intensity,
            color: Vec3::ONE,
            flicker: None,
        }
    }

    pub fn with_flicker(mut self, flicker: Flicker) -> Self {
        self.flicker = Some(flicker);
        self
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn is_flashing(&self) -> bool {
        self.flicker.map(|f| f.is_flashing()).unwrap_or(false)
    }

    fn validate(&self) -> Result<()> {
        if self.path_radius < 0.0 || !self.path_radius.is_finite() {
            return Err(invalid("light path radius must be finite and non-negative"));
        }
        if let Some(f) = &self.flicker {
            if !(0.0..=1.0).contains(&f.probability_per_tick) {
                return Err(invalid("flicker probability must be within [0, 1]"));
            }
            if f.duration_ms < 0.0 {
                return Err(invalid("flicker duration must be non-negative"));
            }
        }
        Ok(())
    }
}

/// Move `light` along its path for time `t` and step its flicker state using
/// one draw from `rng`.
pub fn update(light: &mut LightState, t: f32, rng: &mut StdRng) {
    let angle = light.angular_speed * t + light.phase;
    light.position = Vec3::new(
        light.path_radius * angle.sin(),
        light.path_height,
        light.path_radius * angle.cos(),
    );

    let Some(flicker) = light.flicker.as_mut() else {
        return;
    };
    if let FlickerState::Flashing { since } = flicker.state {
        if (t - since) * 1000.0 >= flicker.duration_ms {
            flicker.state = FlickerState::Idle;
            light.intensity = light.base_intensity;
        }
    }
    let sample: f32 = rng.gen();
    if flicker.state == FlickerState::Idle && sample < flicker.probability_per_tick {
        flicker.state = FlickerState::Flashing { since: t };
        light.intensity = flicker.flash_intensity;
        log::debug!("[lights] flash at t={t:.2}");
    }
}

pub struct LightMotionController {
    lights: Vec<LightState>,
    rng: StdRng,
}

impl LightMotionController {
    pub fn new(lights: Vec<LightState>, seed: u64) -> Result<Self> {
        for l in &lights {
            l.validate()?;
        }
        Ok(Self {
            lights,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn with_default_seed(lights: Vec<LightState>) -> Result<Self> {
        Self::new(lights, FLICKER_SEED)
    }

    /// Spread the phases of all moving lights evenly around the circle.
    pub fn spread_phases(&mut self) {
        let moving = self.lights.iter().filter(|l| l.angular_speed != 0.0).count();
        if moving == 0 {
            return;
        }
        let step = TAU / moving as f32;
        for (i, l) in self
            .lights
            .iter_mut()
            .filter(|l| l.angular_speed != 0.0)
            .enumerate()
        {
            l.phase = i as f32 * step;
        }
    }

    pub fn update(&mut self, t: f32) {
        for light in &mut self.lights {
            update(light, t, &mut self.rng);
        }
    }

    pub fn lights(&self) -> &[LightState] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}

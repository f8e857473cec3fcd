//! Typed scene configuration and the built-in vignette presets.
//!
//! There is no file format: a vignette is assembled in code from the defaults
//! in `constants.rs`, and frontends pick one by name.

use crate::camera::Camera;
use crate::constants::*;
use crate::error::{invalid, Result, StormError};
use crate::lights::{Flicker, LightKind, LightState};
use crate::particles::{RainConfig, RecyclePolicy, RespawnHeight, SpawnBounds};
use crate::wave::{GridSpec, WaveAxis, WaveParameters, WaveTerm};
use glam::{Vec3, Vec4};
use std::collections::HashSet;
use std::str::FromStr;

/// Upright palm: a tapered trunk with a crown of leaves.
#[derive(Clone, Debug, PartialEq)]
pub struct PalmSpec {
    pub id: String,
    pub base: Vec3,
    pub height: f32,
    pub radius_top: f32,
    pub radius_bottom: f32,
}

impl PalmSpec {
    pub fn new(id: impl Into<String>, x: f32, z: f32) -> Self {
        Self {
            id: id.into(),
            base: Vec3::new(x, 0.0, z),
            height: TRUNK_HEIGHT,
            radius_top: TRUNK_RADIUS_TOP,
            radius_bottom: TRUNK_RADIUS_BOTTOM,
        }
    }
}

/// Where the optional boat floats.
#[derive(Clone, Debug, PartialEq)]
pub struct BoatSpec {
    pub x: f32,
    pub z: f32,
    pub yaw: f32,
    pub scale: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VignetteConfig {
    pub name: &'static str,
    pub grid: GridSpec,
    pub waves: WaveParameters,
    pub rain: RainConfig,
    pub rain_color: Vec4,
    pub lights: Vec<LightState>,
    pub spread_light_phases: bool,
    pub flicker_seed: u64,
    pub ambient: Vec3,
    pub sky_color: Vec3,
    pub palms: Vec<PalmSpec>,
    pub highlight_color: Vec3,
    pub camera: Camera,
    pub boat: Option<BoatSpec>,
}

impl Default for VignetteConfig {
    fn default() -> Self {
        Vignette::TropicalRain.config()
    }
}

impl VignetteConfig {
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.rain.validate()?;
        if self.waves.terms.is_empty() {
            return Err(invalid("wave field needs at least one term"));
        }
        if self.lights.len() > MAX_LIGHTS {
            log::warn!(
                "[config] {} lights configured, only {} are uploaded",
                self.lights.len(),
                MAX_LIGHTS
            );
        }
        let mut ids = HashSet::new();
        for palm in &self.palms {
            if !ids.insert(palm.id.as_str()) {
                return Err(invalid(format!("duplicate pickable id {:?}", palm.id)));
            }
            if palm.height <= 0.0 || palm.radius_bottom <= 0.0 {
                return Err(invalid(format!("palm {:?} has non-positive size", palm.id)));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Vignette {
    /// Beach with two palms, steady rain and a fixed sun.
    #[default]
    TropicalRain,
    /// Choppy night sea with lightning, an orbiting lantern and a boat.
    NightStorm,
    /// Slow swell, light drizzle, a sun circling overhead.
    CalmSea,
}

impl FromStr for Vignette {
    type Err = StormError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tropical" | "tropical-rain" => Ok(Vignette::TropicalRain),
            "storm" | "night-storm" => Ok(Vignette::NightStorm),
            "calm" | "calm-sea" => Ok(Vignette::CalmSea),
            other => Err(invalid(format!("unknown vignette {other:?}"))),
        }
    }
}

impl Vignette {
    pub fn config(self) -> VignetteConfig {
        match self {
            Vignette::TropicalRain => tropical_rain(),
            Vignette::NightStorm => night_storm(),
            Vignette::CalmSea => calm_sea(),
        }
    }
}

fn tropical_rain() -> VignetteConfig {
    VignetteConfig {
        name: "tropical-rain",
        grid: GridSpec::default(),
        waves: WaveParameters::default(),
        rain: RainConfig {
            respawn: RespawnHeight::Jittered,
            ..RainConfig::default()
        },
        rain_color: Vec3::from(RAIN_COLOR).extend(0.8),
        lights: vec![LightState::fixed_at(
            LightKind::Directional,
            sun_position_vec3(),
            SUN_INTENSITY,
        )],
        spread_light_phases: false,
        flicker_seed: FLICKER_SEED,
        ambient: Vec3::splat(AMBIENT_INTENSITY),
        sky_color: Vec3::from(SKY_COLOR),
        palms: vec![PalmSpec::new("trunk-1", -5.0, -5.0), PalmSpec::new("trunk-2", 5.0, -5.0)],
        highlight_color: Vec3::from(HIGHLIGHT_COLOR),
        camera: Camera::default(),
        boat: None,
    }
}

fn night_storm() -> VignetteConfig {
    let waves = WaveParameters::alternating([
        WaveTerm::new(0.9, 0.25, 1.4, WaveAxis::X),
        WaveTerm::new(0.6, 0.4, 1.9, WaveAxis::Z),
        WaveTerm::new(0.3, 0.9, 3.1, WaveAxis::XPlusZ),
    ])
    .with_colors(Vec3::new(0.0, 0.03, 0.08), Vec3::new(0.05, 0.22, 0.35));
    let lightning = LightState::fixed_at(LightKind::Directional, Vec3::new(-6.0, 30.0, -20.0), 0.15)
        .with_color(Vec3::new(0.8, 0.85, 1.0))
        .with_flicker(Flicker::default());
    let lantern = LightState::orbiting(8.0, 6.0, 0.5, 1.2).with_color(Vec3::new(1.0, 0.7, 0.35));
    let beacon = LightState::orbiting(8.0, 6.0, 0.5, 0.8).with_color(Vec3::new(1.0, 0.3, 0.2));
    VignetteConfig {
        name: "night-storm",
        grid: GridSpec {
            segments_x: 80,
            segments_z: 80,
            ..GridSpec::default()
        },
        waves,
        rain: RainConfig {
            count: 10_000,
            fall_speed: (0.2, 0.7),
            policy: RecyclePolicy::ResetFullPosition,
            redraw_velocity_on_recycle: true,
            ..RainConfig::default()
        },
        rain_color: Vec4::new(0.6, 0.65, 0.75, 0.6),
        lights: vec![lightning, lantern, beacon],
        spread_light_phases: true,
        flicker_seed: FLICKER_SEED,
        ambient: Vec3::new(0.08, 0.09, 0.14),
        sky_color: Vec3::from(STORM_SKY_COLOR),
        palms: vec![
            PalmSpec::new("trunk-1", -8.0, -6.0),
            PalmSpec::new("trunk-2", -3.0, -8.0),
            PalmSpec::new("trunk-3", 4.0, -6.0),
        ],
        highlight_color: Vec3::from(HIGHLIGHT_COLOR),
        camera: Camera::default(),
        boat: Some(BoatSpec {
            x: 2.0,
            z: 5.0,
            yaw: 0.6,
            scale: 1.0,
        }),
    }
}

fn calm_sea() -> VignetteConfig {
    let waves = WaveParameters::alternating([
        WaveTerm::new(0.25, 0.3, 0.8, WaveAxis::XPlusZ),
        WaveTerm::new(0.1, 0.7, 1.3, WaveAxis::X),
    ]);
    VignetteConfig {
        name: "calm-sea",
        grid: GridSpec::default(),
        waves,
        rain: RainConfig {
            count: 1500,
            fall_speed: (0.05, 0.12),
            policy: RecyclePolicy::ResetFullPosition,
            bounds: SpawnBounds::centered(RAIN_HALF_EXTENT),
            ..RainConfig::default()
        },
        rain_color: Vec3::from(RAIN_COLOR).extend(0.5),
        lights: vec![LightState::orbiting(14.0, 10.0, 0.05, SUN_INTENSITY)],
        spread_light_phases: false,
        flicker_seed: FLICKER_SEED,
        ambient: Vec3::splat(0.5),
        sky_color: Vec3::from(SKY_COLOR),
        palms: vec![PalmSpec::new("trunk-1", -6.0, -4.0)],
        highlight_color: Vec3::from(HIGHLIGHT_COLOR),
        camera: Camera::default(),
        boat: Some(BoatSpec {
            x: -3.0,
            z: 6.0,
            yaw: -0.3,
            scale: 0.8,
        }),
    }
}

//! All mutable simulation state for one running vignette.
//!
//! The frontend owns a `SimulationContext`, shares it with its frame tick and
//! input handlers, and reads the per-tick outputs (ocean vertices, rain
//! positions, light transforms, object colors, boat pose) back for drawing.

use crate::asset::{AssetSlot, ModelHandle};
use crate::camera::{Camera, Viewport};
use crate::clock::FrameTime;
use crate::config::{BoatSpec, VignetteConfig};
use crate::constants::{
    BOAT_DRAFT, BOAT_PROBE_DISTANCE, BOAT_ROLL_GAIN, MAX_DT_EQUIVALENT, REFERENCE_FPS,
    TRUNK_COLOR,
};
use crate::error::{AssetLoadFailure, Result};
use crate::lights::LightMotionController;
use crate::particles::ParticlePool;
use crate::picking::{PickGeometry, PickableObject, PickingController};
use crate::shader::{FrameUniforms, OceanUniforms};
use crate::wave::{OceanGrid, WaveField};
use glam::{Mat4, Quat, Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoatPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl BoatPose {
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }
}

/// Floats the boat on the wave field: height follows the surface under the
/// hull, roll and pitch follow its slope.
#[derive(Clone, Debug)]
pub struct BoatMotion {
    spec: BoatSpec,
    pose: Option<BoatPose>,
}

impl BoatMotion {
    pub fn new(spec: BoatSpec) -> Self {
        Self { spec, pose: None }
    }

    pub fn pose(&self) -> Option<&BoatPose> {
        self.pose.as_ref()
    }

    /// No-op until the model is present.
    pub fn update(
        &mut self,
        model: &AssetSlot<ModelHandle>,
        field: &WaveField,
        base_height: f32,
        t: f32,
    ) {
        if model.get().is_none() {
            return;
        }
        let (x, z) = (self.spec.x, self.spec.z);
        let h = field.height_at(x, z, t);
        let d = BOAT_PROBE_DISTANCE;
        let sx = (field.height_at(x + d, z, t) - field.height_at(x - d, z, t)) / (2.0 * d);
        let sz = (field.height_at(x, z + d, t) - field.height_at(x, z - d, t)) / (2.0 * d);
        let up = Vec3::new(-sx * BOAT_ROLL_GAIN, 1.0, -sz * BOAT_ROLL_GAIN).normalize();
        let rotation = Quat::from_rotation_arc(Vec3::Y, up) * Quat::from_rotation_y(self.spec.yaw);
        self.pose = Some(BoatPose {
            position: Vec3::new(x, base_height + h - BOAT_DRAFT, z),
            rotation,
            scale: self.spec.scale,
        });
    }
}

pub struct SimulationContext {
    config: VignetteConfig,
    ocean: OceanGrid,
    wave_field: WaveField,
    rain: ParticlePool,
    lights: LightMotionController,
    pickables: Vec<PickableObject>,
    picker: PickingController,
    camera: Camera,
    viewport: Viewport,
    boat: AssetSlot<ModelHandle>,
    boat_motion: Option<BoatMotion>,
    ocean_uniforms: OceanUniforms,
    host_waves: bool,
    last_frame: FrameTime,
}

impl SimulationContext {
    pub fn new(config: VignetteConfig) -> Result<Self> {
        config.validate()?;
        let ocean = OceanGrid::new(config.grid)?;
        let wave_field = WaveField::new(config.waves.clone());
        let rain = ParticlePool::new(config.rain.clone())?;
        let mut lights = LightMotionController::new(config.lights.clone(), config.flicker_seed)?;
        if config.spread_light_phases {
            lights.spread_phases();
        }
        let pickables = config
            .palms
            .iter()
            .map(|p| {
                PickableObject::new(
                    p.id.clone(),
                    Vec3::from(TRUNK_COLOR),
                    config.highlight_color,
                    PickGeometry::Cylinder {
                        base: p.base,
                        radius: p.radius_bottom,
                        height: p.height,
                    },
                )
            })
            .collect();
        let ocean_uniforms = OceanUniforms::new(&config.waves, &config.grid);
        let boat_motion = config.boat.clone().map(BoatMotion::new);
        let camera = config.camera.clone();
        log::info!(
            "[context] vignette {} ({} ocean vertices, {} drops, {} lights)",
            config.name,
            ocean.len(),
            rain.len(),
            lights.len()
        );
        let mut ctx = Self {
            config,
            ocean,
            wave_field,
            rain,
            lights,
            pickables,
            picker: PickingController::new(),
            camera,
            viewport: Viewport::default(),
            boat: AssetSlot::new(),
            boat_motion,
            ocean_uniforms,
            host_waves: true,
            last_frame: FrameTime::default(),
        };
        ctx.camera.set_aspect(ctx.viewport);
        Ok(ctx)
    }

    /// One simulation step. Never fails: missing assets are skipped.
    pub fn tick(&mut self, ft: FrameTime) {
        let t = ft.elapsed;
        if self.host_waves {
            self.wave_field.update(&mut self.ocean, t);
        }
        self.lights.update(t);
        let dt_equivalent = (ft.delta * REFERENCE_FPS).min(MAX_DT_EQUIVALENT);
        self.rain.advance(dt_equivalent);
        if let Some(motion) = self.boat_motion.as_mut() {
            motion.update(&self.boat, &self.wave_field, self.config.grid.base_height, t);
        }
        self.ocean_uniforms.set_frame(t, self.camera.view_projection());
        self.last_frame = ft;
    }

    /// Pixel-space click. Returns the id of the object now selected, if the
    /// click hit anything.
    pub fn on_pointer_click(&mut self, x: f32, y: f32) -> Option<String> {
        self.picker
            .pick(Vec2::new(x, y), self.viewport, &self.camera, &mut self.pickables)
            .map(|o| o.id.clone())
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        match Viewport::new(width, height) {
            Some(vp) => {
                self.viewport = vp;
                self.camera.set_aspect(vp);
            }
            None => log::warn!("[context] ignoring zero-sized viewport {width}x{height}"),
        }
    }

    pub fn resolve_boat(&mut self, result: std::result::Result<ModelHandle, AssetLoadFailure>) {
        self.boat.resolve("boat", result);
    }

    /// CPU displacement (default) or leave the grid flat for the GPU program.
    pub fn set_host_waves(&mut self, enabled: bool) {
        self.host_waves = enabled;
    }

    pub fn host_waves(&self) -> bool {
        self.host_waves
    }

    pub fn frame_uniforms(&self) -> FrameUniforms {
        FrameUniforms::new(
            &self.camera,
            self.lights.lights(),
            self.config.ambient,
            self.config.rain_color,
        )
    }

    pub fn ocean_uniforms(&self) -> &OceanUniforms {
        &self.ocean_uniforms
    }

    pub fn config(&self) -> &VignetteConfig {
        &self.config
    }

    pub fn ocean(&self) -> &OceanGrid {
        &self.ocean
    }

    pub fn wave_field(&self) -> &WaveField {
        &self.wave_field
    }

    pub fn rain(&self) -> &ParticlePool {
        &self.rain
    }

    pub fn lights(&self) -> &LightMotionController {
        &self.lights
    }

    pub fn pickables(&self) -> &[PickableObject] {
        &self.pickables
    }

    pub fn selected(&self) -> Option<&str> {
        self.picker.selected()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn boat(&self) -> &AssetSlot<ModelHandle> {
        &self.boat
    }

    pub fn boat_pose(&self) -> Option<&BoatPose> {
        self.boat_motion.as_ref().and_then(|m| m.pose())
    }

    pub fn last_frame(&self) -> FrameTime {
        self.last_frame
    }
}

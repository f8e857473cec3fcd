//! Shader programs as versioned data assets.
//!
//! Each program carries its WGSL source together with a table describing the
//! uniforms it expects. The typed `#[repr(C)]` structs below are what the host
//! actually uploads; compiling and binding them is left to the frontend.

use crate::camera::Camera;
use crate::constants::{FOAM_THRESHOLD, MAX_GPU_WAVE_TERMS, MAX_LIGHTS};
use crate::lights::{LightKind, LightState};
use crate::wave::{GridSpec, Trig, WaveAxis, WaveParameters};
use glam::{Mat4, Vec3, Vec4};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    F32,
    Vec3,
    Vec4,
    Mat4,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformDefault {
    Scalar(f32),
    Vector([f32; 4]),
    Identity,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformDecl {
    pub name: &'static str,
    pub kind: UniformKind,
    /// `true` for values the host rewrites every tick.
    pub per_frame: bool,
    pub default: UniformDefault,
}

#[derive(Clone, Copy, Debug)]
pub struct ShaderAsset {
    pub name: &'static str,
    pub version: u32,
    pub source: &'static str,
    pub uniforms: &'static [UniformDecl],
}

impl ShaderAsset {
    pub fn uniform(&self, name: &str) -> Option<&UniformDecl> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    pub fn label(&self) -> String {
        format!("{}_v{}", self.name, self.version)
    }
}

const fn decl(
    name: &'static str,
    kind: UniformKind,
    per_frame: bool,
    default: UniformDefault,
) -> UniformDecl {
    UniformDecl {
        name,
        kind,
        per_frame,
        default,
    }
}

pub const OCEAN_UNIFORMS: &[UniformDecl] = &[
    decl("viewProj", UniformKind::Mat4, true, UniformDefault::Identity),
    decl("deepColor", UniformKind::Vec3, false, UniformDefault::Vector([0.0, 0.15, 0.35, 1.0])),
    decl("shallowColor", UniformKind::Vec3, false, UniformDefault::Vector([0.118, 0.565, 1.0, 1.0])),
    decl("waveHeight", UniformKind::Vec4, false, UniformDefault::Vector([0.5, 0.0, 0.0, 0.0])),
    decl("waveFrequency", UniformKind::Vec4, false, UniformDefault::Vector([0.5, 0.0, 0.0, 0.0])),
    decl("waveSpeed", UniformKind::Vec4, false, UniformDefault::Vector([2.0, 0.0, 0.0, 0.0])),
    decl("waveShape", UniformKind::Vec4, false, UniformDefault::Vector([2.0, 0.0, 0.0, 0.0])),
    decl("foam", UniformKind::Vec4, false, UniformDefault::Vector([0.35, 0.5, 0.0, 0.0])),
    decl("time", UniformKind::F32, true, UniformDefault::Scalar(0.0)),
    decl("termCount", UniformKind::F32, false, UniformDefault::Scalar(1.0)),
    decl("baseHeight", UniformKind::F32, false, UniformDefault::Scalar(-0.5)),
];

pub static OCEAN_SHADER: ShaderAsset = ShaderAsset {
    name: "ocean",
    version: 1,
    source: include_str!("../shaders/ocean.wgsl"),
    uniforms: OCEAN_UNIFORMS,
};

pub static SCENE_SHADER: ShaderAsset = ShaderAsset {
    name: "scene",
    version: 1,
    source: include_str!("../shaders/scene.wgsl"),
    uniforms: &[decl("viewProj", UniformKind::Mat4, true, UniformDefault::Identity)],
};

pub static RAIN_SHADER: ShaderAsset = ShaderAsset {
    name: "rain",
    version: 1,
    source: include_str!("../shaders/rain.wgsl"),
    uniforms: &[decl("viewProj", UniformKind::Mat4, true, UniformDefault::Identity)],
};

/// Encode axis and trig of a term as one float: axis in {0, 1, 2} plus 4 for cosine.
pub fn encode_wave_shape(axis: WaveAxis, trig: Trig) -> f32 {
    let a = match axis {
        WaveAxis::X => 0.0,
        WaveAxis::Z => 1.0,
        WaveAxis::XPlusZ => 2.0,
    };
    match trig {
        Trig::Sin => a,
        Trig::Cos => a + 4.0,
    }
}

/// Uniform block of `ocean.wgsl` (binding 1). Field order matches the WGSL struct.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OceanUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub deep_color: [f32; 4],
    pub shallow_color: [f32; 4],
    pub wave_height: [f32; 4],
    pub wave_frequency: [f32; 4],
    pub wave_speed: [f32; 4],
    pub wave_shape: [f32; 4],
    /// x = foam threshold, y = summed amplitude of every term (not just the packed ones).
    pub foam: [f32; 4],
    pub time: f32,
    pub term_count: f32,
    pub base_height: f32,
    pub _pad: f32,
}

impl OceanUniforms {
    /// Pack the static part of the block. Terms beyond the GPU limit are
    /// dropped with a warning; the host path still evaluates all of them.
    pub fn new(params: &WaveParameters, grid: &GridSpec) -> Self {
        if params.terms.len() > MAX_GPU_WAVE_TERMS {
            log::warn!(
                "[shader] {} wave terms, GPU program evaluates the first {}",
                params.terms.len(),
                MAX_GPU_WAVE_TERMS
            );
        }
        let mut u = Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            deep_color: params.deep_color.extend(1.0).to_array(),
            shallow_color: params.shallow_color.extend(1.0).to_array(),
            wave_height: [0.0; 4],
            wave_frequency: [0.0; 4],
            wave_speed: [0.0; 4],
            wave_shape: [0.0; 4],
            foam: [FOAM_THRESHOLD, params.total_amplitude(), 0.0, 0.0],
            time: 0.0,
            term_count: 0.0,
            base_height: grid.base_height,
            _pad: 0.0,
        };
        for (i, term) in params.terms.iter().take(MAX_GPU_WAVE_TERMS).enumerate() {
            u.wave_height[i] = term.amplitude;
            u.wave_frequency[i] = term.spatial_frequency;
            u.wave_speed[i] = term.phase_speed;
            u.wave_shape[i] = encode_wave_shape(term.axis, term.trig);
            u.term_count += 1.0;
        }
        u
    }

    /// Per-tick update: `time` tracks the clock's elapsed seconds.
    pub fn set_frame(&mut self, time: f32, view_proj: Mat4) {
        self.time = time;
        self.view_proj = view_proj.to_cols_array_2d();
    }

    /// CPU evaluation of exactly what the vertex program computes, used to
    /// check the packed block against the host wave field.
    pub fn displacement_at(&self, x: f32, z: f32) -> f32 {
        let mut y = 0.0;
        for i in 0..(self.term_count as usize).min(MAX_GPU_WAVE_TERMS) {
            let shape = self.wave_shape[i];
            let cosine = shape >= 4.0;
            let axis = if cosine { shape - 4.0 } else { shape };
            let coord = if axis < 0.5 {
                x
            } else if axis < 1.5 {
                z
            } else {
                x + z
            };
            let arg = self.wave_frequency[i] * coord + self.wave_speed[i] * self.time;
            let s = if cosine { arg.cos() } else { arg.sin() };
            y += self.wave_height[i] * s;
        }
        y
    }
}

/// Per-frame block shared by every program (binding 0).
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub ambient: [f32; 4],
    pub light_count: [f32; 4],
    pub light_pos: [[f32; 4]; MAX_LIGHTS],
    pub light_color: [[f32; 4]; MAX_LIGHTS],
    pub rain_color: [f32; 4],
}

impl FrameUniforms {
    /// Pack camera and lights. Lights past `MAX_LIGHTS` are not uploaded.
    pub fn new(camera: &Camera, lights: &[LightState], ambient: Vec3, rain_color: Vec4) -> Self {
        let mut u = Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.eye.extend(1.0).to_array(),
            ambient: ambient.extend(1.0).to_array(),
            light_count: [0.0; 4],
            light_pos: [[0.0; 4]; MAX_LIGHTS],
            light_color: [[0.0; 4]; MAX_LIGHTS],
            rain_color: rain_color.to_array(),
        };
        let n = lights.len().min(MAX_LIGHTS);
        for (i, l) in lights.iter().take(n).enumerate() {
            u.light_pos[i] = l.position.extend(l.intensity).to_array();
            let kind = match l.kind {
                LightKind::Point => 0.0,
                LightKind::Directional => 1.0,
            };
            u.light_color[i] = l.color.extend(kind).to_array();
        }
        u.light_count[0] = n as f32;
        u
    }
}

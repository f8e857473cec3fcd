//! Wave-displaced height field for the ocean surface.
//!
//! The field is stateless in time: every vertex height is recomputed from
//! `(x, z, t, params)` each tick, so the surface can be restarted or scrubbed
//! to any `t` and a GPU copy of the same sum stays in lockstep.

use crate::constants::{
    FOAM_THRESHOLD, OCEAN_BASE_HEIGHT, OCEAN_DEEP_COLOR, OCEAN_EXTENT, OCEAN_SEGMENTS,
    OCEAN_SHALLOW_COLOR, SWELL_AMPLITUDE, SWELL_PHASE_SPEED, SWELL_SPATIAL_FREQUENCY,
};
use crate::error::{invalid, Result};
use glam::Vec3;
use smallvec::SmallVec;

/// Which planar coordinate a term travels along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveAxis {
    X,
    Z,
    XPlusZ,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trig {
    Sin,
    Cos,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveTerm {
    pub amplitude: f32,
    pub spatial_frequency: f32,
    pub phase_speed: f32,
    pub axis: WaveAxis,
    pub trig: Trig,
}

impl WaveTerm {
    pub fn new(amplitude: f32, spatial_frequency: f32, phase_speed: f32, axis: WaveAxis) -> Self {
        Self {
            amplitude,
            spatial_frequency,
            phase_speed,
            axis,
            trig: Trig::Sin,
        }
    }

    pub fn with_trig(mut self, trig: Trig) -> Self {
        self.trig = trig;
        self
    }

    #[inline]
    pub fn eval(&self, x: f32, z: f32, t: f32) -> f32 {
        let coord = match self.axis {
            WaveAxis::X => x,
            WaveAxis::Z => z,
            WaveAxis::XPlusZ => x + z,
        };
        let arg = self.spatial_frequency * coord + self.phase_speed * t;
        let s = match self.trig {
            Trig::Sin => arg.sin(),
            Trig::Cos => arg.cos(),
        };
        self.amplitude * s
    }
}

/// Ordered wave terms plus the colors used by the companion shading stage.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveParameters {
    pub terms: SmallVec<[WaveTerm; 4]>,
    pub deep_color: Vec3,
    pub shallow_color: Vec3,
}

impl Default for WaveParameters {
    fn default() -> Self {
        Self::single(WaveTerm::new(
            SWELL_AMPLITUDE,
            SWELL_SPATIAL_FREQUENCY,
            SWELL_PHASE_SPEED,
            WaveAxis::XPlusZ,
        ))
    }
}

impl WaveParameters {
    pub fn single(term: WaveTerm) -> Self {
        let mut terms = SmallVec::new();
        terms.push(term);
        Self {
            terms,
            deep_color: Vec3::from(OCEAN_DEEP_COLOR),
            shallow_color: Vec3::from(OCEAN_SHALLOW_COLOR),
        }
    }

    /// Build from several terms, alternating sine and cosine so crests of
    /// neighbouring terms do not line up.
    pub fn alternating(terms: impl IntoIterator<Item = WaveTerm>) -> Self {
        let terms = terms
            .into_iter()
            .enumerate()
            .map(|(i, t)| t.with_trig(if i % 2 == 0 { Trig::Sin } else { Trig::Cos }))
            .collect();
        Self {
            terms,
            deep_color: Vec3::from(OCEAN_DEEP_COLOR),
            shallow_color: Vec3::from(OCEAN_SHALLOW_COLOR),
        }
    }

    pub fn with_colors(mut self, deep: Vec3, shallow: Vec3) -> Self {
        self.deep_color = deep;
        self.shallow_color = shallow;
        self
    }

    /// Displacement at a single point.
    #[inline]
    pub fn height_at(&self, x: f32, z: f32, t: f32) -> f32 {
        self.terms.iter().map(|w| w.eval(x, z, t)).sum()
    }

    /// Upper bound on |displacement|.
    pub fn total_amplitude(&self) -> f32 {
        self.terms.iter().map(|w| w.amplitude.abs()).sum()
    }

    /// Host-side reference of the ocean fragment blend: deep to shallow along
    /// the surface's vertical UV, whitened towards foam on high crests.
    pub fn surface_color(&self, v: f32, wave_height: f32) -> Vec3 {
        let base = self.deep_color.lerp(self.shallow_color, v.clamp(0.0, 1.0));
        let amp = self.total_amplitude();
        if amp <= f32::EPSILON {
            return base;
        }
        let crest = (wave_height / amp).clamp(-1.0, 1.0);
        let foam = ((crest - FOAM_THRESHOLD) / (1.0 - FOAM_THRESHOLD)).clamp(0.0, 1.0);
        base.lerp(Vec3::ONE, foam * 0.6)
    }
}

/// A surface point: `x`/`z` are fixed at construction, `y` is rewritten every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridVertex {
    x: f32,
    z: f32,
    pub y: f32,
}

impl GridVertex {
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z, y: 0.0 }
    }
    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }
    #[inline]
    pub fn z(&self) -> f32 {
        self.z
    }
}

/// Write the wave sum into every vertex's `y`.
pub fn displace(vertices: &mut [GridVertex], t: f32, params: &WaveParameters) {
    for v in vertices.iter_mut() {
        v.y = params.height_at(v.x, v.z, t);
    }
}

/// Resolution and extent of the ocean plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    pub extent_x: f32,
    pub extent_z: f32,
    pub segments_x: u32,
    pub segments_z: u32,
    pub base_height: f32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            extent_x: OCEAN_EXTENT,
            extent_z: OCEAN_EXTENT,
            segments_x: OCEAN_SEGMENTS,
            segments_z: OCEAN_SEGMENTS,
            base_height: OCEAN_BASE_HEIGHT,
        }
    }
}

impl GridSpec {
    pub fn validate(&self) -> Result<()> {
        if self.segments_x == 0 || self.segments_z == 0 {
            return Err(invalid("ocean grid needs at least one segment per side"));
        }
        if !(self.extent_x > 0.0 && self.extent_z > 0.0) {
            return Err(invalid("ocean extent must be positive"));
        }
        Ok(())
    }

    pub fn columns(&self) -> usize {
        self.segments_x as usize + 1
    }

    pub fn rows(&self) -> usize {
        self.segments_z as usize + 1
    }
}

/// Row-major grid of ocean vertices with cached normals.
#[derive(Clone, Debug)]
pub struct OceanGrid {
    spec: GridSpec,
    vertices: Vec<GridVertex>,
    normals: Vec<Vec3>,
}

impl OceanGrid {
    pub fn new(spec: GridSpec) -> Result<Self> {
        spec.validate()?;
        let cols = spec.columns();
        let rows = spec.rows();
        let dx = spec.extent_x / spec.segments_x as f32;
        let dz = spec.extent_z / spec.segments_z as f32;
        let x0 = -spec.extent_x * 0.5;
        let z0 = -spec.extent_z * 0.5;
        let mut vertices = Vec::with_capacity(cols * rows);
        for j in 0..rows {
            for i in 0..cols {
                vertices.push(GridVertex::new(x0 + i as f32 * dx, z0 + j as f32 * dz));
            }
        }
        let normals = vec![Vec3::Y; vertices.len()];
        Ok(Self {
            spec,
            vertices,
            normals,
        })
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn vertices(&self) -> &[GridVertex] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut [GridVertex] {
        &mut self.vertices
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        j * self.spec.columns() + i
    }

    /// World-space position of vertex `idx` (base height applied).
    pub fn position(&self, idx: usize) -> Vec3 {
        let v = self.vertices[idx];
        Vec3::new(v.x, self.spec.base_height + v.y, v.z)
    }

    /// Texture coordinates in the `[0, 1]` range, `v` running along z.
    pub fn uv(&self, idx: usize) -> [f32; 2] {
        let cols = self.spec.columns();
        let i = idx % cols;
        let j = idx / cols;
        [
            i as f32 / self.spec.segments_x as f32,
            j as f32 / self.spec.segments_z as f32,
        ]
    }

    /// Triangle list facing +Y.
    pub fn indices(&self) -> Vec<u32> {
        let cols = self.spec.columns();
        let (sx, sz) = (self.spec.segments_x as usize, self.spec.segments_z as usize);
        let mut out = Vec::with_capacity(sx * sz * 6);
        for j in 0..sz {
            for i in 0..sx {
                let a = (j * cols + i) as u32;
                let b = a + 1;
                let c = a + cols as u32;
                let d = c + 1;
                out.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }
        out
    }

    /// Central-difference normals (one-sided on the border).
    pub fn recompute_normals(&mut self) {
        let cols = self.spec.columns();
        let rows = self.spec.rows();
        let dx = self.spec.extent_x / self.spec.segments_x as f32;
        let dz = self.spec.extent_z / self.spec.segments_z as f32;
        for j in 0..rows {
            for i in 0..cols {
                let (il, ir) = (i.saturating_sub(1), (i + 1).min(cols - 1));
                let (jd, ju) = (j.saturating_sub(1), (j + 1).min(rows - 1));
                let hx = self.vertices[self.index(ir, j)].y - self.vertices[self.index(il, j)].y;
                let hz = self.vertices[self.index(i, ju)].y - self.vertices[self.index(i, jd)].y;
                let slope_x = hx / ((ir - il) as f32 * dx);
                let slope_z = hz / ((ju - jd) as f32 * dz);
                let n = Vec3::new(-slope_x, 1.0, -slope_z).normalize();
                let idx = self.index(i, j);
                self.normals[idx] = n;
            }
        }
    }
}

/// Owns nothing but its parameters; recomputes the whole surface per tick.
#[derive(Clone, Debug, Default)]
pub struct WaveField {
    params: WaveParameters,
}

impl WaveField {
    pub fn new(params: WaveParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &WaveParameters {
        &self.params
    }

    pub fn height_at(&self, x: f32, z: f32, t: f32) -> f32 {
        self.params.height_at(x, z, t)
    }

    /// Displace the grid for time `t` and refresh its normals.
    pub fn update(&self, grid: &mut OceanGrid, t: f32) {
        displace(grid.vertices_mut(), t, &self.params);
        grid.recompute_normals();
    }
}

//! CPU-side meshes and per-frame instance lists for the native renderer.

use glam::{Mat4, Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_6, TAU};
use std::ops::Range;

use storm_core::{
    ModelHandle, SimulationContext, BOAT_COLOR, LEAF_COLOR, LEAF_COUNT, LEAF_HEIGHT, LEAF_RADIUS,
    SAND_COLOR, TRUNK_HEIGHT, TRUNK_RADIUS_BOTTOM, TRUNK_RADIUS_TOP,
};

const ROUND_SEGMENTS: u32 = 10; // radial segments for trunks and leaves
const BEACH_WIDTH: f32 = 100.0;
const BEACH_DEPTH: f32 = 48.0;
const BEACH_FRONT_Z: f32 = -2.0; // shoreline; the ocean shows in front of it

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SolidVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: Vec3) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OceanVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<SolidVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    fn push(&mut self, p: Vec3, n: Vec3) -> u32 {
        self.vertices.push(SolidVertex {
            position: p.to_array(),
            normal: n.to_array(),
        });
        self.vertices.len() as u32 - 1
    }

    /// Unit square in the xz plane facing +Y.
    pub fn plane() -> Self {
        let mut m = Mesh::default();
        for (x, z) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            m.push(Vec3::new(x, 0.0, z), Vec3::Y);
        }
        m.indices = vec![0, 2, 1, 0, 3, 2];
        m
    }

    /// Tapered cylinder standing on the origin, `height` tall.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Self {
        let mut m = Mesh::default();
        let slope = (radius_bottom - radius_top) / height;
        for i in 0..=segments {
            let a = i as f32 / segments as f32 * TAU;
            let (s, c) = a.sin_cos();
            let n = Vec3::new(s, slope, c).normalize();
            m.push(Vec3::new(radius_bottom * s, 0.0, radius_bottom * c), n);
            m.push(Vec3::new(radius_top * s, height, radius_top * c), n);
        }
        for i in 0..segments {
            let b = i * 2;
            m.indices.extend_from_slice(&[b, b + 2, b + 1, b + 1, b + 2, b + 3]);
        }
        m.cap(0.0, radius_bottom, -Vec3::Y, segments);
        m.cap(height, radius_top, Vec3::Y, segments);
        m
    }

    /// Cone centred on the origin with its apex up.
    pub fn cone(radius: f32, height: f32, segments: u32) -> Self {
        let mut m = Mesh::default();
        let half = height * 0.5;
        let slope = radius / height;
        for i in 0..segments {
            let a0 = i as f32 / segments as f32 * TAU;
            let a1 = (i + 1) as f32 / segments as f32 * TAU;
            let mid = (a0 + a1) * 0.5;
            let n = Vec3::new(mid.sin(), slope, mid.cos()).normalize();
            let apex = m.push(Vec3::new(0.0, half, 0.0), n);
            let p0 = m.push(Vec3::new(radius * a0.sin(), -half, radius * a0.cos()), n);
            let p1 = m.push(Vec3::new(radius * a1.sin(), -half, radius * a1.cos()), n);
            m.indices.extend_from_slice(&[apex, p0, p1]);
        }
        m.cap(-half, radius, -Vec3::Y, segments);
        m
    }

    pub fn from_model(model: &ModelHandle) -> Self {
        let mut m = Mesh::default();
        for (p, n) in model.positions.iter().zip(&model.normals) {
            m.push(*p, *n);
        }
        m.indices = model.indices.clone();
        m
    }

    fn cap(&mut self, y: f32, radius: f32, normal: Vec3, segments: u32) {
        let center = self.push(Vec3::new(0.0, y, 0.0), normal);
        let first = center + 1;
        for i in 0..segments {
            let a = i as f32 / segments as f32 * TAU;
            self.push(Vec3::new(radius * a.sin(), y, radius * a.cos()), normal);
        }
        for i in 0..segments {
            let a = first + i;
            let b = first + (i + 1) % segments;
            if normal.y > 0.0 {
                self.indices.extend_from_slice(&[center, a, b]);
            } else {
                self.indices.extend_from_slice(&[center, b, a]);
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshKind {
    Beach,
    Trunk,
    Leaf,
    Boat,
}

/// The fixed meshes every vignette draws. The boat mesh arrives later.
pub fn static_meshes() -> [(MeshKind, Mesh); 3] {
    [
        (MeshKind::Beach, Mesh::plane()),
        (
            MeshKind::Trunk,
            Mesh::cylinder(TRUNK_RADIUS_TOP, TRUNK_RADIUS_BOTTOM, TRUNK_HEIGHT, ROUND_SEGMENTS),
        ),
        (MeshKind::Leaf, Mesh::cone(LEAF_RADIUS, LEAF_HEIGHT, ROUND_SEGMENTS)),
    ]
}

/// Instances grouped by mesh, written into one contiguous buffer.
#[derive(Default)]
pub struct InstanceBatch {
    pub data: Vec<InstanceData>,
    pub ranges: Vec<(MeshKind, Range<u32>)>,
}

impl InstanceBatch {
    fn begin(&self) -> u32 {
        self.data.len() as u32
    }

    fn end(&mut self, kind: MeshKind, start: u32) {
        let end = self.data.len() as u32;
        if end > start {
            self.ranges.push((kind, start..end));
        }
    }

    /// Rebuild from the current simulation state.
    pub fn rebuild(&mut self, ctx: &SimulationContext) {
        self.data.clear();
        self.ranges.clear();
        let cfg = ctx.config();

        let start = self.begin();
        let beach = Mat4::from_scale_rotation_translation(
            Vec3::new(BEACH_WIDTH, 1.0, BEACH_DEPTH),
            Quat::IDENTITY,
            Vec3::new(0.0, 0.0, BEACH_FRONT_Z - BEACH_DEPTH * 0.5),
        );
        self.data.push(InstanceData::new(beach, Vec3::from(SAND_COLOR)));
        self.end(MeshKind::Beach, start);

        // Trunk colors come from the pickables so the highlight shows up.
        let start = self.begin();
        for (palm, obj) in cfg.palms.iter().zip(ctx.pickables()) {
            let scale = Vec3::new(
                palm.radius_bottom / TRUNK_RADIUS_BOTTOM,
                palm.height / TRUNK_HEIGHT,
                palm.radius_bottom / TRUNK_RADIUS_BOTTOM,
            );
            let model = Mat4::from_scale_rotation_translation(scale, Quat::IDENTITY, palm.base);
            self.data.push(InstanceData::new(model, obj.color));
        }
        self.end(MeshKind::Trunk, start);

        let start = self.begin();
        for palm in &cfg.palms {
            let crown = palm.base + Vec3::Y * palm.height;
            let s = palm.height / TRUNK_HEIGHT;
            for i in 0..LEAF_COUNT {
                let tilt = FRAC_PI_6 - i as f32 * FRAC_PI_6;
                let spin = i as f32 * FRAC_PI_2;
                let rot = Quat::from_rotation_y(spin) * Quat::from_rotation_x(tilt);
                let model = Mat4::from_scale_rotation_translation(Vec3::splat(s), rot, crown);
                self.data.push(InstanceData::new(model, Vec3::from(LEAF_COLOR)));
            }
        }
        self.end(MeshKind::Leaf, start);

        let start = self.begin();
        if let Some(pose) = ctx.boat_pose() {
            self.data
                .push(InstanceData::new(pose.transform(), Vec3::from(BOAT_COLOR)));
        }
        self.end(MeshKind::Boat, start);
    }
}

/// Interleave the ocean grid for upload.
pub fn ocean_vertices(ctx: &SimulationContext, out: &mut Vec<OceanVertex>) {
    let grid = ctx.ocean();
    out.clear();
    out.extend((0..grid.len()).map(|i| OceanVertex {
        position: grid.position(i).to_array(),
        normal: grid.normals()[i].to_array(),
        uv: grid.uv(i),
    }));
}

/// Upper bound on instances for a vignette, used to size the buffer once.
pub fn instance_capacity(ctx: &SimulationContext) -> usize {
    let palms = ctx.config().palms.len();
    1 + palms * (1 + LEAF_COUNT) + 1
}

//! Pointer picking with single-selection highlighting.

use crate::camera::{Camera, Ray, Viewport};
use glam::{Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PickGeometry {
    Sphere { center: Vec3, radius: f32 },
    Aabb { min: Vec3, max: Vec3 },
    /// Upright capped cylinder standing on `base`.
    Cylinder { base: Vec3, radius: f32, height: f32 },
}

impl PickGeometry {
    /// Ray parameter of the first hit at or in front of the origin.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        match *self {
            PickGeometry::Sphere { center, radius } => ray_sphere(ray.origin, ray.dir, center, radius),
            PickGeometry::Aabb { min, max } => ray_aabb(ray, min, max),
            PickGeometry::Cylinder {
                base,
                radius,
                height,
            } => ray_cylinder(ray, base, radius, height),
        }
    }

    pub fn center(&self) -> Vec3 {
        match *self {
            PickGeometry::Sphere { center, .. } => center,
            PickGeometry::Aabb { min, max } => (min + max) * 0.5,
            PickGeometry::Cylinder { base, height, .. } => base + Vec3::Y * (height * 0.5),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PickableObject {
    pub id: String,
    pub base_color: Vec3,
    pub highlight_color: Vec3,
    pub color: Vec3,
    pub geometry: PickGeometry,
}

impl PickableObject {
    pub fn new(
        id: impl Into<String>,
        base_color: Vec3,
        highlight_color: Vec3,
        geometry: PickGeometry,
    ) -> Self {
        Self {
            id: id.into(),
            base_color,
            highlight_color,
            color: base_color,
            geometry,
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.color == self.highlight_color
    }
}

#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t = -b - sq;
    if t >= 0.0 {
        return Some(t);
    }
    // origin inside the sphere: take the exit point
    let t = -b + sq;
    (t >= 0.0).then_some(t)
}

/// Slab test.
pub fn ray_aabb(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = ray.dir.recip();
    let t0 = (min - ray.origin) * inv;
    let t1 = (max - ray.origin) * inv;
    let t_near = t0.min(t1).max_element();
    let t_far = t0.max(t1).min_element();
    if t_near > t_far || t_far < 0.0 {
        return None;
    }
    Some(t_near.max(0.0))
}

pub fn ray_cylinder(ray: &Ray, base: Vec3, radius: f32, height: f32) -> Option<f32> {
    let o = ray.origin - base;
    let d = ray.dir;
    let within_height = |t: f32| {
        let y = o.y + d.y * t;
        (0.0..=height).contains(&y)
    };
    let mut best: Option<f32> = None;
    let mut consider = |t: f32| {
        if t >= 0.0 && best.map_or(true, |b| t < b) {
            best = Some(t);
        }
    };

    // side wall
    let a = d.x * d.x + d.z * d.z;
    if a > 1e-12 {
        let b = o.x * d.x + o.z * d.z;
        let c = o.x * o.x + o.z * o.z - radius * radius;
        let disc = b * b - a * c;
        if disc >= 0.0 {
            let sq = disc.sqrt();
            for t in [(-b - sq) / a, (-b + sq) / a] {
                if within_height(t) {
                    consider(t);
                }
            }
        }
    }
    // caps
    if d.y.abs() > 1e-12 {
        for cap_y in [0.0, height] {
            let t = (cap_y - o.y) / d.y;
            let px = o.x + d.x * t;
            let pz = o.z + d.z * t;
            if px * px + pz * pz <= radius * radius {
                consider(t);
            }
        }
    }
    best
}

/// Tracks which object, if any, is currently highlighted.
#[derive(Clone, Debug, Default)]
pub struct PickingController {
    selected: Option<String>,
}

impl PickingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Nearest candidate hit by the ray through a pixel. Ties keep the
    /// earlier candidate.
    pub fn hit_test(
        ray: &Ray,
        candidates: &[PickableObject],
    ) -> Option<(usize, f32)> {
        let mut best = None::<(usize, f32)>;
        for (i, obj) in candidates.iter().enumerate() {
            if let Some(t) = obj.geometry.intersect(ray) {
                match best {
                    Some((_, bt)) if t >= bt => {}
                    _ => best = Some((i, t)),
                }
            }
        }
        best
    }

    /// Pick under the pointer and move the highlight. A miss leaves the
    /// selection untouched.
    pub fn pick<'a>(
        &mut self,
        pointer: Vec2,
        viewport: Viewport,
        camera: &Camera,
        candidates: &'a mut [PickableObject],
    ) -> Option<&'a PickableObject> {
        let ndc = viewport.pointer_to_ndc(pointer.x, pointer.y);
        let ray = camera.ray_from_ndc(ndc);
        let (hit, t) = Self::hit_test(&ray, candidates)?;

        for obj in candidates.iter_mut() {
            if obj.is_highlighted() || self.selected.as_deref() == Some(obj.id.as_str()) {
                obj.color = obj.base_color;
            }
        }
        let obj = &mut candidates[hit];
        obj.color = obj.highlight_color;
        if self.selected.as_deref() != Some(obj.id.as_str()) {
            log::info!("[pick] selected {} at t={:.2}", obj.id, t);
        }
        self.selected = Some(obj.id.clone());
        Some(&candidates[hit])
    }

    /// Revert the current selection, if any.
    pub fn clear(&mut self, candidates: &mut [PickableObject]) {
        if let Some(id) = self.selected.take() {
            if let Some(obj) = candidates.iter_mut().find(|o| o.id == id) {
                obj.color = obj.base_color;
            }
        }
    }
}

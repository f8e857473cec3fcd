//! Optional decorative assets.
//!
//! Loading happens outside the core (usually on a worker thread); the result
//! is handed to an [`AssetSlot`] at a tick boundary. A slot starts empty, is
//! filled at most once, and a failure leaves it empty for good.

use crate::error::AssetLoadFailure;
use glam::Vec3;
use std::path::Path;

#[derive(Debug)]
pub enum AssetSlot<T> {
    Pending,
    Ready(T),
    Failed,
}

impl<T> Default for AssetSlot<T> {
    fn default() -> Self {
        AssetSlot::Pending
    }
}

impl<T> AssetSlot<T> {
    pub fn new() -> Self {
        AssetSlot::Pending
    }

    /// Accept a loader result. Only the first result is kept.
    pub fn resolve(&mut self, name: &str, result: Result<T, AssetLoadFailure>) {
        if !matches!(self, AssetSlot::Pending) {
            log::warn!("[asset] {name}: ignoring second load result");
            return;
        }
        *self = match result {
            Ok(asset) => {
                log::info!("[asset] {name} loaded");
                AssetSlot::Ready(asset)
            }
            Err(e) => {
                log::error!("[asset] {name} failed to load: {e}");
                AssetSlot::Failed
            }
        };
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            AssetSlot::Ready(a) => Some(a),
            _ => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            AssetSlot::Ready(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AssetSlot::Pending)
    }
}

/// Triangle mesh with flat per-vertex normals.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelHandle {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl ModelHandle {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Half-extents of the axis-aligned bounds, centered on the origin.
    pub fn half_extents(&self) -> Vec3 {
        self.positions
            .iter()
            .fold(Vec3::ZERO, |acc, p| acc.max(p.abs()))
    }
}

/// Parse the `v` / `f` subset of Wavefront OBJ. Faces with more than three
/// corners are fanned; `v/vt/vn` corner syntax and negative indices are
/// accepted, everything else is skipped.
pub fn parse_obj(name: &str, text: &str) -> Result<ModelHandle, AssetLoadFailure> {
    let mut verts: Vec<Vec3> = Vec::new();
    let mut tris: Vec<[usize; 3]> = Vec::new();

    for (lineno, raw) in text.lines().enumerate() {
        let line = lineno + 1;
        let mut parts = raw.split_whitespace();
        match parts.next() {
            Some("v") => {
                let mut xyz = [0.0f32; 3];
                for c in xyz.iter_mut() {
                    let tok = parts.next().ok_or_else(|| AssetLoadFailure::Parse {
                        line,
                        message: "vertex needs three coordinates".into(),
                    })?;
                    *c = tok.parse().map_err(|_| AssetLoadFailure::Parse {
                        line,
                        message: format!("bad coordinate {tok:?}"),
                    })?;
                }
                verts.push(Vec3::from(xyz));
            }
            Some("f") => {
                let corners = parts
                    .map(|tok| resolve_index(tok, verts.len(), line))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(AssetLoadFailure::Parse {
                        line,
                        message: "face needs at least three corners".into(),
                    });
                }
                for k in 1..corners.len() - 1 {
                    tris.push([corners[0], corners[k], corners[k + 1]]);
                }
            }
            _ => {}
        }
    }
    if tris.is_empty() {
        return Err(AssetLoadFailure::Empty);
    }

    // Unshare vertices so every triangle gets a flat normal.
    let mut positions = Vec::with_capacity(tris.len() * 3);
    let mut normals = Vec::with_capacity(tris.len() * 3);
    for [a, b, c] in tris {
        let (pa, pb, pc) = (verts[a], verts[b], verts[c]);
        let n = (pb - pa).cross(pc - pa).normalize_or_zero();
        positions.extend_from_slice(&[pa, pb, pc]);
        normals.extend_from_slice(&[n, n, n]);
    }
    let indices = (0..positions.len() as u32).collect();
    Ok(ModelHandle {
        name: name.to_string(),
        positions,
        normals,
        indices,
    })
}

fn resolve_index(tok: &str, count: usize, line: usize) -> Result<usize, AssetLoadFailure> {
    let head = tok.split('/').next().unwrap_or(tok);
    let idx: i64 = head.parse().map_err(|_| AssetLoadFailure::Parse {
        line,
        message: format!("bad face index {tok:?}"),
    })?;
    let resolved = if idx < 0 { count as i64 + idx } else { idx - 1 };
    if resolved < 0 || resolved as usize >= count {
        return Err(AssetLoadFailure::Parse {
            line,
            message: format!("face index {idx} out of range (have {count} vertices)"),
        });
    }
    Ok(resolved as usize)
}

/// Blocking load of an OBJ file. Call it off the frame thread.
pub fn load_obj(path: &Path) -> Result<ModelHandle, AssetLoadFailure> {
    let text = std::fs::read_to_string(path).map_err(|source| AssetLoadFailure::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");
    parse_obj(name, &text)
}

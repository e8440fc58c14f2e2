//! Mesh operations on a [`SerafinHeader`].
//!
//! - Programmatic construction from a triangulation
//! - 2D/3D structural copies (slice a 3D result, extrude a 2D mesh)
//! - Affine mesh transforms
//! - Nearest-node lookup and mesh comparison
//!
//! 3D prisms are numbered element by element, layer fastest: prism
//! `e * (nb_planes - 1) + l` sits on triangle `e` between planes `l` and
//! `l + 1`. Nodes are numbered plane by plane: node `p * nb_nodes_2d + n` is
//! 2D node `n` on plane `p`.

use std::collections::HashMap;

use super::error::RequestError;
use super::header::{build_ikle_2d, SerafinHeader};
use super::record::FloatType;
use crate::variables::Language;

/// One affine transform of mesh coordinates.
///
/// Transforms act on `(x, y, z)`. Only `x` and `y` are stored in the header;
/// the `z` part is available through [`MeshTransform::apply`] for callers
/// that transform elevation variables alongside the mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MeshTransform {
    /// Counter-clockwise rotation about the z axis, in radians.
    Rotation(f64),
    /// Anisotropic scaling.
    Scaling { x: f64, y: f64, z: f64 },
    /// Translation.
    Translation { x: f64, y: f64, z: f64 },
}

impl MeshTransform {
    /// Rotation given in degrees.
    pub fn rotation_degrees(angle: f64) -> Self {
        MeshTransform::Rotation(angle.to_radians())
    }

    /// Horizontal-only translation.
    pub fn translation_xy(x: f64, y: f64) -> Self {
        MeshTransform::Translation { x, y, z: 0.0 }
    }

    /// Horizontal-only scaling.
    pub fn scaling_xy(x: f64, y: f64) -> Self {
        MeshTransform::Scaling { x, y, z: 1.0 }
    }

    /// Apply to one point.
    #[inline]
    pub fn apply(&self, (x, y, z): (f64, f64, f64)) -> (f64, f64, f64) {
        match *self {
            MeshTransform::Rotation(angle) => {
                let (s, c) = angle.sin_cos();
                (c * x - s * y, s * x + c * y, z)
            }
            MeshTransform::Scaling {
                x: sx,
                y: sy,
                z: sz,
            } => (sx * x, sy * y, sz * z),
            MeshTransform::Translation {
                x: dx,
                y: dy,
                z: dz,
            } => (x + dx, y + dy, z + dz),
        }
    }
}

/// Apply a sequence of transforms in order.
pub fn apply_transforms(transforms: &[MeshTransform], point: (f64, f64, f64)) -> (f64, f64, f64) {
    transforms.iter().fold(point, |p, t| t.apply(p))
}

impl SerafinHeader {
    /// Build a 2D header from points and 0-indexed triangles.
    ///
    /// Boundary ranks in IPOBO are assigned to nodes lying on an edge used by
    /// a single triangle, in increasing node order. No variables are added.
    pub fn from_triangulation(
        points: &[(f64, f64)],
        triangles: &[[usize; 3]],
        language: Language,
        float_type: FloatType,
    ) -> Self {
        let mut header = SerafinHeader::empty(language, float_type);
        header.nb_nodes = points.len();
        header.nb_nodes_2d = points.len();
        header.nb_elements = triangles.len();
        header.x = points.iter().map(|p| p.0).collect();
        header.y = points.iter().map(|p| p.1).collect();
        header.ikle = triangles
            .iter()
            .flat_map(|t| t.iter().map(|&n| n as i32 + 1))
            .collect();
        header.ikle_2d = header.ikle.clone();
        header.ipobo = boundary_ranks(points.len(), triangles);
        header
    }

    /// Structural 2D copy of a 3D header: bottom plane nodes and triangles.
    ///
    /// The variable table is emptied since 2D and 3D catalogs differ.
    pub fn copy_as_2d(&self) -> Result<SerafinHeader, RequestError> {
        if self.is_2d() {
            return Err(RequestError::AlreadyTwoDimensional);
        }
        let n2 = self.nb_nodes_2d;
        let mut header = self.clone();
        header.nb_planes = 0;
        header.nb_nodes = n2;
        header.nb_elements = self.nb_elements_2d();
        header.nb_nodes_per_elem = 3;
        header.ikle = self.ikle_2d.clone();
        header.ikle_2d = self.ikle_2d.clone();
        header.ipobo = self.ipobo[..n2].to_vec();
        header.x = self.x[..n2].to_vec();
        header.y = self.y[..n2].to_vec();
        header.clear_variables();
        Ok(header)
    }

    /// Structural 3D copy of a 2D header, extruded over `nb_planes` planes.
    ///
    /// Boundary ranks are repeated on every plane, shifted by the largest 2D
    /// rank per plane. The variable table is emptied.
    pub fn copy_as_3d(&self, nb_planes: usize) -> Result<SerafinHeader, RequestError> {
        if !self.is_2d() {
            return Err(RequestError::AlreadyThreeDimensional);
        }
        if nb_planes < 2 {
            return Err(RequestError::InvalidPlaneCount(nb_planes));
        }
        let n2 = self.nb_nodes;
        let nb_layers = nb_planes - 1;
        let max_rank = self.ipobo.iter().copied().max().unwrap_or(0).max(0);

        let mut ikle = Vec::with_capacity(self.nb_elements * nb_layers * 6);
        for tri in self.ikle.chunks_exact(3) {
            for layer in 0..nb_layers {
                let below = (layer * n2) as i32;
                let above = ((layer + 1) * n2) as i32;
                ikle.extend(tri.iter().map(|&n| n + below));
                ikle.extend(tri.iter().map(|&n| n + above));
            }
        }

        let mut ipobo = Vec::with_capacity(n2 * nb_planes);
        for plane in 0..nb_planes {
            let shift = plane as i32 * max_rank;
            ipobo.extend(
                self.ipobo
                    .iter()
                    .map(|&rank| if rank > 0 { rank + shift } else { 0 }),
            );
        }

        let mut header = self.clone();
        header.nb_planes = nb_planes;
        header.nb_nodes = n2 * nb_planes;
        header.nb_nodes_2d = n2;
        header.nb_elements = self.nb_elements * nb_layers;
        header.nb_nodes_per_elem = 6;
        header.x = self.x.repeat(nb_planes);
        header.y = self.y.repeat(nb_planes);
        header.ikle_2d = build_ikle_2d(&ikle, 6, nb_planes);
        header.ikle = ikle;
        header.ipobo = ipobo;
        header.clear_variables();
        Ok(header)
    }

    /// Copy with transformed coordinates and a zero origin offset.
    pub fn transform_mesh(&self, transforms: &[MeshTransform]) -> SerafinHeader {
        let mut header = self.clone();
        for (x, y) in header.x.iter_mut().zip(header.y.iter_mut()) {
            let (tx, ty, _) = apply_transforms(transforms, (*x, *y, 0.0));
            *x = tx;
            *y = ty;
        }
        header.mesh_origin = (0, 0);
        header
    }

    /// 1-indexed number of the node closest to `(x, y)`; `None` without nodes.
    ///
    /// Linear scan; ties resolve to the lowest node number.
    pub fn nearest_node(&self, x: f64, y: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, (&nx, &ny)) in self.x.iter().zip(&self.y).enumerate() {
            let d2 = (nx - x) * (nx - x) + (ny - y) * (ny - y);
            match best {
                Some((_, best_d2)) if d2 >= best_d2 => {}
                _ => best = Some((i, d2)),
            }
        }
        best.map(|(i, _)| i + 1)
    }

    /// Whether two headers share the same 2D mesh exactly.
    pub fn same_2d_mesh(&self, other: &SerafinHeader) -> bool {
        let n = self.nb_nodes_2d;
        n == other.nb_nodes_2d
            && self.nb_elements_2d() == other.nb_elements_2d()
            && self.x[..n] == other.x[..n]
            && self.y[..n] == other.y[..n]
            && self.ikle_2d == other.ikle_2d
    }
}

/// Boundary rank per node: nodes on a single-triangle edge, numbered from 1.
fn boundary_ranks(nb_nodes: usize, triangles: &[[usize; 3]]) -> Vec<i32> {
    let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
    for t in triangles {
        for k in 0..3 {
            let (a, b) = (t[k], t[(k + 1) % 3]);
            *edge_count.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }

    let mut on_boundary = vec![false; nb_nodes];
    for (&(a, b), &count) in &edge_count {
        if count == 1 {
            on_boundary[a] = true;
            on_boundary[b] = true;
        }
    }

    let mut rank = 0;
    on_boundary
        .iter()
        .map(|&b| {
            if b {
                rank += 1;
                rank
            } else {
                0
            }
        })
        .collect()
}

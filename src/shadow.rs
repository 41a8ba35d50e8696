//! Shadow volumes from silhouette edges.
//!
//! Every frame each segment's positions are moved into world space, both
//! faces around every adjacent edge are tested against the light, and each
//! edge where exactly one face is lit becomes an extruded quad. Quads are
//! emitted in both windings so stencil passes see front and back faces from
//! any view direction.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

use crate::math::triangle_normal;
use crate::mesh::SegmentMesh;
use crate::{ArmError, Result};

/// Shadow volume vertex, world space
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ShadowVertex {
    pub position: [f32; 3],
}

const_assert_eq!(std::mem::size_of::<ShadowVertex>(), 12);

/// Index pattern of one silhouette quad relative to its first vertex.
/// Vertices are `v1, v2, v1', v2'`; the second half is the reverse winding.
const QUAD_INDICES: [u32; 12] = [0, 1, 2, 1, 3, 2, 0, 2, 1, 1, 2, 3];

/// How the far side of a silhouette quad is placed
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extrusion {
    /// `v' = v - light`: a fixed offset, not a projection to infinity
    #[default]
    LightOffset,
    /// `v' = v + normalize(v - light) * distance`
    Projected { distance: f32 },
}

impl Extrusion {
    #[inline]
    pub fn extrude(self, v: Vec3, light: Vec3) -> Vec3 {
        match self {
            Extrusion::LightOffset => v - light,
            Extrusion::Projected { distance } => v + (v - light).normalize_or_zero() * distance,
        }
    }
}

/// Shadow geometry of one segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadowVolumeMesh {
    pub vertices: Vec<ShadowVertex>,
    pub indices: Vec<u32>,
}

impl ShadowVolumeMesh {
    /// Number of silhouette edges that produced this mesh
    pub fn edge_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Shadow geometry of the whole arm, one sub-mesh per segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadowVolume {
    pub segments: Vec<ShadowVolumeMesh>,
}

impl ShadowVolume {
    pub fn index_count(&self) -> usize {
        self.segments.iter().map(|s| s.indices.len()).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.segments.iter().map(|s| s.vertices.len()).sum()
    }

    pub fn edge_count(&self) -> usize {
        self.segments.iter().map(ShadowVolumeMesh::edge_count).sum()
    }

    /// Concatenate all segments into one buffer pair with rebased indices
    pub fn merged(&self) -> ShadowVolumeMesh {
        let mut out = ShadowVolumeMesh {
            vertices: Vec::with_capacity(self.vertex_count()),
            indices: Vec::with_capacity(self.index_count()),
        };
        for segment in &self.segments {
            let base = out.vertices.len() as u32;
            out.vertices.extend_from_slice(&segment.vertices);
            out.indices.extend(segment.indices.iter().map(|i| i + base));
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ShadowVolumeBuilder {
    pub extrusion: Extrusion,
}

impl ShadowVolumeBuilder {
    pub fn new(extrusion: Extrusion) -> Self {
        Self { extrusion }
    }

    /// Signed light-facing measure of a triangle: its normal dotted with the
    /// vector from its first corner to the light
    fn facing(mesh: &SegmentMesh, world: &[Vec3], triangle: u32, light: Vec3) -> f32 {
        let [a, b, c] = mesh
            .triangle_positions(triangle as usize)
            .map(|p| world[p as usize]);
        triangle_normal(a, b, c).dot(light - a)
    }

    /// Indices into `mesh.edges` of the edges separating a lit face from an
    /// unlit one. `world` holds the mesh positions already in world space.
    pub fn silhouette_edges(&self, mesh: &SegmentMesh, world: &[Vec3], light: Vec3) -> Vec<usize> {
        mesh.edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| {
                let d1 = Self::facing(mesh, world, edge.t1, light);
                let d2 = Self::facing(mesh, world, edge.t2, light);
                (d1 > 0.0 && d2 <= 0.0) || (d1 <= 0.0 && d2 > 0.0)
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Shadow geometry of a single segment placed by `transform`
    pub fn build_segment(&self, mesh: &SegmentMesh, transform: &Mat4, light: Vec3) -> ShadowVolumeMesh {
        let world = mesh.world_positions(transform);
        let silhouette = self.silhouette_edges(mesh, &world, light);

        let mut out = ShadowVolumeMesh {
            vertices: Vec::with_capacity(silhouette.len() * 4),
            indices: Vec::with_capacity(silhouette.len() * QUAD_INDICES.len()),
        };

        for i in silhouette {
            let edge = mesh.edges[i];
            let v1 = world[edge.v1 as usize];
            let v2 = world[edge.v2 as usize];
            let base = out.vertices.len() as u32;

            for v in [
                v1,
                v2,
                self.extrusion.extrude(v1, light),
                self.extrusion.extrude(v2, light),
            ] {
                out.vertices.push(ShadowVertex {
                    position: v.to_array(),
                });
            }
            out.indices.extend(QUAD_INDICES.iter().map(|k| base + k));
        }

        out
    }

    /// Shadow volume of the whole arm for the current pose.
    ///
    /// `meshes` and `transforms` are matched by segment index and must have
    /// the same length.
    pub fn build(&self, meshes: &[SegmentMesh], transforms: &[Mat4], light: Vec3) -> Result<ShadowVolume> {
        if meshes.len() != transforms.len() {
            return Err(ArmError::SegmentCountMismatch {
                meshes: meshes.len(),
                transforms: transforms.len(),
            });
        }

        let segments: Vec<ShadowVolumeMesh> = meshes
            .iter()
            .zip(transforms)
            .map(|(mesh, transform)| self.build_segment(mesh, transform, light))
            .collect();

        let volume = ShadowVolume { segments };
        log::debug!(
            "Shadow volume: {} silhouette edges, {} indices",
            volume.edge_count(),
            volume.index_count()
        );
        Ok(volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::f32::consts::PI;

    fn unit_box() -> SegmentMesh {
        include_str!("../assets/meshes/unit_box.txt").parse().unwrap()
    }

    /// Silhouette as a set of sorted position pairs
    fn silhouette_set(mesh: &SegmentMesh, transform: &Mat4, light: Vec3) -> BTreeSet<(u32, u32)> {
        let world = mesh.world_positions(transform);
        ShadowVolumeBuilder::default()
            .silhouette_edges(mesh, &world, light)
            .into_iter()
            .map(|i| {
                let e = mesh.edges[i];
                (e.v1.min(e.v2), e.v1.max(e.v2))
            })
            .collect()
    }

    /// Edges bounding the face whose positions all satisfy `on_face`
    fn face_ring(mesh: &SegmentMesh, on_face: impl Fn(Vec3) -> bool) -> BTreeSet<(u32, u32)> {
        mesh.edges
            .iter()
            .filter(|e| on_face(mesh.positions[e.v1 as usize]) && on_face(mesh.positions[e.v2 as usize]))
            // Skip the face diagonal: a ring edge runs along one axis
            .filter(|e| {
                let d = mesh.positions[e.v1 as usize] - mesh.positions[e.v2 as usize];
                d.abs().cmpgt(Vec3::splat(1e-6)).bitmask().count_ones() == 1
            })
            .map(|e| (e.v1.min(e.v2), e.v1.max(e.v2)))
            .collect()
    }

    #[test]
    fn test_light_above_outlines_top_face() {
        let mesh = unit_box();
        let set = silhouette_set(&mesh, &Mat4::IDENTITY, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(set.len(), 4);
        assert_eq!(set, face_ring(&mesh, |p| p.y > 0.0));

        // From below the outline moves to the opposite ring
        let below = silhouette_set(&mesh, &Mat4::IDENTITY, Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(below, face_ring(&mesh, |p| p.y < 0.0));
        assert!(set.is_disjoint(&below));
    }

    #[test]
    fn test_light_rotated_half_turn_gives_opposite_outline() {
        let mesh = unit_box();
        let light = Vec3::new(5.0, 0.0, 0.0);
        let turned = Mat4::from_rotation_y(PI).transform_point3(light);

        let side = silhouette_set(&mesh, &Mat4::IDENTITY, light);
        let opposite = silhouette_set(&mesh, &Mat4::IDENTITY, turned);

        assert_eq!(side, face_ring(&mesh, |p| p.x > 0.0));
        assert_eq!(opposite, face_ring(&mesh, |p| p.x < 0.0));
        assert!(side.is_disjoint(&opposite));
    }

    #[test]
    fn test_silhouette_follows_segment_transform() {
        // Turning the box instead of the light gives the same outline
        let mesh = unit_box();
        let light = Vec3::new(0.0, 5.0, 0.0);
        let flipped = Mat4::from_rotation_x(PI);

        let set = silhouette_set(&mesh, &flipped, light);
        assert_eq!(set, face_ring(&mesh, |p| p.y < 0.0));
    }

    #[test]
    fn test_each_edge_emits_one_double_sided_quad() {
        let mesh = unit_box();
        let builder = ShadowVolumeBuilder::default();
        let light = Vec3::new(3.0, 4.0, 2.0);

        let shadow = builder.build_segment(&mesh, &Mat4::IDENTITY, light);
        let edges = shadow.edge_count();
        assert!(edges > 0);
        assert_eq!(shadow.vertices.len(), 4 * edges);
        assert_eq!(shadow.indices.len(), 12 * edges);

        for (q, quad) in shadow.indices.chunks(12).enumerate() {
            let base = 4 * q as u32;
            assert!(quad.iter().all(|i| (base..base + 4).contains(i)));

            // Second half is the first half with each triangle reversed
            let (front, back) = quad.split_at(6);
            let reversed: Vec<u32> = front.chunks(3).flat_map(|t| [t[0], t[2], t[1]]).collect();
            let mut back_sorted: Vec<[u32; 3]> = back.chunks(3).map(sorted_rotation).collect();
            let mut reversed_sorted: Vec<[u32; 3]> = reversed.chunks(3).map(sorted_rotation).collect();
            back_sorted.sort();
            reversed_sorted.sort();
            assert_eq!(back_sorted, reversed_sorted);
        }
    }

    /// Triangle rotated so its smallest index comes first (winding preserved)
    fn sorted_rotation(t: &[u32]) -> [u32; 3] {
        let k = (0..3).min_by_key(|&i| t[i]).unwrap_or(0);
        [t[k], t[(k + 1) % 3], t[(k + 2) % 3]]
    }

    #[test]
    fn test_light_offset_extrusion() {
        let mesh = unit_box();
        let light = Vec3::new(0.0, 5.0, 0.0);
        let shadow = ShadowVolumeBuilder::default().build_segment(&mesh, &Mat4::IDENTITY, light);

        for quad in shadow.vertices.chunks(4) {
            let [v1, v2, e1, e2] = [0, 1, 2, 3].map(|i| Vec3::from_array(quad[i].position));
            assert!(e1.distance(v1 - light) < 1e-6);
            assert!(e2.distance(v2 - light) < 1e-6);
        }
    }

    #[test]
    fn test_projected_extrusion_moves_away_from_light() {
        let mesh = unit_box();
        let light = Vec3::new(0.0, 5.0, 0.0);
        let builder = ShadowVolumeBuilder::new(Extrusion::Projected { distance: 20.0 });
        let shadow = builder.build_segment(&mesh, &Mat4::IDENTITY, light);

        for quad in shadow.vertices.chunks(4) {
            let v1 = Vec3::from_array(quad[0].position);
            let e1 = Vec3::from_array(quad[2].position);
            assert!((e1.distance(v1) - 20.0).abs() < 1e-4);
            assert!(e1.distance(light) > v1.distance(light));
        }
    }

    #[test]
    fn test_build_checks_segment_counts() {
        let mesh = unit_box();
        let builder = ShadowVolumeBuilder::default();

        let result = builder.build(&[mesh.clone(), mesh.clone()], &[Mat4::IDENTITY], Vec3::Y * 5.0);
        assert!(matches!(
            result,
            Err(ArmError::SegmentCountMismatch {
                meshes: 2,
                transforms: 1
            })
        ));

        let volume = builder
            .build(&[mesh.clone(), mesh], &[Mat4::IDENTITY, Mat4::from_translation(Vec3::X * 3.0)], Vec3::Y * 5.0)
            .unwrap();
        assert_eq!(volume.segments.len(), 2);
        assert_eq!(volume.index_count(), 12 * volume.edge_count());

        let merged = volume.merged();
        assert_eq!(merged.vertices.len(), volume.vertex_count());
        assert!(merged.indices.iter().all(|&i| (i as usize) < merged.vertices.len()));
    }

    #[test]
    fn test_light_inside_lights_nothing() {
        let mesh = unit_box();
        let shadow = ShadowVolumeBuilder::default().build_segment(&mesh, &Mat4::IDENTITY, Vec3::ZERO);
        assert!(shadow.is_empty());
        assert!(shadow.vertex_bytes().is_empty());
    }
}

//! Segment mesh topology: loader for the line-oriented text format and
//! edge adjacency used by the silhouette pass.
//!
//! File layout, whitespace separated:
//!
//! ```text
//! <position count>
//! x y z                      (one per position)
//! <vertex count>
//! position_index nx ny nz    (one per render vertex)
//! <triangle count>
//! i1 i2 i3                   (render vertex indices)
//! [<edge count>
//!  v1 v2 t1 t2]              (position indices, adjacent triangle indices)
//! ```
//!
//! The edge section is optional; when the file ends after the triangles the
//! adjacency is derived from shared position indices.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use static_assertions::const_assert_eq;

use crate::{ArmError, Result};

/// Render vertex: model-space position and normal
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

const_assert_eq!(std::mem::size_of::<MeshVertex>(), 24);

/// Undirected edge shared by two triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Endpoints as position indices
    pub v1: u32,
    pub v2: u32,
    /// Adjacent triangles
    pub t1: u32,
    pub t2: u32,
}

/// Static topology of one rigid arm segment
#[derive(Debug, Clone, Default)]
pub struct SegmentMesh {
    /// Distinct model-space positions
    pub positions: Vec<Vec3>,
    /// Render vertices (position duplicated per normal)
    pub vertices: Vec<MeshVertex>,
    /// Position index of each render vertex
    pub vertex_positions: Vec<u32>,
    /// Triangles as render vertex indices
    pub triangles: Vec<[u32; 3]>,
    pub edges: Vec<Edge>,
}

/// Whitespace tokenizer that remembers the line of each token
struct Tokens<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    current: Option<(usize, std::str::SplitWhitespace<'a>)>,
    last_line: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            current: None,
            last_line: 1,
        }
    }

    fn next_token(&mut self) -> Option<(usize, &'a str)> {
        loop {
            if let Some((line, words)) = self.current.as_mut() {
                if let Some(word) = words.next() {
                    self.last_line = *line;
                    return Some((*line, word));
                }
            }
            let (i, text) = self.lines.next()?;
            self.current = Some((i + 1, text.split_whitespace()));
        }
    }

    fn parse<T: FromStr>(&mut self, what: &str) -> Result<(usize, T)> {
        let Some((line, word)) = self.next_token() else {
            return Err(ArmError::MalformedMeshData {
                line: self.last_line,
                reason: format!("unexpected end of data, expected {}", what),
            });
        };
        word.parse::<T>()
            .map(|value| (line, value))
            .map_err(|_| ArmError::MalformedMeshData {
                line,
                reason: format!("expected {}, found '{}'", what, word),
            })
    }

    fn value<T: FromStr>(&mut self, what: &str) -> Result<T> {
        self.parse(what).map(|(_, value)| value)
    }

    /// Parse an index and check it against `bound`
    fn index(&mut self, what: &str, bound: usize) -> Result<u32> {
        let (line, value) = self.parse::<u32>(what)?;
        if value as usize >= bound {
            return Err(ArmError::MalformedMeshData {
                line,
                reason: format!("{} {} out of range (count is {})", what, value, bound),
            });
        }
        Ok(value)
    }

    fn vec3(&mut self, what: &str) -> Result<Vec3> {
        Ok(Vec3::new(
            self.value(what)?,
            self.value(what)?,
            self.value(what)?,
        ))
    }
}

impl FromStr for SegmentMesh {
    type Err = ArmError;

    fn from_str(text: &str) -> Result<Self> {
        let mut tokens = Tokens::new(text);

        let position_count: usize = tokens.value("position count")?;
        let mut positions = Vec::with_capacity(position_count);
        for _ in 0..position_count {
            positions.push(tokens.vec3("position coordinate")?);
        }

        let vertex_count: usize = tokens.value("vertex count")?;
        let mut vertices = Vec::with_capacity(vertex_count);
        let mut vertex_positions = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            let p = tokens.index("position index", position_count)?;
            let normal = tokens.vec3("normal component")?;
            vertex_positions.push(p);
            vertices.push(MeshVertex {
                position: positions[p as usize].to_array(),
                normal: normal.to_array(),
            });
        }

        let triangle_count: usize = tokens.value("triangle count")?;
        let mut triangles = Vec::with_capacity(triangle_count);
        for _ in 0..triangle_count {
            triangles.push([
                tokens.index("vertex index", vertex_count)?,
                tokens.index("vertex index", vertex_count)?,
                tokens.index("vertex index", vertex_count)?,
            ]);
        }

        let mut mesh = SegmentMesh {
            positions,
            vertices,
            vertex_positions,
            triangles,
            edges: Vec::new(),
        };

        // Optional adjacency section
        match tokens.next_token() {
            None => mesh.edges = mesh.derive_edges(),
            Some((line, word)) => {
                let edge_count: usize = word.parse().map_err(|_| ArmError::MalformedMeshData {
                    line,
                    reason: format!("expected edge count, found '{}'", word),
                })?;
                let mut edges = Vec::with_capacity(edge_count);
                for _ in 0..edge_count {
                    let edge = Edge {
                        v1: tokens.index("edge position index", position_count)?,
                        v2: tokens.index("edge position index", position_count)?,
                        t1: tokens.index("edge triangle index", triangle_count)?,
                        t2: tokens.index("edge triangle index", triangle_count)?,
                    };
                    if edge.v1 == edge.v2 {
                        return Err(ArmError::MalformedMeshData {
                            line: tokens.last_line,
                            reason: format!("degenerate edge {} {}", edge.v1, edge.v2),
                        });
                    }
                    if edge.t1 == edge.t2 {
                        return Err(ArmError::MalformedMeshData {
                            line: tokens.last_line,
                            reason: format!(
                                "edge {} {} lists triangle {} twice",
                                edge.v1, edge.v2, edge.t1
                            ),
                        });
                    }
                    for t in [edge.t1, edge.t2] {
                        let corners = mesh.triangle_positions(t as usize);
                        if !corners.contains(&edge.v1) || !corners.contains(&edge.v2) {
                            return Err(ArmError::MalformedMeshData {
                                line: tokens.last_line,
                                reason: format!(
                                    "edge {} {} is not a side of triangle {}",
                                    edge.v1, edge.v2, t
                                ),
                            });
                        }
                    }
                    edges.push(edge);
                }
                mesh.edges = edges;
            }
        }

        if let Some((line, word)) = tokens.next_token() {
            return Err(ArmError::MalformedMeshData {
                line,
                reason: format!("unexpected trailing data '{}'", word),
            });
        }

        log::info!(
            "Loaded segment mesh: {} positions, {} vertices, {} triangles, {} edges",
            mesh.positions.len(),
            mesh.vertices.len(),
            mesh.triangles.len(),
            mesh.edges.len()
        );

        Ok(mesh)
    }
}

impl SegmentMesh {
    /// Read and parse one topology file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        text.parse()
    }

    /// Load the meshes of all segments, in chain order
    pub fn load_segments<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Self>> {
        paths.iter().map(Self::load).collect()
    }

    /// Position indices of a triangle's corners
    #[inline]
    pub fn triangle_positions(&self, triangle: usize) -> [u32; 3] {
        self.triangles[triangle].map(|v| self.vertex_positions[v as usize])
    }

    /// Build edge adjacency from triangles sharing position pairs.
    ///
    /// Boundary edges (one triangle) are dropped. Edges with more than two
    /// triangles pair the first two and are reported.
    pub fn derive_edges(&self) -> Vec<Edge> {
        // Keyed on the sorted pair so both directions meet; BTreeMap keeps
        // the output order stable
        let mut shared: BTreeMap<(u32, u32), (u32, u32, Vec<u32>)> = BTreeMap::new();

        for t in 0..self.triangles.len() {
            let [a, b, c] = self.triangle_positions(t);
            for (v1, v2) in [(a, b), (b, c), (c, a)] {
                if v1 == v2 {
                    continue;
                }
                shared
                    .entry((v1.min(v2), v1.max(v2)))
                    .or_insert_with(|| (v1, v2, Vec::new()))
                    .2
                    .push(t as u32);
            }
        }

        let mut boundary = 0;
        let mut edges = Vec::with_capacity(shared.len());
        for ((lo, hi), (v1, v2, tris)) in shared {
            match tris.as_slice() {
                [t1, t2] => edges.push(Edge { v1, v2, t1: *t1, t2: *t2 }),
                [_] => boundary += 1,
                [t1, t2, ..] => {
                    log::warn!(
                        "Non-manifold edge ({}, {}) shared by {} triangles",
                        lo,
                        hi,
                        tris.len()
                    );
                    edges.push(Edge { v1, v2, t1: *t1, t2: *t2 });
                }
                [] => {}
            }
        }

        log::debug!(
            "Derived {} adjacent edges ({} boundary edges skipped)",
            edges.len(),
            boundary
        );
        edges
    }

    /// Positions transformed into world space by a segment matrix
    pub fn world_positions(&self, transform: &Mat4) -> Vec<Vec3> {
        self.positions
            .iter()
            .map(|p| transform.transform_point3(*p))
            .collect()
    }

    /// Flattened triangle indices
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }
}

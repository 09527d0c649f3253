//! Mesh modifiers for evaluating rock stacks
//!
//! These are the executable counterparts of the declarative
//! [`ModifierStackEntry`](crate::ModifierStackEntry) kinds. A host that has its
//! own bevel and subdivision implementations does not need them.
//!
//! # Fluent API
//!
//! ```no_run
//! use rock_builder::mesh::*;
//! use rock_builder::procedural::{generate_icosphere, UnpackedMesh};
//!
//! let mut mesh: UnpackedMesh = generate_icosphere(1.0, 2);
//! mesh.apply(Bevel::default())
//!     .apply(SubdivisionSurface { levels: 1 })
//!     .apply(SmoothNormals::default());
//! ```

use glam::Vec3;
use hashbrown::{HashMap, HashSet};

use crate::procedural::UnpackedMesh;

/// Trait for mesh modifiers
pub trait MeshModifier {
    /// Apply this modifier to a mesh, modifying it in place
    fn apply(&self, mesh: &mut UnpackedMesh);
}

/// Extension trait for fluent modifier application
pub trait MeshApply {
    /// Apply a modifier and return `&mut Self` for chaining
    fn apply<M: MeshModifier>(&mut self, modifier: M) -> &mut Self;
}

impl MeshApply for UnpackedMesh {
    fn apply<M: MeshModifier>(&mut self, modifier: M) -> &mut Self {
        modifier.apply(self);
        self
    }
}

type EdgeKey = (u32, u32);

fn edge_key(a: u32, b: u32) -> EdgeKey {
    if a < b { (a, b) } else { (b, a) }
}

fn face_normal(mesh: &UnpackedMesh, [a, b, c]: [u32; 3]) -> Vec3 {
    let p0 = Vec3::from(mesh.positions[a as usize]);
    let p1 = Vec3::from(mesh.positions[b as usize]);
    let p2 = Vec3::from(mesh.positions[c as usize]);
    (p1 - p0).cross(p2 - p0)
}

/// Recalculate normals by averaging face normals for shared positions
///
/// Vertices closer than `weld_threshold` are treated as one point, so seams
/// left by the bevel still shade smoothly. Face normals are area weighted.
pub struct SmoothNormals {
    /// Distance threshold for considering vertices as sharing a position
    pub weld_threshold: f32,
}

impl Default for SmoothNormals {
    fn default() -> Self {
        Self {
            weld_threshold: 0.0001,
        }
    }
}

impl MeshModifier for SmoothNormals {
    fn apply(&self, mesh: &mut UnpackedMesh) {
        let inv_cell = 1.0 / self.weld_threshold.max(f32::EPSILON);
        let cell_of = |p: [f32; 3]| -> [i64; 3] {
            [
                (p[0] * inv_cell).round() as i64,
                (p[1] * inv_cell).round() as i64,
                (p[2] * inv_cell).round() as i64,
            ]
        };

        // Group vertices by quantized position
        let mut groups: HashMap<[i64; 3], Vec3> = HashMap::new();
        let triangles: Vec<[u32; 3]> = mesh.triangles().collect();
        for tri in &triangles {
            // Cross product length is twice the area, which is the weighting we want
            let n = face_normal(mesh, *tri);
            for &v in tri {
                *groups.entry(cell_of(mesh.positions[v as usize])).or_insert(Vec3::ZERO) += n;
            }
        }

        mesh.normals = mesh
            .positions
            .iter()
            .map(|p| {
                groups
                    .get(&cell_of(*p))
                    .map(|n| n.normalize_or_zero())
                    .unwrap_or(Vec3::ZERO)
                    .to_array()
            })
            .collect();
    }
}

/// Loop subdivision surface
///
/// Each level splits every triangle in four and repositions vertices with
/// Loop's weights, so the surface both refines and smooths. Edges without
/// exactly two faces fall back to plain midpoints and their vertices stay put.
///
/// # Complexity
///
/// - Triangles: 4x per level
/// - Vertices: roughly 4x per level
pub struct SubdivisionSurface {
    pub levels: u32,
}

impl Default for SubdivisionSurface {
    fn default() -> Self {
        Self { levels: 1 }
    }
}

impl MeshModifier for SubdivisionSurface {
    fn apply(&self, mesh: &mut UnpackedMesh) {
        for _ in 0..self.levels {
            loop_subdivide_once(mesh);
        }
        if self.levels > 0 {
            SmoothNormals::default().apply(mesh);
        }
    }
}

/// Perform a single Loop subdivision pass
fn loop_subdivide_once(mesh: &mut UnpackedMesh) {
    let vertex_count = mesh.positions.len();
    let positions: Vec<Vec3> = mesh.positions.iter().map(|p| Vec3::from(*p)).collect();
    let triangles: Vec<[u32; 3]> = mesh.triangles().collect();

    // Edge -> opposite vertices of the faces sharing it
    let mut opposite: HashMap<EdgeKey, Vec<u32>> = HashMap::new();
    for &[a, b, c] in &triangles {
        opposite.entry(edge_key(a, b)).or_default().push(c);
        opposite.entry(edge_key(b, c)).or_default().push(a);
        opposite.entry(edge_key(c, a)).or_default().push(b);
    }

    // Vertex neighbours, and whether the vertex touches an irregular edge
    let mut neighbours: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];
    let mut irregular = vec![false; vertex_count];
    for (&(a, b), faces) in &opposite {
        neighbours[a as usize].push(b);
        neighbours[b as usize].push(a);
        if faces.len() != 2 {
            irregular[a as usize] = true;
            irregular[b as usize] = true;
        }
    }

    // Even vertices
    let mut new_positions: Vec<Vec3> = Vec::with_capacity(vertex_count + opposite.len());
    for (i, p) in positions.iter().enumerate() {
        let ring = &neighbours[i];
        let n = ring.len();
        if irregular[i] || n < 3 {
            new_positions.push(*p);
            continue;
        }
        let beta = if n == 3 { 3.0 / 16.0 } else { 3.0 / (8.0 * n as f32) };
        let sum: Vec3 = ring.iter().map(|&j| positions[j as usize]).sum();
        new_positions.push(*p * (1.0 - n as f32 * beta) + sum * beta);
    }

    // Odd (edge) vertices, created in triangle order for determinism
    let mut edge_vertex: HashMap<EdgeKey, u32> = HashMap::with_capacity(opposite.len());
    let mut new_indices = Vec::with_capacity(mesh.indices.len() * 4);

    let mut odd = |a: u32, b: u32, new_positions: &mut Vec<Vec3>| -> u32 {
        let key = edge_key(a, b);
        *edge_vertex.entry(key).or_insert_with(|| {
            let pa = positions[a as usize];
            let pb = positions[b as usize];
            let p = match opposite.get(&key).map(Vec::as_slice) {
                Some(&[c, d]) => {
                    (pa + pb) * 0.375 + (positions[c as usize] + positions[d as usize]) * 0.125
                }
                _ => (pa + pb) * 0.5,
            };
            new_positions.push(p);
            (new_positions.len() - 1) as u32
        })
    };

    for &[i0, i1, i2] in &triangles {
        let m01 = odd(i0, i1, &mut new_positions);
        let m12 = odd(i1, i2, &mut new_positions);
        let m20 = odd(i2, i0, &mut new_positions);

        new_indices.extend_from_slice(&[i0, m01, m20]);
        new_indices.extend_from_slice(&[m01, i1, m12]);
        new_indices.extend_from_slice(&[m20, m12, i2]);
        new_indices.extend_from_slice(&[m01, m12, m20]);
    }

    mesh.normals = vec![[0.0; 3]; new_positions.len()];
    mesh.positions = new_positions.iter().map(|p| p.to_array()).collect();
    mesh.indices = new_indices;
}

/// Bevel edges whose faces meet at more than an angle threshold
///
/// Builds a flat chamfer: around every vertex the sharp edges split the face
/// fan into wedges, each wedge gets its own copy of the vertex moved `width`
/// into its faces, and the gaps are closed with a quad per sharp edge plus a
/// cap where three or more sharp edges meet. A closed input stays closed.
/// Smooth regions are untouched, so on a fine icosphere with a 30 degree limit
/// nothing happens until the jitter has produced some creases.
pub struct Bevel {
    /// Inset distance from the edge
    pub width: f32,
    /// Number of bevel segments. Only a flat chamfer is built, so any value
    /// above zero gives the same result.
    pub segments: u32,
    /// Minimum angle between face normals (degrees) for an edge to be beveled.
    /// `None` bevels every edge.
    pub angle_threshold_degrees: Option<f32>,
}

impl Default for Bevel {
    fn default() -> Self {
        Self {
            width: 0.025,
            segments: 1,
            angle_threshold_degrees: Some(30.0),
        }
    }
}

fn find_root(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find_root(parent, a), find_root(parent, b));
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}

/// Corner slot (`face * 3 + k`) of vertex `v` in triangle `face`
fn corner(triangles: &[[u32; 3]], face: usize, v: u32) -> usize {
    face * 3 + triangles[face].iter().position(|&i| i == v).unwrap_or(0)
}

fn has_directed_edge(tri: [u32; 3], a: u32, b: u32) -> bool {
    (0..3).any(|k| tri[k] == a && tri[(k + 1) % 3] == b)
}

impl MeshModifier for Bevel {
    fn apply(&self, mesh: &mut UnpackedMesh) {
        if mesh.indices.is_empty() || self.width <= 0.0 || self.segments == 0 {
            return;
        }

        let cos_threshold = self
            .angle_threshold_degrees
            .map(|deg| deg.to_radians().cos());

        let positions: Vec<Vec3> = mesh.positions.iter().map(|p| Vec3::from(*p)).collect();
        let triangles: Vec<[u32; 3]> = mesh.triangles().collect();
        let face_normals: Vec<Vec3> = triangles
            .iter()
            .map(|tri| face_normal(mesh, *tri).normalize_or_zero())
            .collect();

        // Edge -> faces sharing it
        let mut edge_faces: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
        for (face_idx, &[a, b, c]) in triangles.iter().enumerate() {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                edge_faces.entry(edge_key(u, v)).or_default().push(face_idx);
            }
        }

        // Corners of a vertex stay joined across smooth edges; sharp edges
        // separate them into wedges. Boundary and non-manifold edges are
        // never beveled.
        let mut parent: Vec<usize> = (0..triangles.len() * 3).collect();
        let mut sharp: Vec<(EdgeKey, usize, usize)> = Vec::new();
        for (&(a, b), faces) in &edge_faces {
            let &[f, g] = faces.as_slice() else {
                for pair in faces.windows(2) {
                    for v in [a, b] {
                        let (c0, c1) = (corner(&triangles, pair[0], v), corner(&triangles, pair[1], v));
                        union(&mut parent, c0, c1);
                    }
                }
                continue;
            };
            let is_sharp =
                cos_threshold.is_none_or(|cos| face_normals[f].dot(face_normals[g]) < cos);
            if is_sharp {
                sharp.push(((a, b), f, g));
            } else {
                for v in [a, b] {
                    union(&mut parent, corner(&triangles, f, v), corner(&triangles, g, v));
                }
            }
        }

        if sharp.is_empty() {
            return;
        }
        sharp.sort_unstable_by_key(|(key, ..)| *key);

        // Wedges of each vertex, in corner order
        let mut wedges: Vec<Vec<usize>> = vec![Vec::new(); positions.len()];
        let mut wedge_faces: HashMap<usize, Vec<usize>> = HashMap::new();
        for c in 0..triangles.len() * 3 {
            let root = find_root(&mut parent, c);
            let v = triangles[c / 3][c % 3] as usize;
            if !wedges[v].contains(&root) {
                wedges[v].push(root);
            }
            wedge_faces.entry(root).or_default().push(c / 3);
        }

        let centroid = |f: usize| -> Vec3 {
            let [a, b, c] = triangles[f];
            (positions[a as usize] + positions[b as usize] + positions[c as usize]) / 3.0
        };

        // One vertex per wedge. The first wedge reuses the original index.
        let mut new_positions = positions.clone();
        let mut origin: Vec<u32> = (0..positions.len() as u32).collect();
        let mut wedge_vertex: HashMap<usize, u32> = HashMap::new();
        for (v, roots) in wedges.iter().enumerate() {
            if roots.len() < 2 {
                if let Some(&root) = roots.first() {
                    wedge_vertex.insert(root, v as u32);
                }
                continue;
            }
            let p = positions[v];
            for (i, root) in roots.iter().enumerate() {
                let faces = wedge_faces.get(root).map(Vec::as_slice).unwrap_or_default();
                let toward: Vec3 = faces.iter().map(|&f| centroid(f) - p).sum();
                // Stay well inside the wedge's faces
                let reach = faces
                    .iter()
                    .map(|&f| (centroid(f) - p).length() * 0.5)
                    .fold(f32::INFINITY, f32::min);
                let moved = p + toward.normalize_or_zero() * self.width.min(reach);

                let index = if i == 0 {
                    new_positions[v] = moved;
                    v as u32
                } else {
                    new_positions.push(moved);
                    origin.push(v as u32);
                    (new_positions.len() - 1) as u32
                };
                wedge_vertex.insert(*root, index);
            }
        }

        let mut corner_vertex = Vec::with_capacity(triangles.len() * 3);
        for c in 0..triangles.len() * 3 {
            let root = find_root(&mut parent, c);
            let fallback = triangles[c / 3][c % 3];
            corner_vertex.push(wedge_vertex.get(&root).copied().unwrap_or(fallback));
        }

        let mut new_triangles: Vec<[u32; 3]> = (0..triangles.len())
            .map(|f| [corner_vertex[f * 3], corner_vertex[f * 3 + 1], corner_vertex[f * 3 + 2]])
            .collect();

        // One quad per sharp edge, collapsing to a triangle at ends that did
        // not split
        for ((a, b), f, g) in sharp {
            let (left, right) = if has_directed_edge(triangles[f], a, b) {
                (f, g)
            } else {
                (g, f)
            };
            let a1 = corner_vertex[corner(&triangles, left, a)];
            let b1 = corner_vertex[corner(&triangles, left, b)];
            let a2 = corner_vertex[corner(&triangles, right, a)];
            let b2 = corner_vertex[corner(&triangles, right, b)];
            if a1 != a2 {
                new_triangles.push([a1, a2, b2]);
            }
            if b1 != b2 {
                new_triangles.push([a1, b2, b1]);
            }
        }

        // Cap the holes left where three or more wedges meet
        let directed: HashSet<(u32, u32)> = new_triangles
            .iter()
            .flat_map(|&[a, b, c]| [(a, b), (b, c), (c, a)])
            .collect();
        let mut cap_next: HashMap<u32, u32> = HashMap::new();
        for &(u, w) in &directed {
            if origin[u as usize] == origin[w as usize] && !directed.contains(&(w, u)) {
                cap_next.insert(w, u);
            }
        }
        let mut starts: Vec<u32> = cap_next.keys().copied().collect();
        starts.sort_unstable();
        let mut capped: HashSet<u32> = HashSet::new();
        for start in starts {
            if capped.contains(&start) {
                continue;
            }
            let mut ring = vec![start];
            let mut current = start;
            while let Some(&next) = cap_next.get(&current) {
                if next == start || ring.len() > cap_next.len() {
                    break;
                }
                ring.push(next);
                current = next;
            }
            capped.extend(ring.iter().copied());
            if cap_next.get(&current) != Some(&start) {
                continue;
            }
            for i in 1..ring.len().saturating_sub(1) {
                new_triangles.push([ring[0], ring[i], ring[i + 1]]);
            }
        }

        mesh.positions = new_positions.iter().map(|p| p.to_array()).collect();
        mesh.indices = new_triangles.into_iter().flatten().collect();
        SmoothNormals::default().apply(mesh);
    }
}

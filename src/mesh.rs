//! Triangle meshes and the face-list loader.
//!
//! The on-disk format is a plain-text triangulated face list: `v x y z`
//! positions, `vn x y z` normals, `vt u v` texture coordinates (stored
//! with v flipped), and `f a/ta/na b/tb/nb c/tc/nc` faces with 1-based
//! indices. Vertices that agree on position, uv, and normal are
//! deduplicated into a single vertex buffer entry; tangents are derived
//! per face and Gram-Schmidt-rejected against each vertex normal.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::rc::Rc;

use log::warn;

use crate::material::Material;
use crate::math::{Mat4, Quaternion, Vec2, Vec3};
use crate::settings::CullMode;

/// A single vertex as produced by the loader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    /// Unit tangent, orthogonal to `normal`.
    pub tangent: Vec3,
    pub uv: Vec2,
}

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    NoVertices,
    InvalidFaces,
    IndexOutOfRange,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "failed to read mesh file: {}", e),
            LoadError::NoVertices => write!(f, "mesh has no vertices"),
            LoadError::InvalidFaces => write!(f, "index count not divisible by 3"),
            LoadError::IndexOutOfRange => write!(f, "face index outside the vertex buffer"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

/// An indexed triangle mesh with a world transform and material handle.
///
/// The mesh owns its vertex and index buffers; the material lives in the
/// resource registry and is shared through an `Rc`. Every index is a
/// valid position in the vertex buffer by construction.
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    transform: Mat4,
    cull_mode: CullMode,
    material: Rc<Material>,
}

impl Mesh {
    /// Load a mesh from a face-list file.
    ///
    /// Malformed lines and out-of-range face indices are logged and
    /// skipped; the remaining faces still parse. A file with no usable
    /// vertices yields `LoadError::NoVertices`.
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        material: Rc<Material>,
        cull_mode: CullMode,
        transform: Mat4,
    ) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        let (vertices, indices) = parse_face_list(BufReader::new(file))?;
        Self::from_buffers(vertices, indices, material, cull_mode, transform)
    }

    /// Build a mesh from already-constructed buffers.
    pub fn from_buffers(
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        material: Rc<Material>,
        cull_mode: CullMode,
        transform: Mat4,
    ) -> Result<Self, LoadError> {
        if vertices.is_empty() && !indices.is_empty() {
            return Err(LoadError::NoVertices);
        }
        if indices.len() % 3 != 0 {
            return Err(LoadError::InvalidFaces);
        }
        if indices.iter().any(|&i| i as usize >= vertices.len()) {
            return Err(LoadError::IndexOutOfRange);
        }

        Ok(Self {
            vertices,
            indices,
            transform,
            cull_mode,
            material,
        })
    }

    /// Per-frame update hook: a slow spin around world Y.
    pub fn update(&mut self, delta_time: f32) {
        let spin = Quaternion::from_axis_angle(Vec3::UP, delta_time);
        self.transform = spin.to_mat4() * self.transform;
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    pub fn cull_mode(&self) -> CullMode {
        self.cull_mode
    }

    pub fn material(&self) -> &Rc<Material> {
        &self.material
    }
}

/// Exact-equality key over the fields that participate in deduplication:
/// position, uv, normal. Tangents are excluded — they are derived data.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey([u32; 8]);

impl VertexKey {
    fn new(position: Vec3, uv: Vec2, normal: Vec3) -> Self {
        Self([
            position.x.to_bits(),
            position.y.to_bits(),
            position.z.to_bits(),
            uv.x.to_bits(),
            uv.y.to_bits(),
            normal.x.to_bits(),
            normal.y.to_bits(),
            normal.z.to_bits(),
        ])
    }
}

/// Parse a face-list stream into deduplicated vertex and index buffers.
pub fn parse_face_list<R: BufRead>(reader: R) -> Result<(Vec<Vertex>, Vec<u32>), LoadError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut uvs: Vec<Vec2> = Vec::new();
    let mut faces: Vec<[[usize; 3]; 3]> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut tokens = trimmed.split_whitespace();
        match tokens.next() {
            Some("v") => match parse_floats::<3>(tokens) {
                Some([x, y, z]) => positions.push(Vec3::new(x, y, z)),
                None => warn!("line {}: malformed vertex position, skipping", line_no + 1),
            },
            Some("vn") => match parse_floats::<3>(tokens) {
                Some([x, y, z]) => normals.push(Vec3::new(x, y, z)),
                None => warn!("line {}: malformed vertex normal, skipping", line_no + 1),
            },
            Some("vt") => match parse_floats::<2>(tokens) {
                // v is flipped: texture files have a top-left origin
                Some([u, v]) => uvs.push(Vec2::new(u, 1.0 - v)),
                None => warn!("line {}: malformed texture coord, skipping", line_no + 1),
            },
            Some("f") => match parse_face(tokens) {
                Some(face) => faces.push(face),
                None => warn!("line {}: malformed face, skipping", line_no + 1),
            },
            _ => {}
        }
    }

    let mut vertex_buffer: Vec<Vertex> = Vec::with_capacity(faces.len());
    let mut index_buffer: Vec<u32> = Vec::with_capacity(faces.len() * 3);
    let mut dedup: HashMap<VertexKey, u32> = HashMap::new();

    for (face_no, face) in faces.iter().enumerate() {
        let corners: Option<Vec<(Vec3, Vec2, Vec3)>> = face
            .iter()
            .map(|&[vi, ti, ni]| {
                Some((
                    *positions.get(vi)?,
                    *uvs.get(ti)?,
                    *normals.get(ni)?,
                ))
            })
            .collect();

        let Some(corners) = corners else {
            warn!("face {}: index out of range, skipping", face_no + 1);
            continue;
        };

        let (p0, uv0, _) = corners[0];
        let (p1, uv1, _) = corners[1];
        let (p2, uv2, _) = corners[2];

        // Face tangent from position and uv deltas
        let edge0 = p1 - p0;
        let edge1 = p2 - p0;
        let du = Vec2::new(uv1.x - uv0.x, uv2.x - uv0.x);
        let dv = Vec2::new(uv1.y - uv0.y, uv2.y - uv0.y);
        let r = 1.0 / du.cross(dv);
        let face_tangent = (edge0 * dv.y - edge1 * dv.x) * r;

        for (position, uv, normal) in corners {
            let key = VertexKey::new(position, uv, normal);
            let index = match dedup.get(&key) {
                Some(&index) => index,
                None => {
                    let tangent = face_tangent.reject(normal).normalize();
                    let index = vertex_buffer.len() as u32;
                    vertex_buffer.push(Vertex {
                        position,
                        normal,
                        tangent,
                        uv,
                    });
                    dedup.insert(key, index);
                    index
                }
            };
            index_buffer.push(index);
        }
    }

    Ok((vertex_buffer, index_buffer))
}

fn parse_floats<const N: usize>(mut tokens: std::str::SplitWhitespace<'_>) -> Option<[f32; N]> {
    let mut out = [0.0f32; N];
    for value in out.iter_mut() {
        *value = tokens.next()?.parse().ok()?;
    }
    Some(out)
}

/// Parse three `v/vt/vn` corner triplets into 0-based index triples.
fn parse_face(tokens: std::str::SplitWhitespace<'_>) -> Option<[[usize; 3]; 3]> {
    let mut corners = [[0usize; 3]; 3];
    let mut count = 0;

    for token in tokens {
        if count == 3 {
            // More than three corners: not a triangulated face list
            return None;
        }
        let mut parts = token.split('/');
        for slot in corners[count].iter_mut() {
            let raw: usize = parts.next()?.parse().ok()?;
            // File indices are 1-based
            *slot = raw.checked_sub(1)?;
        }
        count += 1;
    }

    (count == 3).then_some(corners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    const QUAD: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

    fn parse(source: &str) -> (Vec<Vertex>, Vec<u32>) {
        parse_face_list(Cursor::new(source)).expect("parse")
    }

    #[test]
    fn shared_corners_are_deduplicated() {
        let (vertices, indices) = parse(QUAD);
        // Two triangles share the 0/2 corners: 4 unique vertices, 6 indices
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.len(), 6);
        assert_eq!(indices[0], indices[3]);
        assert_eq!(indices[2], indices[4]);
    }

    #[test]
    fn reloading_written_buffers_keeps_vertex_count() {
        let (vertices, indices) = parse(QUAD);

        // Write the buffers back out in the same format and reload
        let mut out = String::new();
        for v in &vertices {
            out.push_str(&format!("v {} {} {}\n", v.position.x, v.position.y, v.position.z));
            out.push_str(&format!("vn {} {} {}\n", v.normal.x, v.normal.y, v.normal.z));
            out.push_str(&format!("vt {} {}\n", v.uv.x, 1.0 - v.uv.y));
        }
        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
            out.push_str(&format!("f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}\n"));
        }

        let (reloaded, _) = parse(&out);
        assert_eq!(reloaded.len(), vertices.len());
    }

    #[test]
    fn tangents_are_unit_and_orthogonal_to_normals() {
        let (vertices, _) = parse(QUAD);
        for v in &vertices {
            assert_relative_eq!(v.tangent.dot(v.normal), 0.0, epsilon = 1e-5);
            assert_relative_eq!(v.tangent.magnitude(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn v_coordinate_is_flipped() {
        let (vertices, _) = parse(QUAD);
        // First corner was written as vt 0 0 -> stored as (0, 1)
        assert_relative_eq!(vertices[0].uv.y, 1.0);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let source = "\
v 0.0 0.0 0.0
v oops
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
vt 0.0 0.0
f 1/1/1 2/2/1
f 1/1/1 2/1/1 3/1/1
";
        let (vertices, indices) = parse(source);
        // The bad vertex and the two-corner face drop out; the last face parses
        assert_eq!(vertices.len(), 3);
        assert_eq!(indices.len(), 3);
    }

    #[test]
    fn out_of_range_face_indices_are_skipped() {
        let source = "\
v 0.0 0.0 0.0
vn 0.0 0.0 1.0
vt 0.0 0.0
f 1/1/1 2/1/1 3/1/1
";
        let (vertices, indices) = parse(source);
        assert!(indices.is_empty());
        assert!(vertices.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_mesh() {
        let (vertices, indices) = parse("");
        assert!(vertices.is_empty());
        assert!(indices.is_empty());

        let mesh = Mesh::from_buffers(
            vertices,
            indices,
            Rc::new(Material::transparent_diffuse(None)),
            CullMode::Backface,
            Mat4::identity(),
        )
        .expect("empty mesh is valid");
        assert!(mesh.indices().is_empty());
    }

    #[test]
    fn index_count_must_be_triangles() {
        let err = Mesh::from_buffers(
            vec![],
            vec![0, 1],
            Rc::new(Material::transparent_diffuse(None)),
            CullMode::Backface,
            Mat4::identity(),
        );
        assert!(matches!(err, Err(LoadError::NoVertices) | Err(LoadError::InvalidFaces)));
    }

    #[test]
    fn update_spins_the_transform() {
        let material = Rc::new(Material::transparent_diffuse(None));
        let mut mesh =
            Mesh::from_buffers(vec![], vec![], material, CullMode::Backface, Mat4::identity())
                .expect("mesh");
        mesh.update(std::f32::consts::FRAC_PI_2);
        // A quarter turn about Y maps +X to -Z
        let x = *mesh.transform() * crate::math::Vec4::direction(1.0, 0.0, 0.0);
        assert_relative_eq!(x.z, -1.0, epsilon = 1e-5);
        assert_relative_eq!(x.x, 0.0, epsilon = 1e-5);
    }
}

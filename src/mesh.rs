use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest vertex count addressable by the 16-bit index buffer.
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

/// Errors raised while building a [`Mesh`].
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("mesh text does not define any vertices")]
    Empty,
    #[error("mesh has {0} vertices but 16-bit indices address at most 65536")]
    TooManyVertices(usize),
    #[error("index {index} is out of range for {vertex_count} vertices")]
    InvalidIndex { index: u16, vertex_count: usize },
    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),
    #[error("unable to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MeshError {
    fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }
}

/// Homogeneous position followed by homogeneous color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

impl Vertex {
    pub const STRIDE: u64 = std::mem::size_of::<Self>() as u64;
    pub const POSITION_OFFSET: u64 = 0;
    pub const COLOR_OFFSET: u64 = 4 * std::mem::size_of::<f32>() as u64;

    /// Vertex whose color mirrors its position.
    pub fn colored_by_position(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z, 1.0],
            color: [x, y, z, 1.0],
        }
    }
}

/// Triangle-list geometry ready for upload.
///
/// Every index addresses a vertex and the index count is a multiple of 3.
/// Deserialized meshes are validated through [`Mesh::from_parts`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawMesh")]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
}

#[derive(Deserialize)]
struct RawMesh {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
}

impl TryFrom<RawMesh> for Mesh {
    type Error = MeshError;

    fn try_from(raw: RawMesh) -> Result<Self, Self::Error> {
        Self::from_parts(raw.vertices, raw.indices)
    }
}

impl Mesh {
    /// Builds a mesh after checking the triangle-list invariants.
    pub fn from_parts(vertices: Vec<Vertex>, indices: Vec<u16>) -> Result<Self, MeshError> {
        if vertices.len() > MAX_VERTICES {
            return Err(MeshError::TooManyVertices(vertices.len()));
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| usize::from(i) >= vertices.len()) {
            return Err(MeshError::InvalidIndex {
                index,
                vertex_count: vertices.len(),
            });
        }
        Ok(Self { vertices, indices })
    }

    /// Unit cube spanning `[0, 1]` on every axis, colored by corner position.
    pub fn cube() -> Self {
        let vertices = (0..8u8)
            .map(|corner| {
                let x = f32::from((corner >> 2) & 1);
                let y = f32::from((corner >> 1) & 1);
                let z = f32::from(corner & 1);
                Vertex::colored_by_position(x, y, z)
            })
            .collect();
        Self {
            vertices,
            indices: CUBE_INDICES.to_vec(),
        }
    }

    /// Parses `v x y z` and `f a b c d` lines into a quad-triangulated mesh.
    pub fn parse(text: &str) -> Result<Self, MeshError> {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let line_no = line_no + 1;
            if let Some(rest) = line.strip_prefix("v ") {
                let vertex =
                    parse_vertex(rest).map_err(|reason| MeshError::parse(line_no, reason))?;
                vertices.push(vertex);
            } else if let Some(rest) = line.strip_prefix("f ") {
                let quad = parse_quad(rest).map_err(|reason| MeshError::parse(line_no, reason))?;
                faces.push((line_no, quad));
            }
        }

        if vertices.is_empty() {
            return Err(MeshError::Empty);
        }
        if vertices.len() > MAX_VERTICES {
            return Err(MeshError::TooManyVertices(vertices.len()));
        }

        let mut indices = Vec::with_capacity(faces.len() * 6);
        for (line_no, quad) in faces {
            let mut resolved = [0u16; 4];
            for (slot, &index) in resolved.iter_mut().zip(quad.iter()) {
                if index > vertices.len() {
                    return Err(MeshError::parse(
                        line_no,
                        format!(
                            "face index {index} is out of range ({} vertices defined)",
                            vertices.len()
                        ),
                    ));
                }
                // in range of MAX_VERTICES, so the 0-based value fits
                *slot = (index - 1) as u16;
            }
            let [a, b, c, d] = resolved;
            indices.extend_from_slice(&[a, b, c, a, c, d]);
        }

        Ok(Self { vertices, indices })
    }

    /// Reads and parses a mesh file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| MeshError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u16; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

impl FromStr for Mesh {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_vertex(fields: &str) -> Result<Vertex, String> {
    let mut parts = fields.split_whitespace();
    let mut component = |axis: &str| -> Result<f32, String> {
        let raw = parts
            .next()
            .ok_or_else(|| format!("vertex is missing its {axis} component"))?;
        let value = raw
            .parse::<f32>()
            .map_err(|err| format!("invalid {axis} component {raw:?}: {err}"))?;
        if !value.is_finite() {
            return Err(format!("non-finite {axis} component {raw:?}"));
        }
        Ok(value)
    };
    let x = component("x")?;
    let y = component("y")?;
    let z = component("z")?;
    Ok(Vertex::colored_by_position(x, y, z))
}

/// Returns the four 1-based vertex indices of a quad face.
fn parse_quad(fields: &str) -> Result<[usize; 4], String> {
    let parts: Vec<&str> = fields.split_whitespace().collect();
    if parts.len() != 4 {
        return Err(format!(
            "faces must list exactly 4 vertex indices, found {}",
            parts.len()
        ));
    }
    let mut quad = [0usize; 4];
    for (slot, part) in quad.iter_mut().zip(parts) {
        let raw = part.split('/').next().unwrap_or_default();
        let index = raw
            .parse::<usize>()
            .map_err(|_| format!("invalid vertex index {raw:?}"))?;
        if index == 0 {
            return Err("vertex indices are 1-based, found 0".to_string());
        }
        *slot = index;
    }
    Ok(quad)
}

const CUBE_INDICES: [u16; 36] = [
    0, 2, 6, 0, 6, 4, // -Z
    4, 6, 7, 4, 7, 5, // +X
    5, 7, 3, 5, 3, 1, // +Z
    1, 3, 2, 1, 2, 0, // -X
    6, 2, 3, 6, 3, 7, // +Y
    0, 4, 5, 0, 5, 1, // -Y
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    const QUAD: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";

    #[test]
    fn cube_has_eight_vertices_and_twelve_triangles() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube.indices().iter().all(|&i| i <= 7));
        for vertex in cube.vertices() {
            assert_eq!(vertex.position, vertex.color);
            assert_eq!(vertex.position[3], 1.0);
        }
    }

    #[test]
    fn cube_is_closed_and_consistently_wound() {
        let cube = Mesh::cube();
        let mut directed = HashSet::new();
        let mut undirected: HashMap<(u16, u16), usize> = HashMap::new();
        for [a, b, c] in cube.triangles() {
            for (from, to) in [(a, b), (b, c), (c, a)] {
                assert!(directed.insert((from, to)), "edge {from}->{to} repeated");
                *undirected.entry((from.min(to), from.max(to))).or_default() += 1;
            }
        }
        assert_eq!(undirected.len(), 18);
        assert!(undirected.values().all(|&count| count == 2));
        assert!(directed.iter().all(|&(a, b)| directed.contains(&(b, a))));
    }

    #[test]
    fn parses_quad_into_two_triangles() {
        let mesh = Mesh::parse(QUAD).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.vertices()[2].color, [1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn ignores_attributes_after_slash_and_unknown_lines() {
        let text = "# quad\nvn 0 0 1\nvt 0 0\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\ns off\nf 1/1/1 2/2/1 3//1 4/4\n";
        let mesh: Mesh = text.parse().unwrap();
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn faces_may_precede_vertices() {
        let text = "f 4 3 2 1\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n";
        let mesh = Mesh::parse(text).unwrap();
        assert_eq!(mesh.indices(), &[3, 2, 1, 3, 1, 0]);
    }

    #[test]
    fn triangle_face_is_rejected() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n";
        match Mesh::parse(text) {
            Err(MeshError::Parse { line, reason }) => {
                assert_eq!(line, 4);
                assert!(reason.contains("exactly 4"), "{reason}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 5\n";
        let err = Mesh::parse(text).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 5, .. }));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn zero_and_negative_indices_are_rejected() {
        let zero = "v 0 0 0\nf 0 1 1 1\n";
        assert!(matches!(
            Mesh::parse(zero),
            Err(MeshError::Parse { line: 2, .. })
        ));
        let negative = "v 0 0 0\nf -1 1 1 1\n";
        assert!(matches!(
            Mesh::parse(negative),
            Err(MeshError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn five_index_face_is_rejected() {
        let text = "v 0 0 0\nf 1 1 1 1 1\n";
        let err = Mesh::parse(text).unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 2: faces must list exactly 4 vertex indices, found 5"
        );
    }

    #[test]
    fn vertex_limit_matches_index_width() {
        let over = "v 0 0 0\n".repeat(MAX_VERTICES + 1);
        assert!(matches!(
            Mesh::parse(&over),
            Err(MeshError::TooManyVertices(65537))
        ));

        let mut full = "v 0 0 0\n".repeat(MAX_VERTICES);
        full.push_str("f 1 2 3 65536\n");
        let mesh = Mesh::parse(&full).unwrap();
        assert_eq!(mesh.vertex_count(), 65536);
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, u16::MAX]);
    }

    #[test]
    fn non_finite_vertex_is_rejected() {
        for text in ["v nan 0 0\n", "v 0 inf 0\n"] {
            let err = Mesh::parse(text).unwrap_err();
            assert!(matches!(err, MeshError::Parse { .. }), "{text:?}");
            assert!(err.to_string().contains("non-finite"), "{err}");
        }
        let err = Mesh::parse("v 0 0 0\nv 0 0 -infinity\n").unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 2, .. }));
    }

    #[test]
    fn deserialize_validates_indices() {
        let vertex = r#"{"position":[0.0,0.0,0.0,1.0],"color":[0.0,0.0,0.0,1.0]}"#;
        let out_of_range = format!(r#"{{"vertices":[{vertex}],"indices":[0,7,0]}}"#);
        let err = serde_json::from_str::<Mesh>(&out_of_range).unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");

        let partial = format!(r#"{{"vertices":[{vertex}],"indices":[0,0]}}"#);
        assert!(serde_json::from_str::<Mesh>(&partial).is_err());

        let cube = Mesh::cube();
        let json = serde_json::to_string(&cube).unwrap();
        assert_eq!(serde_json::from_str::<Mesh>(&json).unwrap(), cube);
    }

    #[test]
    fn short_vertex_is_rejected() {
        let err = Mesh::parse("v 0 0 0\nv 1 2\n").unwrap_err();
        assert_eq!(err.to_string(), "line 2: vertex is missing its z component");
    }

    #[test]
    fn non_numeric_vertex_is_rejected() {
        let err = Mesh::parse("v 0 zero 0\n").unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 1, .. }));
    }

    #[test]
    fn text_without_vertices_is_empty() {
        assert!(matches!(Mesh::parse("# nothing\n"), Err(MeshError::Empty)));
    }

    #[test]
    fn from_parts_checks_invariants() {
        let vertices = Mesh::cube().vertices().to_vec();
        assert!(Mesh::from_parts(vertices.clone(), vec![0, 1, 2]).is_ok());
        assert!(matches!(
            Mesh::from_parts(vertices.clone(), vec![0, 1]),
            Err(MeshError::IncompleteTriangle(2))
        ));
        assert!(matches!(
            Mesh::from_parts(vertices, vec![0, 1, 8]),
            Err(MeshError::InvalidIndex { index: 8, .. })
        ));
    }

    #[test]
    fn byte_views_match_backend_layout() {
        assert_eq!(Vertex::STRIDE, 32);
        assert_eq!(Vertex::COLOR_OFFSET, 16);
        let mesh = Mesh::parse(QUAD).unwrap();
        assert_eq!(mesh.vertex_bytes().len(), 4 * 32);
        assert_eq!(mesh.index_bytes().len(), 12);
        let single = Mesh::from_parts(mesh.vertices().to_vec(), vec![0, 1, 2]).unwrap();
        assert_eq!(single.index_bytes(), &[0, 0, 1, 0, 2, 0]);
    }

    #[test]
    fn load_reports_missing_files() {
        let err = Mesh::load("/definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, MeshError::Io { .. }));
    }
}

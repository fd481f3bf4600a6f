//! Wavefront OBJ parsing into a tree of mesh nodes.
//!
//! Handles `v`, `vn`, `vt`, `f`, `o`, `g`, `usemtl`, `mtllib` and `s`.
//! Each object, group or material switch starts a new node, faces are
//! fan-triangulated and negative (relative) indices are resolved.

use std::collections::HashMap;

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use thiserror::Error;

use super::bounds::ModelBounds;

#[derive(Debug, Error, PartialEq)]
pub enum ObjError {
    #[error("line {line}: expected {expected} values after '{keyword}'")]
    MissingValues {
        line: usize,
        keyword: &'static str,
        expected: usize,
    },
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },
    #[error("line {line}: vertex index {index} is out of range")]
    IndexOutOfRange { line: usize, index: i64 },
    #[error("line {line}: face needs at least 3 vertices")]
    DegenerateFace { line: usize },
    #[error("model contains no faces")]
    Empty,
}

/// One renderable piece of a model: an `o`/`g` block or a material run.
#[derive(Debug, Clone, Default)]
pub struct ObjNode {
    pub name: String,
    /// Material named by `usemtl`. Recorded but never applied.
    pub material: Option<String>,
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub indices: Vec<u32>,
}

impl ObjNode {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Option<ModelBounds> {
        ModelBounds::from_points(self.positions.iter())
    }

    /// Build a triangle-list mesh. Nodes without complete normals get flat ones.
    pub fn to_mesh(&self) -> Mesh {
        let mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, self.positions.clone())
        .with_inserted_indices(Indices::U32(self.indices.clone()));

        match &self.normals {
            Some(normals) => mesh.with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals.clone()),
            None => mesh.with_duplicated_vertices().with_computed_flat_normals(),
        }
    }
}

/// Parsed model: the node tree plus the material libraries it referenced.
#[derive(Debug, Clone, Default)]
pub struct ObjModel {
    pub nodes: Vec<ObjNode>,
    pub material_libraries: Vec<String>,
}

impl ObjModel {
    pub fn vertex_count(&self) -> usize {
        self.nodes.iter().map(|node| node.positions.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.nodes.iter().map(ObjNode::triangle_count).sum()
    }

    /// Bounds of the untransformed geometry across all nodes.
    pub fn bounds(&self) -> Option<ModelBounds> {
        self.nodes
            .iter()
            .filter_map(ObjNode::bounds)
            .reduce(|acc, b| acc.union(&b))
    }
}

/// Node under construction. Vertices are de-duplicated per node on
/// (position, normal) index pairs.
struct NodeBuilder {
    node: ObjNode,
    normals: Vec<[f32; 3]>,
    missing_normal: bool,
    vertex_cache: HashMap<(usize, Option<usize>), u32>,
}

impl NodeBuilder {
    fn new(name: String, material: Option<String>) -> Self {
        Self {
            node: ObjNode {
                name,
                material,
                ..default()
            },
            normals: Vec::new(),
            missing_normal: false,
            vertex_cache: HashMap::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.node.indices.is_empty()
    }

    fn vertex(
        &mut self,
        position: usize,
        normal: Option<usize>,
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
    ) -> u32 {
        if let Some(&index) = self.vertex_cache.get(&(position, normal)) {
            return index;
        }

        let index = self.node.positions.len() as u32;
        self.node.positions.push(positions[position]);
        match normal {
            Some(n) => self.normals.push(normals[n]),
            None => {
                self.missing_normal = true;
                self.normals.push([0.0, 0.0, 0.0]);
            }
        }
        self.vertex_cache.insert((position, normal), index);
        index
    }

    fn finish(mut self) -> ObjNode {
        if !self.missing_normal {
            self.node.normals = Some(self.normals);
        }
        self.node
    }
}

/// Parse OBJ text into a model. Statements other than geometry, grouping and
/// material references are ignored.
pub fn parse_obj(source: &str) -> Result<ObjModel, ObjError> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut material_libraries = Vec::new();

    let mut nodes = Vec::new();
    let mut current = NodeBuilder::new(String::new(), None);

    for (line_index, raw) in source.lines().enumerate() {
        let line_number = line_index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        let rest: Vec<&str> = tokens.collect();

        match keyword {
            "v" => positions.push(parse_vec3(&rest, line_number, "v")?),
            "vn" => normals.push(parse_vec3(&rest, line_number, "vn")?),
            "vt" => {
                if rest.len() < 2 {
                    return Err(ObjError::MissingValues {
                        line: line_number,
                        keyword: "vt",
                        expected: 2,
                    });
                }
            }
            "o" | "g" => {
                let name = rest.join(" ");
                let material = current.node.material.clone();
                let previous = std::mem::replace(&mut current, NodeBuilder::new(name, material));
                if !previous.is_empty() {
                    nodes.push(previous.finish());
                }
            }
            "usemtl" => {
                let material = rest.first().map(|m| m.to_string());
                if current.is_empty() {
                    current.node.material = material;
                } else {
                    let name = current.node.name.clone();
                    let previous =
                        std::mem::replace(&mut current, NodeBuilder::new(name, material));
                    nodes.push(previous.finish());
                }
            }
            "mtllib" => material_libraries.extend(rest.iter().map(|lib| lib.to_string())),
            "f" => {
                if rest.len() < 3 {
                    return Err(ObjError::DegenerateFace { line: line_number });
                }

                let mut face = Vec::with_capacity(rest.len());
                for token in &rest {
                    let (position, normal) =
                        parse_face_vertex(token, line_number, positions.len(), normals.len())?;
                    face.push(current.vertex(position, normal, &positions, &normals));
                }

                // Fan triangulation keeps the source winding.
                for i in 1..face.len() - 1 {
                    current
                        .node
                        .indices
                        .extend_from_slice(&[face[0], face[i], face[i + 1]]);
                }
            }
            _ => {}
        }
    }

    if !current.is_empty() {
        nodes.push(current.finish());
    }

    if nodes.is_empty() {
        return Err(ObjError::Empty);
    }

    Ok(ObjModel {
        nodes,
        material_libraries,
    })
}

fn parse_vec3(values: &[&str], line: usize, keyword: &'static str) -> Result<[f32; 3], ObjError> {
    if values.len() < 3 {
        return Err(ObjError::MissingValues {
            line,
            keyword,
            expected: 3,
        });
    }

    let mut out = [0.0; 3];
    for (slot, token) in out.iter_mut().zip(values) {
        *slot = token.parse().map_err(|_| ObjError::InvalidNumber {
            line,
            token: token.to_string(),
        })?;
    }
    Ok(out)
}

/// Parse `p`, `p/t`, `p//n` or `p/t/n` into zero-based position and normal indices.
fn parse_face_vertex(
    token: &str,
    line: usize,
    position_count: usize,
    normal_count: usize,
) -> Result<(usize, Option<usize>), ObjError> {
    let mut parts = token.split('/');

    let position = match parts.next() {
        Some(p) if !p.is_empty() => resolve_index(p, line, position_count)?,
        _ => {
            return Err(ObjError::InvalidNumber {
                line,
                token: token.to_string(),
            });
        }
    };

    // Texture coordinates are not used by the flat material.
    let _ = parts.next();

    let normal = match parts.next() {
        Some(n) if !n.is_empty() => Some(resolve_index(n, line, normal_count)?),
        _ => None,
    };

    Ok((position, normal))
}

fn resolve_index(token: &str, line: usize, count: usize) -> Result<usize, ObjError> {
    let index: i64 = token.parse().map_err(|_| ObjError::InvalidNumber {
        line,
        token: token.to_string(),
    })?;

    let resolved = if index > 0 {
        index - 1
    } else {
        count as i64 + index
    };

    if index == 0 || resolved < 0 || resolved >= count as i64 {
        return Err(ObjError::IndexOutOfRange { line, index });
    }
    Ok(resolved as usize)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Unit cube with one corner on the origin, quads only.
    pub(crate) const UNIT_CUBE: &str = "\
# unit cube
mtllib cube.mtl
o Cube
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
usemtl Shiny
f 1 2 3 4
f 5 8 7 6
f 1 5 6 2
f 2 6 7 3
f 3 7 8 4
f 5 1 4 8
";

    #[test]
    fn parses_unit_cube() {
        let model = parse_obj(UNIT_CUBE).unwrap();

        assert_eq!(model.nodes.len(), 1);
        assert_eq!(model.nodes[0].name, "Cube");
        assert_eq!(model.nodes[0].material.as_deref(), Some("Shiny"));
        assert_eq!(model.material_libraries, vec!["cube.mtl".to_string()]);
        assert_eq!(model.vertex_count(), 8);
        assert_eq!(model.triangle_count(), 12);

        let bounds = model.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::ONE);
    }

    #[test]
    fn groups_and_material_switches_start_new_nodes() {
        let source = "\
v 0 0 0
v 1 0 0
v 0 1 0
g left
f 1 2 3
g right
usemtl A
f 1 2 3
usemtl B
f -3 -2 -1
";
        let model = parse_obj(source).unwrap();
        let names: Vec<_> = model.nodes.iter().map(|n| n.name.as_str()).collect();
        let materials: Vec<_> = model.nodes.iter().map(|n| n.material.as_deref()).collect();

        assert_eq!(names, vec!["left", "right", "right"]);
        assert_eq!(materials, vec![None, Some("A"), Some("B")]);
    }

    #[test]
    fn keeps_normals_only_when_every_vertex_has_one() {
        let with_normals = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let without = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2 3/1\n";

        assert!(parse_obj(with_normals).unwrap().nodes[0].normals.is_some());
        assert!(parse_obj(without).unwrap().nodes[0].normals.is_none());
    }

    #[test]
    fn rejects_out_of_range_index() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert_eq!(err, ObjError::IndexOutOfRange { line: 3, index: 3 });
    }

    #[test]
    fn rejects_bad_numbers_and_empty_models() {
        assert!(matches!(
            parse_obj("v 0 zero 0\n"),
            Err(ObjError::InvalidNumber { line: 1, .. })
        ));
        assert_eq!(parse_obj("# nothing\nv 0 0 0\n").unwrap_err(), ObjError::Empty);
        assert!(matches!(
            parse_obj("<html>not found</html>"),
            Err(ObjError::Empty)
        ));
    }
}

use std::{fs, path::Path};

use anyhow::Context;
use glam::Vec3;
use log::{debug, info};
use thiserror::Error;

use crate::particles::PointCloud;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to import glTF: {0}")]
    Import(#[from] gltf::Error),
    #[error("glTF document has no scene")]
    NoScene,
    #[error("glTF scene has no mesh nodes")]
    NoMeshes,
    #[error("mesh {mesh:?} has no POSITION attribute")]
    MissingPositions { mesh: String },
}

/// One morph target: the positions of a top-level mesh node.
#[derive(Debug, Clone)]
pub struct Shape {
    pub name: String,
    pub cloud: PointCloud,
}

pub fn load_shapes(path: impl AsRef<Path>) -> anyhow::Result<Vec<Shape>> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let shapes = load_shapes_from_slice(&bytes)
        .with_context(|| format!("Failed to load shapes from {}", path.display()))?;
    info!("Loaded {} shapes from {}", shapes.len(), path.display());
    Ok(shapes)
}

/// Buffers must be embedded: GLB or data URIs.
pub fn load_shapes_from_slice(bytes: &[u8]) -> Result<Vec<Shape>, AssetError> {
    let (document, buffers, _images) = gltf::import_slice(bytes)?;
    shapes_from_document(&document, &buffers)
}

/// Collects one shape per mesh node directly under the default scene, in
/// document order. Primitives of a mesh are concatenated; node transforms are
/// not applied.
fn shapes_from_document(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<Vec<Shape>, AssetError> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(AssetError::NoScene)?;

    let mut shapes = Vec::new();
    for node in scene.nodes() {
        let mesh = match node.mesh() {
            Some(mesh) => mesh,
            None => {
                debug!("Skipping node {:?} without mesh", node.name());
                continue;
            }
        };
        let name = node
            .name()
            .or_else(|| mesh.name())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("mesh {}", mesh.index()));

        let mut positions = Vec::new();
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
            let primitive_positions = reader
                .read_positions()
                .ok_or_else(|| AssetError::MissingPositions { mesh: name.clone() })?;
            positions.extend(primitive_positions.map(Vec3::from));
        }

        debug!("Shape {:?} has {} points", name, positions.len());
        shapes.push(Shape {
            name,
            cloud: PointCloud::new(positions),
        });
    }

    if shapes.is_empty() {
        return Err(AssetError::NoMeshes);
    }
    Ok(shapes)
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    // Seven points: a triangle followed by a four point quad.
    const BUFFER_URI: &str = "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAACAvwAAgL8AAIC/AACAPwAAgL8AAIC/AACAPwAAgD8AAIA/AACAvwAAgD8AAIA/";

    fn document(nodes: &str, scene_nodes: &str) -> String {
        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "buffers": [{{ "byteLength": 84, "uri": "{uri}" }}],
  "bufferViews": [{{ "buffer": 0, "byteOffset": 0, "byteLength": 84 }}],
  "accessors": [
    {{ "bufferView": 0, "byteOffset": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0, 0, 0], "max": [1, 1, 0] }},
    {{ "bufferView": 0, "byteOffset": 36, "componentType": 5126, "count": 4, "type": "VEC3",
       "min": [-1, -1, -1], "max": [1, 1, 1] }}
  ],
  "meshes": [
    {{ "name": "Triangle", "primitives": [{{ "attributes": {{ "POSITION": 0 }} }}] }},
    {{ "name": "Quad", "primitives": [{{ "attributes": {{ "POSITION": 1 }} }}] }},
    {{ "primitives": [
        {{ "attributes": {{ "POSITION": 0 }} }},
        {{ "attributes": {{ "POSITION": 1 }} }}
    ] }}
  ],
  "nodes": {nodes},
  "scenes": [{{ "nodes": {scene_nodes} }}],
  "scene": 0
}}"#,
            uri = BUFFER_URI,
            nodes = nodes,
            scene_nodes = scene_nodes,
        )
    }

    #[test]
    fn loads_one_shape_per_mesh_node() {
        let gltf = document(
            r#"[{ "name": "Tri", "mesh": 0 }, { "name": "Empty" }, { "mesh": 1 }, { "mesh": 2 }]"#,
            "[0, 1, 2, 3]",
        );
        let shapes = load_shapes_from_slice(gltf.as_bytes()).unwrap();

        let names: Vec<_> = shapes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Tri", "Quad", "mesh 2"]);

        assert_eq!(
            shapes[0].cloud.positions(),
            [vec3(0., 0., 0.), vec3(1., 0., 0.), vec3(0., 1., 0.)]
        );
        assert_eq!(shapes[1].cloud.len(), 4);
        assert_eq!(shapes[1].cloud.positions()[3], vec3(-1., 1., 1.));
        assert_eq!(shapes[2].cloud.len(), 7);
    }

    #[test]
    fn only_top_level_nodes_are_shapes() {
        let gltf = document(
            r#"[{ "name": "Parent", "mesh": 0, "children": [1] }, { "name": "Child", "mesh": 1 }]"#,
            "[0]",
        );
        let shapes = load_shapes_from_slice(gltf.as_bytes()).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].name, "Parent");
    }

    #[test]
    fn scene_without_meshes_is_an_error() {
        let gltf = document(r#"[{ "name": "Empty" }]"#, "[0]");
        assert!(matches!(
            load_shapes_from_slice(gltf.as_bytes()),
            Err(AssetError::NoMeshes)
        ));
    }

    #[test]
    fn garbage_is_an_import_error() {
        assert!(matches!(
            load_shapes_from_slice(b"not a model"),
            Err(AssetError::Import(_))
        ));
    }

    #[test]
    fn loads_shapes_from_a_file() {
        let path = std::env::temp_dir().join(format!("shapes-{}.gltf", std::process::id()));
        let gltf = document(r#"[{ "name": "Tri", "mesh": 0 }]"#, "[0]");
        fs::write(&path, gltf).unwrap();

        let shapes = load_shapes(&path);
        fs::remove_file(&path).unwrap();
        let shapes = shapes.unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].cloud.len(), 3);
    }

    #[test]
    fn garbage_file_reports_the_path() {
        let path = std::env::temp_dir().join(format!("garbage-{}.glb", std::process::id()));
        fs::write(&path, b"not a model").unwrap();

        let err = load_shapes(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(format!("{:#}", err).contains(&path.display().to_string()));
        assert!(matches!(
            err.downcast_ref::<AssetError>(),
            Some(AssetError::Import(_))
        ));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = load_shapes("does/not/exist.glb").unwrap_err();
        assert!(format!("{:#}", err).contains("does/not/exist.glb"));
    }
}

//! Programmatic GLB scene fixtures.
//!
//! Builds minimal binary glTF files in memory so the import pipeline can be
//! exercised without shipping asset binaries or touching a GPU.

use std::path::PathBuf;

use serde_json::{Value, json};

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

const COMPONENT_F32: u32 = 5126;
const COMPONENT_U32: u32 = 5125;
pub const MODE_TRIANGLES: u32 = 4;
pub const MODE_LINES: u32 = 1;

/// Incrementally assembles a GLB with one shared binary buffer.
#[derive(Default)]
pub struct GlbBuilder {
    bin: Vec<u8>,
    buffer_views: Vec<Value>,
    accessors: Vec<Value>,
    meshes: Vec<Value>,
    nodes: Vec<Value>,
    scene_nodes: Vec<usize>,
    materials: Vec<Value>,
    textures: Vec<Value>,
    images: Vec<Value>,
}

pub struct MeshSpec<'a> {
    pub name: &'a str,
    pub positions: &'a [[f32; 3]],
    pub indices: &'a [u32],
    pub tex_coords: Option<&'a [[f32; 2]]>,
    pub material: Option<usize>,
    pub mode: u32,
}

impl<'a> MeshSpec<'a> {
    pub fn triangles(name: &'a str, positions: &'a [[f32; 3]], indices: &'a [u32]) -> Self {
        Self {
            name,
            positions,
            indices,
            tex_coords: None,
            material: None,
            mode: MODE_TRIANGLES,
        }
    }
}

impl GlbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_view(&mut self, bytes: &[u8]) -> usize {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        self.buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len(),
        }));
        self.buffer_views.len() - 1
    }

    /// Add a mesh with one primitive; returns the mesh index.
    pub fn add_mesh(&mut self, spec: &MeshSpec<'_>) -> usize {
        let position_bytes: Vec<u8> = spec
            .positions
            .iter()
            .flat_map(|p| p.iter().flat_map(|c| c.to_le_bytes()))
            .collect();
        let position_view = self.push_view(&position_bytes);
        let (min, max) = bounds(spec.positions);
        self.accessors.push(json!({
            "bufferView": position_view,
            "componentType": COMPONENT_F32,
            "count": spec.positions.len(),
            "type": "VEC3",
            "min": min,
            "max": max,
        }));
        let position_accessor = self.accessors.len() - 1;

        let mut attributes = json!({ "POSITION": position_accessor });
        if let Some(tex_coords) = spec.tex_coords {
            let uv_bytes: Vec<u8> = tex_coords
                .iter()
                .flat_map(|uv| uv.iter().flat_map(|c| c.to_le_bytes()))
                .collect();
            let uv_view = self.push_view(&uv_bytes);
            self.accessors.push(json!({
                "bufferView": uv_view,
                "componentType": COMPONENT_F32,
                "count": tex_coords.len(),
                "type": "VEC2",
            }));
            attributes["TEXCOORD_0"] = json!(self.accessors.len() - 1);
        }

        let index_bytes: Vec<u8> = spec
            .indices
            .iter()
            .flat_map(|i| i.to_le_bytes())
            .collect();
        let index_view = self.push_view(&index_bytes);
        self.accessors.push(json!({
            "bufferView": index_view,
            "componentType": COMPONENT_U32,
            "count": spec.indices.len(),
            "type": "SCALAR",
        }));
        let index_accessor = self.accessors.len() - 1;

        let mut primitive = json!({
            "attributes": attributes,
            "indices": index_accessor,
            "mode": spec.mode,
        });
        if let Some(material) = spec.material {
            primitive["material"] = json!(material);
        }
        self.meshes.push(json!({
            "name": spec.name,
            "primitives": [primitive],
        }));
        self.meshes.len() - 1
    }

    /// Add a material referencing image files by URI. Slots: base colour,
    /// normal map and occlusion map.
    pub fn add_material(
        &mut self,
        base_color: Option<&str>,
        normal: Option<&str>,
        occlusion: Option<&str>,
    ) -> usize {
        let mut texture_index = |uri: &str| -> usize {
            self.images.push(json!({ "uri": uri }));
            self.textures.push(json!({ "source": self.images.len() - 1 }));
            self.textures.len() - 1
        };
        let mut material = json!({ "pbrMetallicRoughness": {} });
        if let Some(uri) = base_color {
            material["pbrMetallicRoughness"]["baseColorTexture"] =
                json!({ "index": texture_index(uri) });
        }
        if let Some(uri) = normal {
            material["normalTexture"] = json!({ "index": texture_index(uri) });
        }
        if let Some(uri) = occlusion {
            material["occlusionTexture"] = json!({ "index": texture_index(uri) });
        }
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Put a mesh in its own root-level scene node.
    pub fn add_root_node(&mut self, mesh: usize) {
        self.nodes.push(json!({ "mesh": mesh }));
        self.scene_nodes.push(self.nodes.len() - 1);
    }

    /// Put each mesh in a leaf node under one shared root node.
    pub fn add_tree(&mut self, meshes: &[usize]) {
        let mut children = Vec::new();
        for &mesh in meshes {
            self.nodes.push(json!({ "mesh": mesh }));
            children.push(self.nodes.len() - 1);
        }
        self.nodes.push(json!({ "children": children }));
        self.scene_nodes.push(self.nodes.len() - 1);
    }

    pub fn build(&self) -> Vec<u8> {
        let mut document = json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": self.bin.len() }],
            "bufferViews": &self.buffer_views,
            "accessors": &self.accessors,
            "meshes": &self.meshes,
            "nodes": &self.nodes,
            "scenes": [{ "nodes": &self.scene_nodes }],
            "scene": 0,
        });
        if !self.materials.is_empty() {
            document["materials"] = json!(&self.materials);
            document["textures"] = json!(&self.textures);
            document["images"] = json!(&self.images);
        }

        let mut json_bytes = serde_json::to_vec(&document).unwrap();
        while json_bytes.len() % 4 != 0 {
            json_bytes.push(b' ');
        }
        let mut bin_bytes = self.bin.clone();
        while bin_bytes.len() % 4 != 0 {
            bin_bytes.push(0);
        }

        let total = 12 + 8 + json_bytes.len() + 8 + bin_bytes.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
        glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
        glb.extend_from_slice(&json_bytes);
        glb.extend_from_slice(&(bin_bytes.len() as u32).to_le_bytes());
        glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        glb.extend_from_slice(&bin_bytes);
        glb
    }

    /// Write the GLB into a unique temp directory and return (dir, file).
    pub fn write_temp(&self, test_name: &str) -> (PathBuf, String) {
        let dir = std::env::temp_dir().join(format!(
            "toy-ngin-test-{}-{}",
            std::process::id(),
            test_name
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let file_name = format!("{test_name}.glb");
        std::fs::write(dir.join(&file_name), self.build()).unwrap();
        (dir, file_name)
    }
}

fn bounds(positions: &[[f32; 3]]) -> (Vec<f32>, Vec<f32>) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for p in positions {
        for i in 0..3 {
            min[i] = min[i].min(p[i]);
            max[i] = max[i].max(p[i]);
        }
    }
    (min.to_vec(), max.to_vec())
}

/// Two triangles sharing an edge: four unique vertices, six indices.
pub fn shared_edge_quad() -> (Vec<[f32; 3]>, Vec<u32>) {
    (
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
}

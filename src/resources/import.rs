//! Scene import: gltf parsing and concurrent mesh extraction.
//!
//! Extraction is the only concurrent phase in the engine. Every mesh
//! primitive of a node, and every child node, is processed as its own task
//! on a scoped thread pool; the scope is the single completion barrier all
//! recursive spawns attach to, so `extract_meshes` cannot return before the
//! last transitive task finished. Tasks only read the parsed scene and
//! write their result into a pre-reserved arena slot (index handed out by
//! an atomic counter), which keeps the hot path free of locks. No GPU work
//! happens here; buffer and texture uploads follow on the render thread.

use std::{
    path::{Path, PathBuf},
    sync::{
        OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};

use crate::{
    data_structures::{
        model::Mesh,
        texture::{TextureRef, TextureRole},
        vertex::ModelVertex,
    },
    error::{Error, Result},
};

/// Parse a scene file, resolve its buffers and extract all meshes.
///
/// Fails with [`Error::Import`] when the file is unreadable or the scene is
/// incomplete (missing or truncated buffer data, non-triangle topology).
pub fn import_scene(base_path: &Path, file_name: &str) -> Result<Vec<Mesh>> {
    let path = base_path.join(file_name);
    log::info!("importing scene {}", path.display());

    let gltf = gltf::Gltf::open(&path).map_err(|e| Error::import(&path, e.to_string()))?;
    let buffers = resolve_buffers(&gltf, base_path, &path)?;
    let meshes = extract_meshes(&gltf.document, &buffers, base_path, &path)?;
    log::info!("extracted {} meshes from {}", meshes.len(), path.display());
    Ok(meshes)
}

/// Load the backing byte buffers the document refers to. A scene whose
/// binary payload is missing or shorter than declared is incomplete.
fn resolve_buffers(gltf: &gltf::Gltf, base_path: &Path, scene_path: &Path) -> Result<Vec<Vec<u8>>> {
    let mut buffer_data = Vec::new();
    for buffer in gltf.document.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .as_deref()
                .map(<[u8]>::to_vec)
                .ok_or_else(|| Error::import(scene_path, "incomplete scene: missing binary blob"))?,
            gltf::buffer::Source::Uri(uri) => {
                let buffer_path = base_path.join(uri);
                std::fs::read(&buffer_path).map_err(|e| {
                    Error::import(
                        scene_path,
                        format!("incomplete scene: buffer {uri}: {e}"),
                    )
                })?
            }
        };
        if data.len() < buffer.length() {
            return Err(Error::import(
                scene_path,
                format!(
                    "incomplete scene: buffer {} holds {} of {} bytes",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                ),
            ));
        }
        buffer_data.push(data);
    }
    Ok(buffer_data)
}

/// Fixed-capacity result arena. Tasks reserve a slot through the shared
/// atomic counter and write exactly once; completion order does not matter.
struct MeshArena {
    slots: Vec<OnceLock<Result<Mesh>>>,
    next: AtomicUsize,
}

impl MeshArena {
    fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| OnceLock::new()).collect(),
            next: AtomicUsize::new(0),
        }
    }

    fn reserve(&self) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    fn place(&self, slot: usize, result: Result<Mesh>) {
        if self.slots[slot].set(result).is_err() {
            log::error!("extraction slot {slot} written twice");
        }
    }

    fn into_results(self) -> Vec<Result<Mesh>> {
        self.slots
            .into_iter()
            .filter_map(|slot| slot.into_inner())
            .collect()
    }
}

/// Walk every scene concurrently and collect the extracted meshes.
pub(crate) fn extract_meshes(
    document: &gltf::Document,
    buffers: &[Vec<u8>],
    base_path: &Path,
    scene_path: &Path,
) -> Result<Vec<Mesh>> {
    let capacity: usize = document
        .scenes()
        .flat_map(|scene| scene.nodes())
        .map(count_primitives)
        .sum();
    let arena = MeshArena::new(capacity);

    // The scope blocks until every spawned task, including the ones the
    // tasks themselves spawn for child nodes, has completed.
    thread::scope(|scope| {
        for scene in document.scenes() {
            for node in scene.nodes() {
                process_node(scope, node, buffers, base_path, &arena);
            }
        }
    });

    let mut meshes = Vec::with_capacity(capacity);
    for result in arena.into_results() {
        meshes.push(result.map_err(|e| match e {
            Error::Import { reason, .. } => Error::import(scene_path, reason),
            other => other,
        })?);
    }
    Ok(meshes)
}

fn count_primitives(node: gltf::Node<'_>) -> usize {
    let own = node.mesh().map_or(0, |mesh| mesh.primitives().count());
    own + node.children().map(count_primitives).sum::<usize>()
}

/// Spawn one task per mesh primitive of this node and one per child node.
/// Child tasks recurse, attaching to the same scope as their parent.
fn process_node<'scope>(
    scope: &'scope thread::Scope<'scope, '_>,
    node: gltf::Node<'scope>,
    buffers: &'scope [Vec<u8>],
    base_path: &'scope Path,
    arena: &'scope MeshArena,
) {
    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            let slot = arena.reserve();
            let name = mesh.name().unwrap_or("unnamed_mesh").to_string();
            scope.spawn(move || {
                arena.place(slot, extract_primitive(name, &primitive, buffers, base_path));
            });
        }
    }
    for child in node.children() {
        scope.spawn(move || process_node(scope, child, buffers, base_path, arena));
    }
}

/// Pure-data extraction of one primitive into a [`Mesh`].
///
/// Positions are required; normals, texture coordinates and tangents are
/// optional and left zeroed when the source arrays are absent. Texture
/// coordinates are flipped (`v -> 1 - v`) to match the engine's
/// image-space convention.
fn extract_primitive(
    name: String,
    primitive: &gltf::Primitive<'_>,
    buffers: &[Vec<u8>],
    base_path: &Path,
) -> Result<Mesh> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        return Err(Error::import(
            base_path,
            format!(
                "mesh {name:?} uses topology {:?}, only triangulated scenes are supported",
                primitive.mode()
            ),
        ));
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let mut vertices: Vec<ModelVertex> = reader
        .read_positions()
        .ok_or_else(|| Error::import(base_path, format!("mesh {name:?} has no positions")))?
        .map(|position| ModelVertex {
            position,
            ..Default::default()
        })
        .collect();

    if let Some(normals) = reader.read_normals() {
        for (vertex, normal) in vertices.iter_mut().zip(normals) {
            vertex.normal = normal;
        }
    }
    if let Some(tex_coords) = reader.read_tex_coords(0).map(|t| t.into_f32()) {
        for (vertex, uv) in vertices.iter_mut().zip(tex_coords) {
            vertex.tex_coords = [uv[0], 1.0 - uv[1]];
        }
    }
    if let Some(tangents) = reader.read_tangents() {
        for (vertex, tangent) in vertices.iter_mut().zip(tangents) {
            // The fourth tangent component gives the bitangent its sign
            vertex.tangent = [tangent[0], tangent[1], tangent[2]];
            let normal: cgmath::Vector3<f32> = vertex.normal.into();
            let bitangent = cgmath::Vector3::cross(
                normal,
                cgmath::Vector3::new(tangent[0], tangent[1], tangent[2]),
            ) * tangent[3];
            vertex.bitangent = bitangent.into();
        }
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        // Non-indexed triangle soup: synthesize sequential indices
        None => (0..vertices.len() as u32).collect(),
    };

    let textures = extract_textures(&primitive.material(), base_path);

    Ok(Mesh::new(name, vertices, indices, textures))
}

/// Map the material's texture slots onto the engine's four roles.
///
/// The normal-map source feeds the Normal role while the occlusion
/// (ambient) source feeds the Height role; a convention inherited from the
/// importer this engine was modeled on.
fn extract_textures(material: &gltf::Material<'_>, base_path: &Path) -> Vec<TextureRef> {
    let mut textures = Vec::new();
    let pbr = material.pbr_metallic_roughness();

    let mut push = |texture: Option<gltf::Texture<'_>>, role: TextureRole| {
        let Some(texture) = texture else {
            return;
        };
        match texture.source().source() {
            gltf::image::Source::Uri { uri, .. } => {
                textures.push(TextureRef::new(join_texture_path(base_path, uri), role));
            }
            gltf::image::Source::View { .. } => {
                log::warn!(
                    "embedded {} image in material {:?} is not path-addressable, skipping",
                    role.stem(),
                    material.name().unwrap_or("unnamed")
                );
            }
        }
    };

    push(
        pbr.base_color_texture().map(|info| info.texture()),
        TextureRole::Diffuse,
    );
    push(
        pbr.metallic_roughness_texture().map(|info| info.texture()),
        TextureRole::Specular,
    );
    push(
        material.normal_texture().map(|info| info.texture()),
        TextureRole::Normal,
    );
    push(
        material.occlusion_texture().map(|info| info.texture()),
        TextureRole::Height,
    );
    textures
}

fn join_texture_path(base_path: &Path, uri: &str) -> PathBuf {
    base_path.join(uri)
}

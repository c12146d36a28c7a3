//! Wavefront OBJ mesh extraction.
//!
//! Obj files don't come with tangents and bitangents so they have to be
//! calculated here for normal maps to work correctly. Texture coordinates
//! are flipped into the engine's image-space convention, and the four
//! material texture slots of the `.mtl` are mapped onto the engine's
//! texture roles (the ambient slot lands in the height role, as the
//! importer convention dictates).

use std::path::Path;

use crate::{
    data_structures::{
        model::{Material, Mesh},
        texture::{TextureRef, TextureRole},
        vertex::ModelVertex,
    },
    error::{Error, Result},
};

/// Load an OBJ file into engine meshes plus the material colours of its
/// first `.mtl` entry (when present).
pub fn load_wavefront(base_path: &Path, file_name: &str) -> Result<(Vec<Mesh>, Option<Material>)> {
    let path = base_path.join(file_name);
    let (models, materials) = tobj::load_obj(
        &path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| Error::resource(&path, e.to_string()))?;

    let materials = match materials {
        Ok(materials) => materials,
        Err(e) => {
            log::warn!("no usable mtl for {}: {e}", path.display());
            Vec::new()
        }
    };

    let meshes = models
        .iter()
        .map(|m| {
            let textures = m
                .mesh
                .material_id
                .and_then(|id| materials.get(id))
                .map(|material| material_textures(material, base_path))
                .unwrap_or_default();
            build_mesh(&m.name, &m.mesh, textures)
        })
        .collect();

    let material_colours = materials.first().map(|m| Material {
        ambient: m.ambient.unwrap_or([0.05, 0.1, 0.05]).into(),
        diffuse: m.diffuse.unwrap_or([0.1, 0.2, 0.3]).into(),
        specular: m.specular.unwrap_or([0.0, 1.0, 0.0]).into(),
        shininess: m.shininess.unwrap_or(2.0),
    });

    Ok((meshes, material_colours))
}

fn material_textures(material: &tobj::Material, base_path: &Path) -> Vec<TextureRef> {
    let slots = [
        (&material.diffuse_texture, TextureRole::Diffuse),
        (&material.specular_texture, TextureRole::Specular),
        (&material.normal_texture, TextureRole::Normal),
        // .mtl has no height slot; the ambient map doubles as one
        (&material.ambient_texture, TextureRole::Height),
    ];
    slots
        .into_iter()
        .filter_map(|(file, role)| {
            file.as_ref()
                .map(|file| TextureRef::new(base_path.join(file), role))
        })
        .collect()
}

/// Assemble vertices from the flat tobj arrays and compute per-vertex
/// tangents/bitangents by averaging over the triangles sharing each vertex.
pub(crate) fn build_mesh(name: &str, mesh: &tobj::Mesh, textures: Vec<TextureRef>) -> Mesh {
    let mut vertices = (0..mesh.positions.len() / 3)
        .map(|i| ModelVertex {
            position: [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ],
            normal: [
                mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ],
            tex_coords: [
                mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
            tangent: [0.0; 3],
            bitangent: [0.0; 3],
        })
        .collect::<Vec<_>>();

    let indices = &mesh.indices;
    let mut triangles_included = vec![0u32; vertices.len()];

    for c in indices.chunks(3) {
        let v0 = vertices[c[0] as usize];
        let v1 = vertices[c[1] as usize];
        let v2 = vertices[c[2] as usize];

        let pos0: cgmath::Vector3<f32> = v0.position.into();
        let pos1: cgmath::Vector3<f32> = v1.position.into();
        let pos2: cgmath::Vector3<f32> = v2.position.into();

        let uv0: cgmath::Vector2<f32> = v0.tex_coords.into();
        let uv1: cgmath::Vector2<f32> = v1.tex_coords.into();
        let uv2: cgmath::Vector2<f32> = v2.tex_coords.into();

        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        // Solving delta_pos = delta_uv.x * T + delta_uv.y * B for both
        // edges gives the tangent frame. Degenerate UV triangles would
        // divide by zero, they contribute nothing instead.
        let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if det.abs() <= f32::EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
        // Flipped to produce right-handed normal maps in the engine's
        // texture coordinate system
        let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

        for &index in c {
            let vertex = &mut vertices[index as usize];
            vertex.tangent = (tangent + cgmath::Vector3::from(vertex.tangent)).into();
            vertex.bitangent = (bitangent + cgmath::Vector3::from(vertex.bitangent)).into();
            triangles_included[index as usize] += 1;
        }
    }

    // Average the accumulated tangent frames
    for (i, n) in triangles_included.into_iter().enumerate() {
        if n == 0 {
            continue;
        }
        let denom = 1.0 / n as f32;
        let vertex = &mut vertices[i];
        vertex.tangent = (cgmath::Vector3::from(vertex.tangent) * denom).into();
        vertex.bitangent = (cgmath::Vector3::from(vertex.bitangent) * denom).into();
    }

    Mesh::new(name.to_string(), vertices, mesh.indices.clone(), textures)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_mesh() -> tobj::Mesh {
        // Two triangles sharing an edge, with UVs spanning the unit square
        tobj::Mesh {
            positions: vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                0.0, 1.0, 0.0,
            ],
            normals: vec![
                0.0, 0.0, 1.0, //
                0.0, 0.0, 1.0, //
                0.0, 0.0, 1.0, //
                0.0, 0.0, 1.0,
            ],
            texcoords: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
            indices: vec![0, 1, 2, 0, 2, 3],
            ..Default::default()
        }
    }

    #[test]
    fn two_triangles_share_four_vertices() {
        let mesh = build_mesh("quad", &quad_mesh(), Vec::new());
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < 4));
    }

    #[test]
    fn uv_v_axis_is_flipped() {
        let mesh = build_mesh("quad", &quad_mesh(), Vec::new());
        assert_eq!(mesh.vertices[0].tex_coords, [0.0, 1.0]);
        assert_eq!(mesh.vertices[2].tex_coords, [1.0, 0.0]);
    }

    #[test]
    fn tangents_are_finite_and_nonzero_for_textured_geometry() {
        let mesh = build_mesh("quad", &quad_mesh(), Vec::new());
        for vertex in &mesh.vertices {
            for component in vertex.tangent.iter().chain(vertex.bitangent.iter()) {
                assert!(component.is_finite());
            }
            let tangent: cgmath::Vector3<f32> = vertex.tangent.into();
            assert!(cgmath::InnerSpace::magnitude(tangent) > 0.0);
        }
    }

    #[test]
    fn degenerate_uvs_leave_tangents_zeroed_not_nan() {
        let mut degenerate = quad_mesh();
        degenerate.texcoords = vec![0.0; 8];
        let mesh = build_mesh("quad", &degenerate, Vec::new());
        for vertex in &mesh.vertices {
            assert_eq!(vertex.tangent, [0.0; 3]);
            assert_eq!(vertex.bitangent, [0.0; 3]);
        }
    }
}

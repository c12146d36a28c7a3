//! End-to-end tests of the scene import pipeline on programmatic GLB
//! fixtures: extraction invariants, concurrency set-equality, texture role
//! mapping and incomplete-scene rejection. No GPU is involved; extraction
//! is pure data.

use std::collections::BTreeSet;

use toy_ngin::{
    data_structures::texture::TextureRole,
    error::Error,
    resources::import::import_scene,
};

use crate::common::fixtures::{GlbBuilder, MeshSpec, MODE_LINES, shared_edge_quad};

mod common;

#[test]
fn two_triangles_with_a_shared_edge_keep_four_unique_vertices() {
    let (positions, indices) = shared_edge_quad();
    let mut builder = GlbBuilder::new();
    let mesh = builder.add_mesh(&MeshSpec::triangles("quad", &positions, &indices));
    builder.add_root_node(mesh);
    let (dir, file) = builder.write_temp("shared_edge");

    let meshes = import_scene(&dir, &file).unwrap();
    assert_eq!(meshes.len(), 1);
    let mesh = &meshes[0];
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.indices.len(), 6);
    assert!(mesh.indices.iter().all(|&i| (i as usize) < 4));

    // no duplicate vertex entries
    let unique: BTreeSet<_> = mesh
        .vertices
        .iter()
        .map(|v| v.position.map(f32::to_bits))
        .collect();
    assert_eq!(unique.len(), mesh.vertices.len());
}

#[test]
fn index_list_is_three_per_face_and_in_bounds() {
    let (positions, indices) = shared_edge_quad();
    let mut builder = GlbBuilder::new();
    let mesh = builder.add_mesh(&MeshSpec::triangles("quad", &positions, &indices));
    builder.add_root_node(mesh);
    let (dir, file) = builder.write_temp("index_invariant");

    for mesh in import_scene(&dir, &file).unwrap() {
        assert_eq!(mesh.indices.len() % 3, 0);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }
}

#[test]
fn all_leaf_meshes_survive_concurrent_extraction() {
    // K sibling leaves under one root; completion order is up to the
    // scheduler, the resulting set must not depend on it
    const K: usize = 12;
    let mut builder = GlbBuilder::new();
    let mut mesh_ids = Vec::new();
    let names: Vec<String> = (0..K).map(|i| format!("leaf_{i}")).collect();
    for (i, name) in names.iter().enumerate() {
        let positions = vec![
            [i as f32, 0.0, 0.0],
            [i as f32 + 1.0, 0.0, 0.0],
            [i as f32, 1.0, 0.0],
        ];
        mesh_ids.push(builder.add_mesh(&MeshSpec::triangles(name, &positions, &[0, 1, 2])));
    }
    builder.add_tree(&mesh_ids);
    let (dir, file) = builder.write_temp("concurrent_leaves");

    let meshes = import_scene(&dir, &file).unwrap();
    assert_eq!(meshes.len(), K);

    let extracted: BTreeSet<String> = meshes.iter().map(|m| m.name.clone()).collect();
    let expected: BTreeSet<String> = names.into_iter().collect();
    assert_eq!(extracted, expected);
}

#[test]
fn texture_slots_map_onto_the_four_roles() {
    let (positions, indices) = shared_edge_quad();
    let mut builder = GlbBuilder::new();
    let material = builder.add_material(
        Some("tex/base.png"),
        Some("tex/normal.png"),
        Some("tex/ambient.png"),
    );
    let mesh = builder.add_mesh(&MeshSpec {
        material: Some(material),
        ..MeshSpec::triangles("textured", &positions, &indices)
    });
    builder.add_root_node(mesh);
    let (dir, file) = builder.write_temp("texture_roles");

    let meshes = import_scene(&dir, &file).unwrap();
    let textures = &meshes[0].textures;

    let role_of = |role: TextureRole| {
        textures
            .iter()
            .find(|t| t.role == role)
            .unwrap_or_else(|| panic!("missing {role:?}"))
    };
    assert_eq!(role_of(TextureRole::Diffuse).path, dir.join("tex/base.png"));
    assert_eq!(role_of(TextureRole::Normal).path, dir.join("tex/normal.png"));
    // the occlusion (ambient) slot lands in the height role
    assert_eq!(role_of(TextureRole::Height).path, dir.join("tex/ambient.png"));
}

#[test]
fn shared_texture_paths_are_identical_across_meshes() {
    let (positions, indices) = shared_edge_quad();
    let mut builder = GlbBuilder::new();
    let material = builder.add_material(Some("tex/shared.png"), None, None);
    let a = builder.add_mesh(&MeshSpec {
        material: Some(material),
        ..MeshSpec::triangles("a", &positions, &indices)
    });
    let b = builder.add_mesh(&MeshSpec {
        material: Some(material),
        ..MeshSpec::triangles("b", &positions, &indices)
    });
    builder.add_tree(&[a, b]);
    let (dir, file) = builder.write_temp("shared_texture");

    let meshes = import_scene(&dir, &file).unwrap();
    let paths: Vec<_> = meshes
        .iter()
        .flat_map(|m| m.textures.iter().map(|t| t.path.clone()))
        .collect();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0], paths[1], "one cache key, one upload");
}

#[test]
fn texture_coordinates_are_v_flipped() {
    let (positions, indices) = shared_edge_quad();
    let tex_coords = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 0.25], [0.0, 1.0]];
    let mut builder = GlbBuilder::new();
    let mesh = builder.add_mesh(&MeshSpec {
        tex_coords: Some(&tex_coords),
        ..MeshSpec::triangles("uv", &positions, &indices)
    });
    builder.add_root_node(mesh);
    let (dir, file) = builder.write_temp("uv_flip");

    let meshes = import_scene(&dir, &file).unwrap();
    assert_eq!(meshes[0].vertices[0].tex_coords, [0.0, 1.0]);
    assert_eq!(meshes[0].vertices[2].tex_coords, [1.0, 0.75]);
}

#[test]
fn optional_attributes_default_to_zero() {
    let (positions, indices) = shared_edge_quad();
    let mut builder = GlbBuilder::new();
    let mesh = builder.add_mesh(&MeshSpec::triangles("bare", &positions, &indices));
    builder.add_root_node(mesh);
    let (dir, file) = builder.write_temp("bare_attributes");

    let meshes = import_scene(&dir, &file).unwrap();
    for vertex in &meshes[0].vertices {
        assert_eq!(vertex.normal, [0.0; 3]);
        assert_eq!(vertex.tangent, [0.0; 3]);
        assert_eq!(vertex.bitangent, [0.0; 3]);
    }
}

#[test]
fn non_triangle_topology_is_an_import_error() {
    let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
    let mut builder = GlbBuilder::new();
    let mesh = builder.add_mesh(&MeshSpec {
        mode: MODE_LINES,
        ..MeshSpec::triangles("lines", &positions, &[0, 1])
    });
    builder.add_root_node(mesh);
    let (dir, file) = builder.write_temp("line_topology");

    match import_scene(&dir, &file) {
        Err(Error::Import { .. }) => {}
        other => panic!("expected an import error, got {other:?}"),
    }
}

#[test]
fn unreadable_scene_is_an_import_error() {
    match import_scene(std::env::temp_dir().as_path(), "does-not-exist.glb") {
        Err(Error::Import { .. }) => {}
        other => panic!("expected an import error, got {other:?}"),
    }
}

//! Round-trip tests for the binary model cache: a reload must reproduce
//! the extracted arrays exactly and must not need the scene importer.

use toy_ngin::resources::{cache, import::import_scene};

use crate::common::fixtures::{GlbBuilder, MeshSpec, shared_edge_quad};

mod common;

#[test]
fn cache_round_trip_reproduces_the_extraction_exactly() {
    let (positions, indices) = shared_edge_quad();
    let tex_coords = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    let mut builder = GlbBuilder::new();
    let material = builder.add_material(Some("tex/base.png"), None, Some("tex/height.png"));
    let mesh = builder.add_mesh(&MeshSpec {
        tex_coords: Some(&tex_coords),
        material: Some(material),
        ..MeshSpec::triangles("cached", &positions, &indices)
    });
    builder.add_root_node(mesh);
    let (dir, file) = builder.write_temp("cache_roundtrip");

    let imported = import_scene(&dir, &file).unwrap();
    let cache_path = cache::cache_file(&dir, &file);
    cache::export(&cache_path, &imported).unwrap();

    let reloaded = cache::import(&cache_path).unwrap();
    assert_eq!(reloaded.len(), imported.len());
    for (a, b) in imported.iter().zip(&reloaded) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.vertices, b.vertices);
        assert_eq!(a.indices, b.indices);
        assert_eq!(a.textures, b.textures);
    }
}

#[test]
fn cache_load_does_not_invoke_the_importer() {
    let (positions, indices) = shared_edge_quad();
    let mut builder = GlbBuilder::new();
    let mesh = builder.add_mesh(&MeshSpec::triangles("orphan", &positions, &indices));
    builder.add_root_node(mesh);
    let (dir, file) = builder.write_temp("cache_no_import");

    let imported = import_scene(&dir, &file).unwrap();
    let cache_path = cache::cache_file(&dir, &file);
    cache::export(&cache_path, &imported).unwrap();

    // With the scene file gone, only the cache can satisfy the load
    std::fs::remove_file(dir.join(&file)).unwrap();
    let reloaded = cache::import(&cache_path).unwrap();
    assert_eq!(reloaded[0].vertices, imported[0].vertices);
    assert_eq!(reloaded[0].indices, imported[0].indices);
}

#[test]
fn truncated_cache_is_rejected_not_misread() {
    let (positions, indices) = shared_edge_quad();
    let mut builder = GlbBuilder::new();
    let mesh = builder.add_mesh(&MeshSpec::triangles("short", &positions, &indices));
    builder.add_root_node(mesh);
    let (dir, file) = builder.write_temp("cache_truncated");

    let imported = import_scene(&dir, &file).unwrap();
    let cache_path = cache::cache_file(&dir, &file);
    cache::export(&cache_path, &imported).unwrap();

    let bytes = std::fs::read(&cache_path).unwrap();
    std::fs::write(&cache_path, &bytes[..bytes.len() / 2]).unwrap();
    assert!(cache::import(&cache_path).is_err());
}

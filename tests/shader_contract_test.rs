//! The shader sources carry a naming contract the engine's uniform and
//! vertex plumbing relies on. These tests pin the names so a shader edit
//! cannot silently break the binding protocol.

use std::path::Path;

fn shader(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("assets/shaders")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("missing shader {}: {e}", path.display()))
}

#[test]
fn lighting_vertex_stage_names_match_the_uniform_contract() {
    let source = shader("lighting.vert.wgsl");
    for name in ["projection", "view", "model", "gWVP", "gViewPos"] {
        assert!(source.contains(name), "lighting.vert.wgsl lost {name}");
    }
    // vertex inputs at their fixed attribute slots
    assert!(source.contains("@location(0) position"));
    assert!(source.contains("@location(1) normal"));
    assert!(source.contains("@location(2) tex_coords"));
    assert!(source.contains("@location(3) tangent"));
    assert!(source.contains("@location(4) bitangent"));
}

#[test]
fn lighting_fragment_stage_names_match_the_light_and_sampler_contract() {
    let source = shader("lighting.frag.wgsl");
    for name in ["gLightPos", "gLightColor", "gViewPos"] {
        assert!(source.contains(name), "lighting.frag.wgsl lost {name}");
    }
    for name in [
        "texture_diffuse1",
        "texture_specular1",
        "texture_normal1",
        "texture_height1",
    ] {
        assert!(source.contains(name), "lighting.frag.wgsl lost {name}");
    }
}

#[test]
fn every_shader_pair_exposes_the_pipeline_entry_points() {
    for (vert, frag) in [
        ("lighting.vert.wgsl", "lighting.frag.wgsl"),
        ("ground.vert.wgsl", "ground.frag.wgsl"),
        ("flat.vert.wgsl", "flat.frag.wgsl"),
    ] {
        assert!(shader(vert).contains("fn vs_main"), "{vert} lost vs_main");
        assert!(shader(frag).contains("fn fs_main"), "{frag} lost fs_main");
    }
}

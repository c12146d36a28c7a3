//! Loading of models, meshes, textures and shader sources from files.
//!
//! [`load_model`] is the full import pipeline for a scene file: cache
//! lookup, concurrent extraction, cache write-back and the single-threaded
//! GPU upload pass. The submodules hold the pieces:
//!
//! - `import` parses a scene and extracts meshes concurrently
//! - `mesh` builds meshes from wavefront OBJ files
//! - `texture` loads textures and deduplicates uploads per model
//! - `cache` is the binary model cache skipping re-imports

use std::path::Path;

use crate::{
    data_structures::model::{Material, Model},
    effect::ShaderEffect,
    error::Result,
    resources::texture::TextureCache,
};

pub mod cache;
pub mod import;
pub mod mesh;
pub mod texture;

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    let text = tokio::fs::read_to_string(file_name).await?;
    Ok(text)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    let data = tokio::fs::read(file_name).await?;
    Ok(data)
}

/// Build a [`Model`] from a scene file.
///
/// An empty `file_name` produces a model with zero meshes, the form used by
/// procedural objects. Otherwise the binary cache is consulted first; a
/// miss (or a stale/corrupt cache) runs the importer and writes the cache
/// back. GPU upload happens last, on this thread: texture resolution
/// through the per-model cache followed by each mesh's buffer setup.
pub async fn load_model(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    format: wgpu::TextureFormat,
    name: &str,
    base_path: &Path,
    file_name: &str,
    vert_path: &str,
    frag_path: &str,
) -> Result<Model> {
    let effect = ShaderEffect::lighting(device, format, vert_path, frag_path).await?;

    let mut meshes = if file_name.is_empty() {
        Vec::new()
    } else {
        let cache_path = cache::cache_file(base_path, file_name);
        if cache_path.exists() {
            match cache::import(&cache_path) {
                Ok(meshes) => meshes,
                Err(e) => {
                    log::warn!("{e}; re-importing");
                    import_and_cache(base_path, file_name, &cache_path)?
                }
            }
        } else {
            import_and_cache(base_path, file_name, &cache_path)?
        }
    };

    // Single-threaded GPU phase: every extraction task has completed by
    // now, textures first (first load wins), then buffer setup per mesh.
    let mut textures = TextureCache::new();
    for mesh in &mut meshes {
        mesh.setup(device, queue, &mut textures);
    }

    let material = Material::default();
    effect.set_material(queue, &material);

    Ok(Model {
        name: name.to_string(),
        meshes,
        base_path: base_path.to_path_buf(),
        file_name: file_name.to_string(),
        material,
        effect,
        transform: Default::default(),
    })
}

fn import_and_cache(
    base_path: &Path,
    file_name: &str,
    cache_path: &Path,
) -> Result<Vec<crate::data_structures::model::Mesh>> {
    let meshes = import::import_scene(base_path, file_name)?;
    if let Err(e) = cache::export(cache_path, &meshes) {
        // A failed cache write costs the next run an import, nothing more
        log::warn!("{e}");
    }
    Ok(meshes)
}

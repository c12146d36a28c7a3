//! Texture loading, the per-model texture cache and the material layout.
//!
//! All functions here run in the single-threaded GPU upload phase that
//! follows scene extraction; the cache is therefore plain data with no
//! interior locking.

use std::{collections::HashMap, path::{Path, PathBuf}, sync::Arc};

use crate::{
    data_structures::texture::{Texture, TextureRef, TextureRole},
    error::Error,
};

/// Bind group layout for one mesh's material: a texture/sampler pair per
/// role, in role order (diffuse, specular, normal, height at bindings
/// 0/1, 2/3, 4/5, 6/7). Matches the `texture_<role>1` bindings declared in
/// the lighting fragment shader.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let mut entries = Vec::with_capacity(TextureRole::ALL.len() * 2);
    for role in TextureRole::ALL {
        let base = role.tag() as u32 * 2;
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: base,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        });
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: base + 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
    }
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &entries,
        label: Some("material_bind_group_layout"),
    })
}

/// Path-keyed cache guaranteeing at most one load per key.
pub(crate) struct PathCache<T> {
    entries: HashMap<PathBuf, T>,
}

impl<T: Clone> PathCache<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Return the cached value for `path`, invoking `load` only on the
    /// first request. First load wins; later calls share its result.
    pub(crate) fn get_or_insert_with(&mut self, path: &Path, load: impl FnOnce() -> T) -> T {
        if let Some(existing) = self.entries.get(path) {
            return existing.clone();
        }
        let value = load();
        self.entries.insert(path.to_path_buf(), value.clone());
        value
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }
}

/// Per-model texture cache: deduplicates GPU uploads by file path and hands
/// out role-appropriate placeholders for missing or broken files.
pub struct TextureCache {
    entries: PathCache<Arc<Texture>>,
    defaults: HashMap<TextureRole, Arc<Texture>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self {
            entries: PathCache::new(),
            defaults: HashMap::new(),
        }
    }

    /// Number of distinct uploads performed so far.
    pub fn uploads(&self) -> usize {
        self.entries.len()
    }

    pub fn is_loaded(&self, path: &Path) -> bool {
        self.entries.contains(path)
    }

    /// Resolve a texture reference to a GPU texture, uploading at most once
    /// per path. A missing or undecodable file degrades to the role's
    /// placeholder instead of failing the model.
    pub fn get_or_load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &TextureRef,
    ) -> Arc<Texture> {
        let fallback = self.default_for(device, queue, texture.role);
        self.entries.get_or_insert_with(&texture.path, || {
            match load_texture(device, queue, &texture.path, texture.role) {
                Ok(loaded) => Arc::new(loaded),
                Err(e) => {
                    log::warn!("{e}; substituting placeholder");
                    fallback
                }
            }
        })
    }

    /// Build the material bind group for a mesh's texture list: the first
    /// texture of each role fills that role's slot, placeholders fill the
    /// rest. Extra textures beyond the first per role are accepted in the
    /// data model but not bound.
    pub fn material_bind_group(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        textures: &[TextureRef],
    ) -> wgpu::BindGroup {
        let resolved: Vec<Arc<Texture>> = TextureRole::ALL
            .iter()
            .map(|&role| {
                match textures.iter().find(|texture| texture.role == role) {
                    Some(texture) => self.get_or_load(device, queue, texture),
                    None => self.default_for(device, queue, role),
                }
            })
            .collect();

        let mut entries = Vec::with_capacity(resolved.len() * 2);
        for (role, texture) in TextureRole::ALL.iter().zip(&resolved) {
            let base = role.tag() as u32 * 2;
            entries.push(wgpu::BindGroupEntry {
                binding: base,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: base + 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            });
        }
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &material_layout(device),
            entries: &entries,
            label: Some("material_bind_group"),
        })
    }

    fn default_for(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        role: TextureRole,
    ) -> Arc<Texture> {
        self.defaults
            .entry(role)
            .or_insert_with(|| {
                let texture = match role {
                    TextureRole::Normal => Texture::default_normal_map(device, queue),
                    TextureRole::Height => {
                        Texture::solid(device, queue, [0, 0, 0, 255], "default height map")
                    }
                    _ => Texture::solid(device, queue, [255, 255, 255, 255], "default colour map"),
                };
                Arc::new(texture)
            })
            .clone()
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Read and upload one texture file.
pub fn load_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &Path,
    role: TextureRole,
) -> Result<Texture, Error> {
    let bytes = std::fs::read(path).map_err(|e| Error::resource(path, e.to_string()))?;
    Texture::from_bytes(
        device,
        queue,
        &bytes,
        &path.display().to_string(),
        role.is_linear(),
    )
}

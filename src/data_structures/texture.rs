//! GPU textures, texture roles and the sampler naming convention.
//!
//! [`Texture`] wraps a wgpu texture with its view and sampler. [`TextureRef`]
//! is the CPU-side record produced by scene import: a file path plus a
//! semantic role, with the GPU upload deferred until the single-threaded
//! setup phase resolves it through the texture cache.

use std::path::PathBuf;

use image::GenericImageView;

use crate::error::{Error, Result};

/// Semantic role of a texture within a material.
///
/// Four fixed roles, mirroring the importer convention this engine grew up
/// with. Note the quirk inherited from that convention: the importer's
/// normal-map slot feeds [`TextureRole::Normal`], while its *ambient*
/// slot feeds [`TextureRole::Height`]. The labels are kept, the semantics
/// are not treated as authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureRole {
    Diffuse,
    Specular,
    Normal,
    Height,
}

impl TextureRole {
    pub const ALL: [TextureRole; 4] = [
        TextureRole::Diffuse,
        TextureRole::Specular,
        TextureRole::Normal,
        TextureRole::Height,
    ];

    /// The `texture_<role>` stem used to build sampler names.
    pub fn stem(self) -> &'static str {
        match self {
            TextureRole::Diffuse => "texture_diffuse",
            TextureRole::Specular => "texture_specular",
            TextureRole::Normal => "texture_normal",
            TextureRole::Height => "texture_height",
        }
    }

    /// Normal and height maps carry vectors/scalars, not colours, so they
    /// are sampled in linear space instead of sRGB.
    pub fn is_linear(self) -> bool {
        matches!(self, TextureRole::Normal | TextureRole::Height)
    }

    pub(crate) fn tag(self) -> u8 {
        match self {
            TextureRole::Diffuse => 0,
            TextureRole::Specular => 1,
            TextureRole::Normal => 2,
            TextureRole::Height => 3,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(TextureRole::Diffuse),
            1 => Some(TextureRole::Specular),
            2 => Some(TextureRole::Normal),
            3 => Some(TextureRole::Height),
            _ => None,
        }
    }
}

/// A texture reference extracted from a scene: path and role only.
///
/// The GPU handle lives in the texture cache and is attached during mesh
/// setup; extraction tasks never touch the GPU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRef {
    pub path: PathBuf,
    pub role: TextureRole,
}

impl TextureRef {
    pub fn new(path: impl Into<PathBuf>, role: TextureRole) -> Self {
        Self {
            path: path.into(),
            role,
        }
    }
}

/// Sampler names for a texture list, by convention `texture_<role><n>`.
///
/// Ordinal counters run per role and start at 1, in list order:
/// `[Diffuse, Diffuse, Specular]` yields `texture_diffuse1`,
/// `texture_diffuse2`, `texture_specular1`.
pub fn sampler_names(textures: &[TextureRef]) -> Vec<String> {
    let mut counters = [0u32; 4];
    textures
        .iter()
        .map(|texture| {
            let slot = &mut counters[texture.role.tag() as usize];
            *slot += 1;
            format!("{}{}", texture.role.stem(), slot)
        })
        .collect()
}

/// A GPU texture with its view and sampler.
#[derive(Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Depth buffer format used by every pipeline in the engine.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create the depth attachment matching the current surface size.
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// A 1x1 texture of a single colour, used as the placeholder when a
    /// material slot has no file or its file failed to load.
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, rgba: [u8; 4], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            sampler: default_sampler(device),
        }
    }

    /// The neutral normal-map colour (straight-up normal).
    pub fn default_normal_map(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::solid(device, queue, [127, 127, 255, 255], "default normal map")
    }

    /// Decode image file bytes and upload them.
    ///
    /// `linear` selects linear storage (vector/scalar maps) over sRGB
    /// (colour maps).
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
        linear: bool,
    ) -> Result<Self> {
        let img =
            image::load_from_memory(bytes).map_err(|e| Error::resource(label, e.to_string()))?;
        Ok(Self::from_image(device, queue, &img, Some(label), linear))
    }

    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        label: Option<&str>,
        linear: bool,
    ) -> Self {
        let dimensions = img.dimensions();
        let rgba = img.to_rgba8();

        let size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1,
        };
        let format = if linear {
            wgpu::TextureFormat::Rgba8Unorm
        } else {
            wgpu::TextureFormat::Rgba8UnormSrgb
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * dimensions.0),
                rows_per_image: Some(dimensions.1),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            sampler: default_sampler(device),
        }
    }
}

pub fn default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampler_ordinals_count_per_role_from_one() {
        let textures = vec![
            TextureRef::new("a.png", TextureRole::Diffuse),
            TextureRef::new("b.png", TextureRole::Diffuse),
            TextureRef::new("c.png", TextureRole::Specular),
            TextureRef::new("d.png", TextureRole::Normal),
            TextureRef::new("e.png", TextureRole::Height),
            TextureRef::new("f.png", TextureRole::Diffuse),
        ];
        assert_eq!(
            sampler_names(&textures),
            vec![
                "texture_diffuse1",
                "texture_diffuse2",
                "texture_specular1",
                "texture_normal1",
                "texture_height1",
                "texture_diffuse3",
            ]
        );
    }

    #[test]
    fn role_tags_round_trip() {
        for role in TextureRole::ALL {
            assert_eq!(TextureRole::from_tag(role.tag()), Some(role));
        }
        assert_eq!(TextureRole::from_tag(9), None);
    }

    #[test]
    fn colour_maps_are_srgb_vector_maps_are_linear() {
        assert!(!TextureRole::Diffuse.is_linear());
        assert!(!TextureRole::Specular.is_linear());
        assert!(TextureRole::Normal.is_linear());
        assert!(TextureRole::Height.is_linear());
    }
}

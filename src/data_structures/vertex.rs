//! Fixed vertex layouts shared by every pipeline.
//!
//! The byte layout of [`ModelVertex`] doubles as the GPU attribute contract
//! (stride and per-attribute offsets) and as the on-disk record format of
//! the binary model cache, so it must never be reordered.

use std::mem;

/// Types that can describe themselves as a wgpu vertex buffer layout.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// The one vertex layout used for all lit geometry.
///
/// Attribute slots are fixed: 0 position, 1 normal, 2 texture coordinates,
/// 3 tangent, 4 bitangent. Optional source attributes that a scene file
/// lacks are left zeroed.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl ModelVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
        4 => Float32x3,
    ];
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Vertex for unlit line geometry (axis gizmo, light marker).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl LineVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
    ];
}

impl Vertex for LineVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_vertex_stride_and_offsets_match_struct_layout() {
        let desc = ModelVertex::desc();
        assert_eq!(desc.array_stride, 56);
        assert_eq!(desc.array_stride as usize, mem::size_of::<ModelVertex>());

        let offsets: Vec<u64> = desc.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(
            offsets,
            vec![
                mem::offset_of!(ModelVertex, position) as u64,
                mem::offset_of!(ModelVertex, normal) as u64,
                mem::offset_of!(ModelVertex, tex_coords) as u64,
                mem::offset_of!(ModelVertex, tangent) as u64,
                mem::offset_of!(ModelVertex, bitangent) as u64,
            ]
        );
    }

    #[test]
    fn attribute_slots_are_sequential_from_zero() {
        let locations: Vec<u32> = ModelVertex::desc()
            .attributes
            .iter()
            .map(|a| a.shader_location)
            .collect();
        assert_eq!(locations, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn line_vertex_layout() {
        let desc = LineVertex::desc();
        assert_eq!(desc.array_stride as usize, mem::size_of::<LineVertex>());
        assert_eq!(desc.attributes.len(), 2);
    }
}

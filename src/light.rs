//! Point light and its GPU resources.

use cgmath::{Vector3, Vector4};
use wgpu::util::DeviceExt;

/// The scene's single point light. Position is a homogeneous vector to
/// match the `gLightPos` uniform in the lighting shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vector4<f32>,
    pub color: Vector3<f32>,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vector4::new(0.0, 50.0, 0.0, 0.0),
            color: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// GPU mirror of [`PointLight`]. Field order matches the `LightUniforms`
/// struct in the lighting fragment shader (`gLightPos`, `gLightColor`).
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniforms {
    position: [f32; 4],
    color: [f32; 3],
    // Uniform buffers require 16 byte spacing, hence the padding field
    _padding: u32,
}

impl From<&PointLight> for LightUniforms {
    fn from(light: &PointLight) -> Self {
        Self {
            position: light.position.into(),
            color: light.color.into(),
            _padding: 0,
        }
    }
}

pub fn light_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

/// The light's uniform buffer and bind group, created once and shared by
/// every lighting pipeline.
#[derive(Debug)]
pub struct LightResources {
    pub light: PointLight,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, light: PointLight) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Uniform Buffer"),
            contents: bytemuck::cast_slice(&[LightUniforms::from(&light)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &light_layout(device),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("light_bind_group"),
        });
        Self {
            light,
            buffer,
            bind_group,
        }
    }

    /// Push the current light state to the GPU.
    pub fn upload(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::cast_slice(&[LightUniforms::from(&self.light)]),
        );
    }
}

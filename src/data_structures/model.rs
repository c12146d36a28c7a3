//! Mesh and model data: the CPU-side extraction product and its GPU state.
//!
//! A [`Mesh`] starts life as plain vertex/index/texture arrays produced by
//! an extraction task. [`Mesh::setup`] runs later, on the thread owning the
//! GPU context, and is the only place buffers and bind groups are created.
//! [`Model`] aggregates the meshes of one imported scene together with its
//! material, shader effect and local transform.

use std::path::PathBuf;

use cgmath::Vector3;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        texture::{TextureRef, sampler_names},
        transform::Transform,
        vertex::ModelVertex,
    },
    effect::ShaderEffect,
    resources::texture::TextureCache,
};

/// Phong-style material colours applied uniformly to a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vector3::new(0.05, 0.1, 0.05),
            diffuse: Vector3::new(0.1, 0.2, 0.3),
            specular: Vector3::new(0.0, 1.0, 0.0),
            shininess: 2.0,
        }
    }
}

/// GPU half of a mesh, created exactly once by [`Mesh::setup`].
#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub material_bind_group: wgpu::BindGroup,
}

/// One drawable primitive: immutable vertex data, triangle indices and
/// texture references, plus GPU handles once set up.
#[derive(Debug, Default)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub textures: Vec<TextureRef>,
    gpu: Option<GpuMesh>,
}

impl Mesh {
    pub fn new(
        name: String,
        vertices: Vec<ModelVertex>,
        indices: Vec<u32>,
        textures: Vec<TextureRef>,
    ) -> Self {
        Self {
            name,
            vertices,
            indices,
            textures,
            gpu: None,
        }
    }

    pub fn is_set_up(&self) -> bool {
        self.gpu.is_some()
    }

    /// Upload vertex and index data and resolve the material bind group.
    ///
    /// Must run on the render thread after the vertex/index/texture arrays
    /// are final. Calling it a second time is a logic error and is ignored.
    pub fn setup(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, cache: &mut TextureCache) {
        if self.gpu.is_some() {
            log::error!("mesh {:?} set up twice, keeping first upload", self.name);
            return;
        }
        for (texture, sampler) in self.textures.iter().zip(sampler_names(&self.textures)) {
            log::debug!(
                "mesh {:?}: {} <- {}",
                self.name,
                sampler,
                texture.path.display()
            );
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let material_bind_group = cache.material_bind_group(device, queue, &self.textures);

        self.gpu = Some(GpuMesh {
            vertex_buffer,
            index_buffer,
            num_elements: self.indices.len() as u32,
            material_bind_group,
        });
    }

    /// Record one indexed triangle draw.
    ///
    /// The material bind group carries every texture unit for this mesh, so
    /// no per-draw unbinding is needed; the next draw replaces it wholesale.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        let Some(gpu) = &self.gpu else {
            log::error!("mesh {:?} drawn before setup or after dispose", self.name);
            return;
        };
        render_pass.set_bind_group(0, &gpu.material_bind_group, &[]);
        render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..gpu.num_elements, 0, 0..1);
    }

    /// Release the GPU buffers. The mesh keeps its CPU data but can no
    /// longer be drawn; disposing twice is ignored.
    pub fn dispose(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.vertex_buffer.destroy();
            gpu.index_buffer.destroy();
        }
    }
}

/// A renderable model: meshes from one imported scene, a material, the
/// shader effect that lights it and a local transform.
#[derive(Debug)]
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub base_path: PathBuf,
    pub file_name: String,
    pub material: Material,
    pub effect: ShaderEffect,
    pub transform: Transform,
}

impl Model {
    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.transform.set_position(position);
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.transform.set_scale(scale);
    }

    /// Release every mesh's GPU resources.
    pub fn dispose(&mut self) {
        for mesh in &mut self.meshes {
            mesh.dispose();
        }
    }
}

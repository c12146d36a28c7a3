//! A static OBJ-loaded object with optional continuous spin.

use std::path::{Path, PathBuf};

use cgmath::{Rad, Vector3};
use instant::Duration;

use crate::{
    data_structures::{
        model::{Material, Mesh},
        transform::Transform,
    },
    effect::{DrawMode, ShaderEffect},
    error::Result,
    objects::{FrameState, RenderObject},
    resources::{mesh::load_wavefront, texture::TextureCache},
};

#[derive(Debug)]
pub struct WavefrontObject {
    name: String,
    #[allow(unused)]
    obj_path: PathBuf,
    meshes: Vec<Mesh>,
    effect: ShaderEffect,
    material: Material,
    transform: Transform,
    draw_mode: DrawMode,
    /// Y-axis spin in radians per second; zero keeps the object static.
    spin: f32,
}

impl WavefrontObject {
    pub async fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        name: &str,
        base_path: &Path,
        obj_file: &str,
        vert_path: &str,
        frag_path: &str,
    ) -> Result<Self> {
        let effect = ShaderEffect::lighting(device, format, vert_path, frag_path).await?;
        let (mut meshes, mtl_material) = load_wavefront(base_path, obj_file)?;

        let mut textures = TextureCache::new();
        for mesh in &mut meshes {
            mesh.setup(device, queue, &mut textures);
        }

        let material = mtl_material.unwrap_or_default();
        effect.set_material(queue, &material);

        Ok(Self {
            name: name.to_string(),
            obj_path: base_path.join(obj_file),
            meshes,
            effect,
            material,
            transform: Transform::default(),
            draw_mode: DrawMode::Fill,
            spin: 1.0,
        })
    }

    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.transform.set_position(position);
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.transform.set_scale(scale);
        self
    }

    pub fn with_spin(mut self, spin: f32) -> Self {
        self.spin = spin;
        self
    }

    pub fn with_draw_mode(mut self, draw_mode: DrawMode) -> Self {
        self.draw_mode = draw_mode;
        self
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn set_draw_mode(&mut self, draw_mode: DrawMode) {
        self.draw_mode = draw_mode;
    }

    pub fn dispose(&mut self) {
        for mesh in &mut self.meshes {
            mesh.dispose();
        }
    }
}

impl RenderObject for WavefrontObject {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    fn update(&mut self, dt: Duration) {
        if self.spin != 0.0 {
            self.transform.rotate_by(Rad(self.spin * dt.as_secs_f32()));
        }
    }

    fn render(
        &mut self,
        render_pass: &mut wgpu::RenderPass<'_>,
        queue: &wgpu::Queue,
        frame: &FrameState<'_>,
    ) {
        self.effect
            .set_matrices(frame.projection, frame.view, frame.world * self.transform.matrix());
        self.effect.set_eye_world_pos(frame.eye_position);
        self.effect.upload(queue);
        self.effect
            .enable(render_pass, Some(&frame.light.bind_group), self.draw_mode);
        for mesh in &self.meshes {
            mesh.draw(render_pass);
        }
    }
}

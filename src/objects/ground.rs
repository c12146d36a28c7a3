//! Procedural ground plane.

use instant::Duration;

use crate::{
    data_structures::{
        model::{Material, Mesh},
        transform::Transform,
        vertex::ModelVertex,
    },
    effect::{DrawMode, ShaderEffect},
    error::Result,
    objects::{FrameState, RenderObject},
    resources::texture::TextureCache,
};

/// A flat quad centred at the origin, lit like any other mesh.
#[derive(Debug)]
pub struct Ground {
    name: String,
    mesh: Mesh,
    effect: ShaderEffect,
    transform: Transform,
}

impl Ground {
    pub async fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        name: &str,
        size: f32,
        vert_path: &str,
        frag_path: &str,
    ) -> Result<Self> {
        let effect = ShaderEffect::lighting(device, format, vert_path, frag_path).await?;
        effect.set_material(
            queue,
            &Material {
                ambient: [0.1, 0.1, 0.1].into(),
                diffuse: [0.45, 0.5, 0.45].into(),
                specular: [0.1, 0.1, 0.1].into(),
                shininess: 1.0,
            },
        );

        let mut mesh = ground_mesh(size);
        mesh.setup(device, queue, &mut TextureCache::new());

        Ok(Self {
            name: name.to_string(),
            mesh,
            effect,
            transform: Transform::default(),
        })
    }
}

/// The quad geometry: four corners in the XZ plane, normal up, texture
/// coordinates spanning the unit square.
pub fn ground_mesh(size: f32) -> Mesh {
    let half = size / 2.0;
    let corners = [
        ([-half, 0.0, -half], [0.0, 0.0]),
        ([half, 0.0, -half], [1.0, 0.0]),
        ([half, 0.0, half], [1.0, 1.0]),
        ([-half, 0.0, half], [0.0, 1.0]),
    ];
    let vertices = corners
        .into_iter()
        .map(|(position, tex_coords)| ModelVertex {
            position,
            normal: [0.0, 1.0, 0.0],
            tex_coords,
            tangent: [1.0, 0.0, 0.0],
            bitangent: [0.0, 0.0, 1.0],
        })
        .collect();
    Mesh::new("ground".to_string(), vertices, vec![0, 2, 1, 0, 3, 2], Vec::new())
}

impl RenderObject for Ground {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    fn update(&mut self, _dt: Duration) {}

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
            .enable(render_pass, Some(&frame.light.bind_group), DrawMode::Fill);
        self.mesh.draw(render_pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_has_two_triangles_over_four_vertices() {
        let mesh = ground_mesh(100.0);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < 4));
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
        assert!(mesh.vertices.iter().all(|v| v.position[1] == 0.0));
    }
}

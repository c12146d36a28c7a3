//! [`Model`] as a render object.

use instant::Duration;

use crate::{
    data_structures::{model::Model, transform::Transform},
    effect::DrawMode,
    objects::{FrameState, RenderObject},
};

impl RenderObject for Model {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Imported models hold still; the transform only changes through its
    /// mutators, and the dirty flag keeps repeated updates free.
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
        for mesh in &self.meshes {
            mesh.draw(render_pass);
        }
    }
}

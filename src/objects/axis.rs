//! Debug axis gizmo: three coloured lines through the origin.

use instant::Duration;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{transform::Transform, vertex::LineVertex},
    effect::{DrawMode, ShaderEffect},
    error::Result,
    objects::{FrameState, RenderObject},
};

/// X (red), Y (green) and Z (blue) axis lines, drawn unlit.
#[derive(Debug)]
pub struct Axis {
    name: String,
    effect: ShaderEffect,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    transform: Transform,
}

impl Axis {
    pub async fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        name: &str,
        length: f32,
        vert_path: &str,
        frag_path: &str,
    ) -> Result<Self> {
        let effect = ShaderEffect::flat(device, format, vert_path, frag_path).await?;
        let vertices = axis_vertices(length);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Axis Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Ok(Self {
            name: name.to_string(),
            effect,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            transform: Transform::default(),
        })
    }
}

/// Line-list vertices for the three axes, one colour per axis.
pub fn axis_vertices(length: f32) -> Vec<LineVertex> {
    let axes = [
        ([1.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
        ([0.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, 1.0], [0.0, 0.0, 1.0]),
    ];
    axes.into_iter()
        .flat_map(|(direction, color)| {
            [
                LineVertex {
                    position: [
                        -direction[0] * length,
                        -direction[1] * length,
                        -direction[2] * length,
                    ],
                    color,
                },
                LineVertex {
                    position: [
                        direction[0] * length,
                        direction[1] * length,
                        direction[2] * length,
                    ],
                    color,
                },
            ]
        })
        .collect()
}

impl RenderObject for Axis {
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
        self.effect.enable(render_pass, None, DrawMode::Fill);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..self.vertex_count, 0..1);
    }
}

//! The polymorphic render-object contract driven by the world loop.
//!
//! Every renderable implements the same four-phase protocol per frame:
//! `update` (recompute time-dependent or dirty transform state), then
//! `pre_render` / `render` / `post_render` in list order. Draw-mode
//! decisions (fill vs wireframe) are baked into immutable pipelines chosen
//! at render time, so nothing an object does in its bracket phases can
//! leak GPU state into the next object's draw.
//!
//! The trait also exposes `name` and the transform directly; UI panels and
//! debugging tools read those through the interface instead of peeking at
//! concrete types.

use cgmath::{Matrix4, Point3};
use instant::Duration;

use crate::{data_structures::transform::Transform, light::LightResources};

pub mod axis;
pub mod ground;
pub mod model;
pub mod wavefront;

/// Read-only per-frame state shared by every render call.
pub struct FrameState<'a> {
    pub projection: Matrix4<f32>,
    pub view: Matrix4<f32>,
    /// Parent transform objects compose their local matrix onto; the world
    /// loop passes identity.
    pub world: Matrix4<f32>,
    pub eye_position: Point3<f32>,
    pub light: &'a LightResources,
}

/// A renderable scene object.
pub trait RenderObject {
    fn name(&self) -> &str;

    fn transform(&self) -> &Transform;

    fn transform_mut(&mut self) -> &mut Transform;

    /// Advance time-dependent state. Must be idempotent when nothing
    /// changed since the last call; the transform's dirty flag guards the
    /// matrix recomputation.
    fn update(&mut self, dt: Duration);

    /// Bracket hook before `render`. Defaults to a no-op.
    fn pre_render(&mut self) {}

    /// Record this object's draw calls. Shared camera/light state is read
    /// through `frame` and must not be mutated here.
    fn render(
        &mut self,
        render_pass: &mut wgpu::RenderPass<'_>,
        queue: &wgpu::Queue,
        frame: &FrameState<'_>,
    );

    /// Bracket hook after `render`. Defaults to a no-op.
    fn post_render(&mut self) {}
}

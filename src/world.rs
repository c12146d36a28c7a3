//! The world: render-object collection, camera, light and the frame loop.
//!
//! Lifecycle is `Uninitialized -> Running -> Destroyed` (terminal).
//! Render objects are appended before the loop starts and rendered in
//! insertion order; there is no provision for adding or removing objects
//! mid-loop. Each frame: poll platform events, update every object, render
//! every object (pre_render, render, post_render), draw the light marker,
//! present, then sleep off the rest of the frame budget.

use std::{iter, pin::Pin, sync::Arc};

use cgmath::Matrix4;
use instant::Instant;
use wgpu::util::DeviceExt;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    config::Config,
    context::{Context, InitContext},
    data_structures::vertex::LineVertex,
    effect::{DrawMode, ShaderEffect},
    objects::{FrameState, RenderObject},
    pacing::FramePacer,
};

/// Constructor for a render object, invoked once the GPU context exists.
pub type ObjectConstructor = Box<
    dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn RenderObject>>>>>,
>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Running,
    Destroyed,
}

/// Everything that only exists while the platform window is alive.
///
/// Field order doubles as tear-down order: objects and the marker release
/// their GPU resources before the context drops the device and surface.
struct WorldState {
    objects: Vec<Box<dyn RenderObject>>,
    marker: LightMarker,
    is_surface_configured: bool,
    ctx: Context,
}

pub struct World {
    config: Config,
    lifecycle: Lifecycle,
    constructors: Vec<ObjectConstructor>,
    async_runtime: tokio::runtime::Runtime,
    state: Option<WorldState>,
    last_time: Instant,
    pacer: FramePacer,
    right_mouse_pressed: bool,
}

impl World {
    pub fn new(config: Config) -> Self {
        let pacer = FramePacer::new(config.target_fps);
        Self {
            config,
            lifecycle: Lifecycle::Uninitialized,
            constructors: Vec::new(),
            async_runtime: tokio::runtime::Runtime::new().expect("failed to start async runtime"),
            state: None,
            last_time: Instant::now(),
            pacer,
            right_mouse_pressed: false,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Queue a render object for construction at init time. Objects can
    /// only be added before the loop starts.
    pub fn add_render_object(&mut self, constructor: ObjectConstructor) {
        if self.lifecycle != Lifecycle::Uninitialized {
            log::error!("render objects must be added before the world runs, ignoring");
            return;
        }
        self.constructors.push(constructor);
    }

    /// Drive the frame loop until the platform signals shutdown.
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.run_app(&mut self)?;
        self.destroy();
        Ok(())
    }

    /// Release all resources exactly once; the world is unusable after.
    pub fn destroy(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        // WorldState's field order drops objects before the GPU context
        self.state = None;
        self.lifecycle = Lifecycle::Destroyed;
        log::info!("world destroyed");
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let Some(state) = &mut self.state else {
            return Ok(());
        };
        state.ctx.window.request_redraw();
        if !state.is_surface_configured {
            return Ok(());
        }

        let output = state.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            state
                .ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let [r, g, b, a] = self.config.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &state.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let WorldState { objects, marker, ctx, .. } = &mut *state;
            let frame = FrameState {
                projection: ctx.projection.calc_matrix(),
                view: ctx.camera.calc_matrix(),
                world: Matrix4::from_scale(1.0),
                eye_position: ctx.camera.position,
                light: &ctx.light,
            };

            for object in objects.iter_mut() {
                object.pre_render();
                object.render(&mut render_pass, &ctx.queue, &frame);
                object.post_render();
            }

            marker.draw(&mut render_pass, &ctx.queue, &frame);
        }

        state.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl ApplicationHandler for World {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => panic!("platform initialization failed: {e}"),
        };

        let ctx = match self.async_runtime.block_on(Context::new(window)) {
            Ok(ctx) => ctx,
            // Nothing can render without a device and surface
            Err(e) => panic!("{e}"),
        };
        ctx.light.upload(&ctx.queue);

        let mut objects: Vec<Box<dyn RenderObject>> = Vec::new();
        for constructor in self.constructors.drain(..) {
            match self.async_runtime.block_on(constructor((&ctx).into())) {
                Ok(object) => {
                    log::info!("added render object {:?}", object.name());
                    objects.push(object);
                }
                Err(e) => panic!("failed to construct render object: {e}"),
            }
        }

        let marker = match self.async_runtime.block_on(LightMarker::new(&ctx)) {
            Ok(marker) => marker,
            Err(e) => panic!("failed to construct light marker: {e}"),
        };

        self.state = Some(WorldState {
            objects,
            marker,
            is_surface_configured: false,
            ctx,
        });
        self.lifecycle = Lifecycle::Running;
        self.last_time = Instant::now();
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            let speed_factor = 5.0;
            if self.right_mouse_pressed {
                state
                    .ctx
                    .camera_controller
                    .handle_mouse(dx * speed_factor, dy * speed_factor);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        state.ctx.camera_controller.handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.destroy();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                state.ctx.resize(size.width, size.height);
                state.is_surface_configured = true;
            }
            WindowEvent::MouseInput { state: button_state, button, .. } => {
                if button == MouseButton::Right {
                    self.right_mouse_pressed = button_state.is_pressed();
                }
            }
            WindowEvent::RedrawRequested => {
                self.pacer.begin_frame();
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                {
                    let WorldState { objects, ctx, .. } = &mut *state;
                    ctx.camera_controller.update(&mut ctx.camera, dt);
                    ctx.light.upload(&ctx.queue);
                    for object in objects.iter_mut() {
                        object.update(dt);
                    }
                }

                match self.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(state) = &mut self.state {
                            let size = state.ctx.window.inner_size();
                            state.ctx.resize(size.width, size.height);
                        }
                    }
                    Err(e) => log::error!("unable to render: {e}"),
                }

                self.pacer.wait();
            }
            _ => {}
        }
    }
}

/// Small unlit cross drawn at the light's position.
struct LightMarker {
    effect: ShaderEffect,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl LightMarker {
    async fn new(ctx: &Context) -> crate::error::Result<Self> {
        let effect = ShaderEffect::flat(&ctx.device, ctx.format(), "", "").await?;
        let vertices = marker_vertices(1.5, ctx.light.light.color.into());
        let vertex_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Light Marker Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        Ok(Self {
            effect,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        })
    }

    fn draw(
        &mut self,
        render_pass: &mut wgpu::RenderPass<'_>,
        queue: &wgpu::Queue,
        frame: &FrameState<'_>,
    ) {
        let position = frame.light.light.position;
        let model =
            frame.world * Matrix4::from_translation([position.x, position.y, position.z].into());
        self.effect.set_matrices(frame.projection, frame.view, model);
        self.effect.set_eye_world_pos(frame.eye_position);
        self.effect.upload(queue);
        self.effect.enable(render_pass, None, DrawMode::Fill);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..self.vertex_count, 0..1);
    }
}

/// A three-line cross centred on the origin, all in one colour.
fn marker_vertices(size: f32, color: [f32; 3]) -> Vec<LineVertex> {
    let directions = [
        [1.0f32, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ];
    directions
        .into_iter()
        .flat_map(|d| {
            [
                LineVertex {
                    position: [-d[0] * size, -d[1] * size, -d[2] * size],
                    color,
                },
                LineVertex {
                    position: [d[0] * size, d[1] * size, d[2] * size],
                    color,
                },
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_world_is_uninitialized_until_run() {
        let world = World::new(Config::default());
        assert_eq!(world.lifecycle(), Lifecycle::Uninitialized);
    }

    #[test]
    fn destroy_is_terminal_and_idempotent() {
        let mut world = World::new(Config::default());
        world.destroy();
        assert_eq!(world.lifecycle(), Lifecycle::Destroyed);
        world.destroy();
        assert_eq!(world.lifecycle(), Lifecycle::Destroyed);
    }

    #[test]
    fn marker_is_one_line_list_cross() {
        let vertices = marker_vertices(2.0, [1.0, 1.0, 0.5]);
        assert_eq!(vertices.len(), 6);
        assert!(vertices.iter().all(|v| v.color == [1.0, 1.0, 0.5]));
    }
}

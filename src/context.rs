//! Central GPU and window context.
//!
//! Owns the wgpu device/queue/surface, the depth attachment, the camera
//! and the light resources. Created once at startup; any failure here is
//! fatal because nothing can render without it.

use std::sync::Arc;

use cgmath::Deg;
use winit::window::Window;

use crate::{
    camera::{Camera, CameraController, Projection},
    data_structures::texture::Texture,
    error::{Error, Result},
    light::{LightResources, PointLight},
};

/// The owned slice of the context a render-object constructor needs.
///
/// Cloning `Device` and `Queue` only clones their internal ref-counted
/// handles, so this hands async constructors a `'static` view of the GPU.
#[derive(Debug, Clone)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub format: wgpu::TextureFormat,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            format: ctx.config.format,
        }
    }
}

#[derive(Debug)]
pub struct Context {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub depth_texture: Texture,
    pub camera: Camera,
    pub camera_controller: CameraController,
    pub projection: Projection,
    pub light: LightResources,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let platform_err = |e: String| Error::PlatformInit(e);

        log::info!("wgpu setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| platform_err(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| platform_err(e.to_string()))?;

        // Wireframe draw modes need the line polygon mode; ask for it only
        // where the adapter has it so the engine still runs elsewhere
        let wanted = wgpu::Features::POLYGON_MODE_LINE;
        let required_features = adapter.features() & wanted;
        if required_features != wanted {
            log::warn!("adapter lacks POLYGON_MODE_LINE, wireframe draw modes are disabled");
        }

        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| platform_err(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders assume an sRGB surface; fall back to whatever the
        // platform offers first otherwise
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera = Camera::new((0.0, 50.0, 50.0), Deg(-90.0), Deg(-45.0));
        let projection = Projection::new(config.width, config.height, Deg(45.0), 0.1, 500.0);
        let camera_controller = CameraController::new(10.0, 0.4);

        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        let light = LightResources::new(&device, PointLight::default());

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_texture,
            camera,
            camera_controller,
            projection,
            light,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.projection.resize(width, height);
            self.surface.configure(&self.device, &self.config);
            self.depth_texture =
                Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
        }
    }
}

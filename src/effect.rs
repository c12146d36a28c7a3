//! Shader effects: WGSL module validation, pipeline linking and uniforms.
//!
//! A [`ShaderEffect`] is built from two source files (vertex and fragment).
//! Each module is validated separately; a validation failure is reported as
//! a compile error carrying the compiler log and the source text. Linking
//! the two modules against the engine's bind group and vertex layouts
//! happens once, at render-pipeline creation, and a mismatch is a link
//! error. Both are fatal for the effect, no partial state survives.
//!
//! All uniform plumbing is resolved here at construction time: one uniform
//! buffer for the per-object matrices and eye position, one for the
//! material colours, and bind groups over both. Per frame the effect
//! stages matrix values CPU-side and uploads them in a single write.

use std::{fmt::Write as _, path::{Path, PathBuf}};

use cgmath::{Matrix4, Point3};
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        model::Material,
        texture::Texture,
        vertex::{LineVertex, ModelVertex, Vertex},
    },
    error::{Error, Result},
    light,
    resources::{self, texture::material_layout},
};

pub const DEFAULT_LIGHTING_VERT: &str = "assets/shaders/lighting.vert.wgsl";
pub const DEFAULT_LIGHTING_FRAG: &str = "assets/shaders/lighting.frag.wgsl";
pub const DEFAULT_FLAT_VERT: &str = "assets/shaders/flat.vert.wgsl";
pub const DEFAULT_FLAT_FRAG: &str = "assets/shaders/flat.frag.wgsl";

/// How triangles are rasterized. Wireframe is a separate, immutable
/// pipeline rather than mutable GPU state, so one object's draw mode can
/// never leak into the next object's draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Fill,
    Wireframe,
}

/// Per-object uniforms, written each frame.
///
/// Field order matches the `ObjectUniforms` struct in the WGSL sources,
/// where the members are named `projection`, `view`, `model`, `gWVP` and
/// `gViewPos`.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniforms {
    projection: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    wvp: [[f32; 4]; 4],
    eye_position: [f32; 4],
}

impl Default for ObjectUniforms {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::from_scale(1.0f32).into();
        Self {
            projection: identity,
            view: identity,
            model: identity,
            wvp: identity,
            eye_position: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Material colours as shipped to the fragment stage. The specular `w`
/// component carries the shininess exponent.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniforms {
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
}

impl From<&Material> for MaterialUniforms {
    fn from(material: &Material) -> Self {
        Self {
            ambient: [
                material.ambient.x,
                material.ambient.y,
                material.ambient.z,
                1.0,
            ],
            diffuse: [
                material.diffuse.x,
                material.diffuse.y,
                material.diffuse.z,
                1.0,
            ],
            specular: [
                material.specular.x,
                material.specular.y,
                material.specular.z,
                material.shininess,
            ],
        }
    }
}

/// Layout for the object/material uniform group.
pub fn object_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
        label: Some("object_bind_group_layout"),
    })
}

/// A linked shader program with its resolved uniform state.
#[derive(Debug)]
pub struct ShaderEffect {
    label: String,
    pipeline: wgpu::RenderPipeline,
    wireframe_pipeline: Option<wgpu::RenderPipeline>,
    object_buffer: wgpu::Buffer,
    #[allow(unused)]
    material_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    uniforms: ObjectUniforms,
}

impl ShaderEffect {
    /// Build the lit-mesh effect: [`ModelVertex`] layout, material textures
    /// at group 0, object/material uniforms at group 1, light at group 2.
    /// A wireframe variant of the pipeline is linked alongside the fill
    /// one.
    pub async fn lighting(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        vert_path: &str,
        frag_path: &str,
    ) -> Result<Self> {
        let (vert, frag) =
            load_sources(vert_path, frag_path, DEFAULT_LIGHTING_VERT, DEFAULT_LIGHTING_FRAG)
                .await?;
        let vs = compile_module(device, &vert.0, &vert.1).await?;
        let fs = compile_module(device, &frag.0, &frag.1).await?;

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lighting Pipeline Layout"),
            bind_group_layouts: &[
                &material_layout(device),
                &object_layout(device),
                &light::light_layout(device),
            ],
            push_constant_ranges: &[],
        });

        let label = "lighting";
        let pipeline = link_pipeline(
            device,
            label,
            &layout,
            &vs,
            &fs,
            format,
            &[ModelVertex::desc()],
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::PolygonMode::Fill,
        )
        .await?;
        // Only link the wireframe variant where the device has the feature
        let wireframe_pipeline = if device
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE)
        {
            Some(
                link_pipeline(
                    device,
                    label,
                    &layout,
                    &vs,
                    &fs,
                    format,
                    &[ModelVertex::desc()],
                    wgpu::PrimitiveTopology::TriangleList,
                    wgpu::PolygonMode::Line,
                )
                .await?,
            )
        } else {
            None
        };

        Ok(Self::assemble(device, label, pipeline, wireframe_pipeline))
    }

    /// Build the unlit line effect used by the axis gizmo and the light
    /// marker: [`LineVertex`] layout, object uniforms at group 0.
    pub async fn flat(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        vert_path: &str,
        frag_path: &str,
    ) -> Result<Self> {
        let (vert, frag) =
            load_sources(vert_path, frag_path, DEFAULT_FLAT_VERT, DEFAULT_FLAT_FRAG).await?;
        let vs = compile_module(device, &vert.0, &vert.1).await?;
        let fs = compile_module(device, &frag.0, &frag.1).await?;

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Flat Pipeline Layout"),
            bind_group_layouts: &[&object_layout(device)],
            push_constant_ranges: &[],
        });

        let label = "flat";
        let pipeline = link_pipeline(
            device,
            label,
            &layout,
            &vs,
            &fs,
            format,
            &[LineVertex::desc()],
            wgpu::PrimitiveTopology::LineList,
            wgpu::PolygonMode::Fill,
        )
        .await?;

        Ok(Self::assemble(device, label, pipeline, None))
    }

    fn assemble(
        device: &wgpu::Device,
        label: &str,
        pipeline: wgpu::RenderPipeline,
        wireframe_pipeline: Option<wgpu::RenderPipeline>,
    ) -> Self {
        let uniforms = ObjectUniforms::default();
        let object_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Uniform Buffer"),
            contents: bytemuck::cast_slice(&[MaterialUniforms::from(&Material::default())]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &object_layout(device),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: object_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: material_buffer.as_entire_binding(),
                },
            ],
            label: Some("object_bind_group"),
        });

        Self {
            label: label.to_string(),
            pipeline,
            wireframe_pipeline,
            object_buffer,
            material_buffer,
            object_bind_group,
            uniforms,
        }
    }

    /// Stage projection/view/model and the derived world-view-projection.
    pub fn set_matrices(
        &mut self,
        projection: Matrix4<f32>,
        view: Matrix4<f32>,
        model: Matrix4<f32>,
    ) {
        self.uniforms.projection = projection.into();
        self.uniforms.view = view.into();
        self.uniforms.model = model.into();
        self.uniforms.wvp = (projection * view * model).into();
    }

    pub fn set_eye_world_pos(&mut self, eye: Point3<f32>) {
        self.uniforms.eye_position = [eye.x, eye.y, eye.z, 1.0];
    }

    pub fn set_material(&self, queue: &wgpu::Queue, material: &Material) {
        queue.write_buffer(
            &self.material_buffer,
            0,
            bytemuck::cast_slice(&[MaterialUniforms::from(material)]),
        );
    }

    /// Upload the staged uniforms for this frame.
    pub fn upload(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.object_buffer,
            0,
            bytemuck::cast_slice(&[self.uniforms]),
        );
    }

    /// Activate the effect on the pass: pipeline plus its uniform groups.
    /// The light bind group is supplied by the world; effects without a
    /// lighting stage pass `None`.
    pub fn enable(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        light: Option<&wgpu::BindGroup>,
        mode: DrawMode,
    ) {
        let pipeline = match (mode, &self.wireframe_pipeline) {
            (DrawMode::Wireframe, Some(wireframe)) => wireframe,
            (DrawMode::Wireframe, None) => {
                log::warn!("effect {:?} has no wireframe variant", self.label);
                &self.pipeline
            }
            (DrawMode::Fill, _) => &self.pipeline,
        };
        render_pass.set_pipeline(pipeline);
        match light {
            Some(light_bind_group) => {
                render_pass.set_bind_group(1, &self.object_bind_group, &[]);
                render_pass.set_bind_group(2, light_bind_group, &[]);
            }
            None => {
                render_pass.set_bind_group(0, &self.object_bind_group, &[]);
            }
        }
    }
}

/// Load the vertex and fragment sources concurrently. An empty path falls
/// back to the effect's default source file.
async fn load_sources(
    vert_path: &str,
    frag_path: &str,
    default_vert: &str,
    default_frag: &str,
) -> Result<((PathBuf, String), (PathBuf, String))> {
    let vert_path = if vert_path.is_empty() {
        default_vert
    } else {
        vert_path
    };
    let frag_path = if frag_path.is_empty() {
        default_frag
    } else {
        frag_path
    };
    let (vert, frag) = futures::future::join(
        resources::load_string(vert_path),
        resources::load_string(frag_path),
    )
    .await;
    let vert = vert.map_err(|e| Error::resource(vert_path, e.to_string()))?;
    let frag = frag.map_err(|e| Error::resource(frag_path, e.to_string()))?;
    Ok(((vert_path.into(), vert), (frag_path.into(), frag)))
}

/// Validate one WGSL module. Failures carry the full compiler log and the
/// source text.
async fn compile_module(
    device: &wgpu::Device,
    path: &Path,
    source: &str,
) -> Result<wgpu::ShaderModule> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&path.display().to_string()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let info = module.get_compilation_info().await;
    let scope_error = device.pop_error_scope().await;

    let mut log = String::new();
    for message in &info.messages {
        if matches!(message.message_type, wgpu::CompilationMessageType::Error) {
            let _ = writeln!(log, "{}", message.message);
        }
    }
    if let Some(e) = &scope_error {
        let _ = writeln!(log, "{e}");
    }
    if scope_error.is_some() || !log.is_empty() {
        return Err(Error::ShaderCompile {
            path: path.to_path_buf(),
            log,
            source_text: source.to_string(),
        });
    }
    Ok(module)
}

/// Link two validated modules into a render pipeline. An interface
/// mismatch between the stages, the vertex layout or the bind group
/// layouts surfaces here as a link error.
async fn link_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    vs: &wgpu::ShaderModule,
    fs: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    vertex_layouts: &[wgpu::VertexBufferLayout<'_>],
    topology: wgpu::PrimitiveTopology,
    polygon_mode: wgpu::PolygonMode,
) -> Result<wgpu::RenderPipeline> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vs,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: fs,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState {
                    alpha: wgpu::BlendComponent::REPLACE,
                    color: wgpu::BlendComponent::REPLACE,
                }),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    });
    if let Some(e) = device.pop_error_scope().await {
        return Err(Error::ShaderLink {
            label: label.to_string(),
            log: e.to_string(),
        });
    }
    Ok(pipeline)
}

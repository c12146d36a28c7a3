//! toy-ngin
//!
//! A small real-time 3D rendering toy built on wgpu. It imports mesh
//! geometry (procedural ground, wavefront OBJ models, gltf scenes),
//! builds shader effects from vertex/fragment WGSL sources, uploads
//! geometry to GPU buffers and renders the scene each frame with a
//! camera, a point light and per-object transforms.
//!
//! High-level modules
//! - `camera`: camera, projection and a small fly controller
//! - `config`: startup configuration with defaults
//! - `context`: central GPU and window context (device/queue/surface)
//! - `data_structures`: vertices, transforms, models and textures
//! - `effect`: WGSL module validation, pipeline linking and uniforms
//! - `error`: the engine error taxonomy
//! - `light`: the point light and its GPU resources
//! - `objects`: the render-object contract and its variants
//! - `pacing`: monotonic-clock frame pacing
//! - `resources`: loaders for models, meshes, textures and the model cache
//! - `world`: the scene collection and the frame loop

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod effect;
pub mod error;
pub mod light;
pub mod objects;
pub mod pacing;
pub mod resources;
pub mod world;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;

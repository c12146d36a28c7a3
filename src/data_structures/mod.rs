//! Engine data structures: vertices, transforms, models and textures.
//!
//! This module contains the core data types for scene representation:
//!
//! - `vertex` fixes the GPU attribute layouts shared by every pipeline
//! - `transform` is the dirty-flagged local transform of a renderable
//! - `model` contains mesh and model definitions plus their GPU resources
//! - `texture` contains the GPU texture wrapper and the role/sampler naming
//!   convention

pub mod model;
pub mod texture;
pub mod transform;
pub mod vertex;

//! Per-object local transform with a lazily cached model matrix.

use cgmath::{Matrix4, Rad, Vector3};

/// Position, scale and a single-axis (Y) rotation for one renderable.
///
/// The derived model matrix is cached and only recomputed after a mutator
/// marked it dirty. Composition order is fixed:
/// `translate(position) * rotate_y(rotation) * scale(scale)`.
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vector3<f32>,
    scale: Vector3<f32>,
    rotation: Rad<f32>,
    matrix: Matrix4<f32>,
    dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: Rad(0.0),
            matrix: Matrix4::from_scale(1.0),
            dirty: false,
        }
    }
}

impl Transform {
    pub fn new(position: Vector3<f32>, scale: Vector3<f32>, rotation: Rad<f32>) -> Self {
        let mut transform = Self {
            position,
            scale,
            rotation,
            ..Self::default()
        };
        transform.dirty = true;
        transform.recompute();
        transform
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    pub fn rotation(&self) -> Rad<f32> {
        self.rotation
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
        self.dirty = true;
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
        self.dirty = true;
    }

    pub fn set_rotation(&mut self, rotation: Rad<f32>) {
        self.rotation = rotation;
        self.dirty = true;
    }

    pub fn rotate_by(&mut self, delta: Rad<f32>) {
        self.rotation += delta;
        self.dirty = true;
    }

    /// The model matrix, recomputed only when a mutator ran since the last
    /// call.
    pub fn matrix(&mut self) -> Matrix4<f32> {
        if self.dirty {
            self.recompute();
        }
        self.matrix
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn recompute(&mut self) {
        self.matrix = Matrix4::from_translation(self.position)
            * Matrix4::from_angle_y(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        self.dirty = false;
    }
}

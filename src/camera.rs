//! Camera, projection and a small orbit/fly controller.

use instant::Duration;
use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// wgpu clip space spans z in [0, 1] while cgmath produces OpenGL-style
/// [-1, 1]; this matrix converts between the two.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A free camera described by position plus yaw/pitch angles.
#[derive(Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
}

impl Camera {
    pub fn new<
        P: Into<Point3<f32>>,
        Y: Into<Rad<f32>>,
        R: Into<Rad<f32>>,
    >(
        position: P,
        yaw: Y,
        pitch: R,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();

        Matrix4::look_to_rh(
            self.position,
            Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize(),
            Vector3::unit_y(),
        )
    }
}

/// Perspective projection, resized together with the surface.
#[derive(Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// WASD + QE fly controller with mouse look while the right button is held.
#[derive(Debug)]
pub struct CameraController {
    amount_left: f32,
    amount_right: f32,
    amount_forward: f32,
    amount_backward: f32,
    amount_up: f32,
    amount_down: f32,
    rotate_horizontal: f32,
    rotate_vertical: f32,
    speed: f32,
    sensitivity: f32,
}

impl CameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            amount_left: 0.0,
            amount_right: 0.0,
            amount_forward: 0.0,
            amount_backward: 0.0,
            amount_up: 0.0,
            amount_down: 0.0,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            speed,
            sensitivity,
        }
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(key),
                    state,
                    ..
                },
            ..
        } = event
        {
            self.handle_keyboard(*key, *state);
        }
    }

    pub fn handle_keyboard(&mut self, key: KeyCode, state: ElementState) {
        let amount = if state == ElementState::Pressed {
            1.0
        } else {
            0.0
        };
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => self.amount_forward = amount,
            KeyCode::KeyS | KeyCode::ArrowDown => self.amount_backward = amount,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.amount_left = amount,
            KeyCode::KeyD | KeyCode::ArrowRight => self.amount_right = amount,
            KeyCode::KeyQ => self.amount_up = amount,
            KeyCode::KeyE => self.amount_down = amount,
            _ => (),
        }
    }

    pub fn handle_mouse(&mut self, mouse_dx: f64, mouse_dy: f64) {
        self.rotate_horizontal = mouse_dx as f32;
        self.rotate_vertical = mouse_dy as f32;
    }

    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32();

        let (yaw_sin, yaw_cos) = camera.yaw.0.sin_cos();
        let forward = Vector3::new(yaw_cos, 0.0, yaw_sin).normalize();
        let right = Vector3::new(-yaw_sin, 0.0, yaw_cos).normalize();
        camera.position += forward * (self.amount_forward - self.amount_backward) * self.speed * dt;
        camera.position += right * (self.amount_right - self.amount_left) * self.speed * dt;
        camera.position.y += (self.amount_up - self.amount_down) * self.speed * dt;

        camera.yaw += Rad(self.rotate_horizontal) * self.sensitivity * dt;
        camera.pitch += Rad(-self.rotate_vertical) * self.sensitivity * dt;
        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;

        // Keep the pitch away from straight up/down so look_to never
        // degenerates
        let limit = Rad(std::f32::consts::FRAC_PI_2 - 0.001);
        if camera.pitch < -limit {
            camera.pitch = -limit;
        } else if camera.pitch > limit {
            camera.pitch = limit;
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::{Deg, Transform as _};

    use super::*;

    #[test]
    fn view_matrix_moves_the_camera_position_to_the_origin() {
        let camera = Camera::new((0.0, 30.0, 20.0), Deg(-90.0), Deg(-60.0));
        let view = camera.calc_matrix();
        let at_origin = view.transform_point(camera.position);
        assert_relative_eq!(at_origin.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(at_origin.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(at_origin.z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn resize_updates_aspect_ratio() {
        let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 100.0);
        projection.resize(400, 400);
        let m = projection.calc_matrix();
        // square aspect: x and y scale agree up to the wgpu z remap
        assert_relative_eq!(m.x.x, m.y.y, epsilon = 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut controller = CameraController::new(10.0, 10.0);
        let mut camera = Camera::new((0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        controller.handle_mouse(0.0, -10_000.0);
        controller.update(&mut camera, Duration::from_secs(1));
        assert!(camera.pitch.0 < std::f32::consts::FRAC_PI_2);
    }
}

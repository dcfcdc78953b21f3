use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Rotation3, Vector3};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Eye displacement per scroll notch, along the (1,1,1) diagonal. A crude
/// radial zoom, not a look-at-preserving dolly; kept as the original
/// behaves.
pub const DOLLY_STEP: f32 = 0.5;

const NEAR: f32 = 0.001;
const FAR: f32 = 100.0;

/// Orbit camera looking at the origin. Dragging accumulates rotation
/// angles that are applied to the scene's model matrix at render time;
/// the eye itself only moves on dolly.
pub struct Camera {
    eye: Point3<f32>,
    fov_degrees: f32,

    /// Accumulated orbit, degrees, unbounded. One pixel of drag is one
    /// degree.
    y_angle: f32,
    x_angle: f32,

    viewport_size: PhysicalSize<u32>,
    last_mouse: PhysicalPosition<f64>,
    dragging: bool,
}

impl Camera {
    pub fn new(fov_degrees: f32, viewport_size: PhysicalSize<u32>) -> Self {
        Self {
            eye: Point3::new(-10.0, 0.0, -10.0),
            fov_degrees,
            y_angle: 0.0,
            x_angle: 0.0,
            viewport_size: clamp_size(viewport_size),
            last_mouse: Default::default(),
            dragging: false,
        }
    }

    /// Routes a window event to the matching controller transition.
    /// Returns whether the event was consumed.
    pub fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                match state {
                    ElementState::Pressed => {
                        self.begin_drag(self.last_mouse.x, self.last_mouse.y)
                    }
                    ElementState::Released => self.end_drag(),
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => self.drag_to(position.x, position.y),
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32,
                };
                if notches != 0.0 {
                    self.dolly(notches);
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    pub fn begin_drag(&mut self, x: f64, y: f64) {
        self.dragging = true;
        self.last_mouse = PhysicalPosition::new(x, y);
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// While a drag is active, dx feeds the horizontal angle and dy the
    /// vertical one, unscaled. Outside a drag only the cursor position is
    /// tracked so the next press starts from a fresh origin.
    pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
        if !self.dragging {
            self.last_mouse = PhysicalPosition::new(x, y);
            return false;
        }

        self.y_angle += (x - self.last_mouse.x) as f32;
        self.x_angle += (y - self.last_mouse.y) as f32;
        self.last_mouse = PhysicalPosition::new(x, y);
        true
    }

    /// Moves the eye by `DOLLY_STEP` along (1,1,1); the sign of
    /// `direction` picks which way.
    pub fn dolly(&mut self, direction: f32) {
        if direction == 0.0 {
            return;
        }
        self.eye += Vector3::repeat(DOLLY_STEP * direction.signum());
    }

    /// Only the aspect ratio changes; the view matrix is untouched.
    /// Zero-sized surfaces clamp to one pixel so the aspect stays finite.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.viewport_size = clamp_size(new_size);
    }

    /// Scene rotation from the accumulated orbit angles.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        let yaw = Rotation3::from_axis_angle(&Vector3::y_axis(), self.y_angle.to_radians());
        let pitch = Rotation3::from_axis_angle(&Vector3::x_axis(), self.x_angle.to_radians());
        (yaw * pitch).to_homogeneous()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view_isometry().to_homogeneous()
    }

    /// Inverse view matrix, the shader's camera-to-world transform. The
    /// isometry inverts exactly, no fallible matrix inversion involved.
    pub fn camera_to_world(&self) -> Matrix4<f32> {
        self.view_isometry().inverse().to_homogeneous()
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect(), self.fov_degrees.to_radians(), NEAR, FAR).to_homogeneous()
    }

    fn view_isometry(&self) -> Isometry3<f32> {
        Isometry3::look_at_rh(&self.eye, &Point3::origin(), &Vector3::y_axis())
    }

    pub fn aspect(&self) -> f32 {
        self.viewport_size.width as f32 / self.viewport_size.height as f32
    }

    pub fn resolution(&self) -> [f32; 2] {
        [
            self.viewport_size.width as f32,
            self.viewport_size.height as f32,
        ]
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    pub fn eye(&self) -> Point3<f32> {
        self.eye
    }

    /// (horizontal, vertical) orbit angles in degrees.
    pub fn angles(&self) -> (f32, f32) {
        (self.y_angle, self.x_angle)
    }
}

fn clamp_size(size: PhysicalSize<u32>) -> PhysicalSize<u32> {
    PhysicalSize::new(size.width.max(1), size.height.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(45.0, PhysicalSize::new(800, 600))
    }

    #[test]
    fn one_scroll_notch_moves_the_eye_half_a_unit_diagonally() {
        let mut camera = camera();
        assert_eq!(camera.eye(), Point3::new(-10.0, 0.0, -10.0));

        camera.dolly(1.0);
        assert_eq!(camera.eye(), Point3::new(-9.5, 0.5, -9.5));

        camera.dolly(-2.5); // magnitude is ignored, only the sign counts
        assert_eq!(camera.eye(), Point3::new(-10.0, 0.0, -10.0));
    }

    #[test]
    fn drag_accumulates_one_degree_per_pixel() {
        let mut camera = camera();
        camera.begin_drag(100.0, 100.0);
        assert!(camera.drag_to(110.0, 115.0));
        assert_eq!(camera.angles(), (10.0, 15.0));

        // Further deltas accumulate without wrapping.
        assert!(camera.drag_to(110.0, 475.0));
        assert_eq!(camera.angles(), (10.0, 375.0));
    }

    #[test]
    fn moves_without_an_active_drag_do_not_orbit() {
        let mut camera = camera();
        assert!(!camera.drag_to(300.0, 300.0));
        assert_eq!(camera.angles(), (0.0, 0.0));

        // The press picks up from the tracked position, not from (0, 0).
        camera.begin_drag(300.0, 300.0);
        camera.drag_to(301.0, 300.0);
        assert_eq!(camera.angles(), (1.0, 0.0));

        camera.end_drag();
        assert!(!camera.drag_to(500.0, 500.0));
        assert_eq!(camera.angles(), (1.0, 0.0));
    }

    #[test]
    fn resize_clamps_zero_dimensions() {
        let mut camera = camera();
        camera.resize(PhysicalSize::new(0, 0));
        assert_eq!(camera.resolution(), [1.0, 1.0]);
        assert!(camera.aspect().is_finite());
    }

    #[test]
    fn zero_rotation_model_matrix_is_identity() {
        let camera = camera();
        assert_eq!(camera.model_matrix(), Matrix4::identity());
    }

    #[test]
    fn camera_to_world_inverts_the_view() {
        let camera = camera();
        let product = camera.view_matrix() * camera.camera_to_world();
        let identity = Matrix4::<f32>::identity();
        for i in 0..4 {
            for j in 0..4 {
                assert!((product[(i, j)] - identity[(i, j)]).abs() < 1e-5);
            }
        }
    }
}

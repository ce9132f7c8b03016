use crate::render::cull::Frustum;
use crate::render::pick::Ray;
use glam::{Mat4, Vec2, Vec3, Vec4};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective { fov_y: f32, near: f32, far: f32 },
    Orthographic { half_height: f32, near: f32, far: f32 },
}

/// Snapshot of the viewport camera for one repaint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCamera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub projection: Projection,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

impl ViewCamera {
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        projection: Projection,
        viewport: Vec2,
    ) -> Self {
        Self {
            position: eye,
            forward: (target - eye).normalize_or_zero(),
            up: up.normalize_or_zero(),
            projection,
            viewport,
        }
    }

    pub fn is_orthographic(&self) -> bool {
        matches!(self.projection, Projection::Orthographic { .. })
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x.max(1.0) / self.viewport.y.max(1.0)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = self.aspect();
        match self.projection {
            Projection::Perspective { fov_y, near, far } => {
                Mat4::perspective_rh_gl(fov_y, aspect, near, far)
            }
            Projection::Orthographic {
                half_height,
                near,
                far,
            } => {
                let half_width = half_height * aspect;
                Mat4::orthographic_rh_gl(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    near,
                    far,
                )
            }
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection())
    }

    /// Ray through a cursor position given in pixels, top-left origin.
    pub fn screen_ray(&self, cursor: Vec2) -> Ray {
        let size = self.viewport.max(Vec2::ONE);
        let ndc_x = cursor.x / size.x * 2.0 - 1.0;
        let ndc_y = 1.0 - cursor.y / size.y * 2.0;

        let vp_inv = self.view_projection().inverse();
        let near_world = vp_inv * Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far_world = vp_inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near_world.truncate() / near_world.w;
        let far = far_world.truncate() / far_world.w;

        let origin = if self.is_orthographic() { near } else { self.position };
        Ray::new(origin, far - near)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CameraController {
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
}

impl CameraController {
    pub fn new(position: [f32; 3], yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }

    pub fn from_bounds(center: [f32; 3], extent: [f32; 3]) -> Self {
        let radius = extent[0].max(extent[1]).max(extent[2]);
        let distance = if radius > 0.0 { radius * 3.0 } else { 3.0 };
        let center = Vec3::from_array(center);
        let position = center + Vec3::new(distance, distance * 0.4, distance);
        let (yaw, pitch) = forward_to_yaw_pitch(center - position);
        Self::new(position.to_array(), yaw, pitch)
    }

    pub fn orbit_around(&mut self, pivot: [f32; 3], yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch += pitch_delta;
        wrap_angles(&mut self.yaw, &mut self.pitch);

        let pivot = Vec3::from_array(pivot);
        let distance = (Vec3::from_array(self.position) - pivot).length().max(0.05);
        let (dir, _, _) = self.basis();
        self.position = (pivot - dir * distance).to_array();
    }

    /// (forward, right, up)
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        camera_basis(self.yaw, self.pitch)
    }

    pub fn view_camera(&self, projection: Projection, viewport: Vec2) -> ViewCamera {
        let (forward, _right, up) = self.basis();
        ViewCamera {
            position: Vec3::from_array(self.position),
            forward,
            up,
            projection,
            viewport,
        }
    }
}

fn forward_to_yaw_pitch(forward: Vec3) -> (f32, f32) {
    let n = forward / forward.length().max(1e-6);
    let yaw = n.z.atan2(n.x);
    let pitch = n.y.clamp(-1.0, 1.0).asin();
    (yaw, pitch)
}

fn camera_basis(yaw: f32, pitch: f32) -> (Vec3, Vec3, Vec3) {
    let cos_pitch = pitch.cos();
    let forward = Vec3::new(yaw.cos() * cos_pitch, pitch.sin(), yaw.sin() * cos_pitch);
    let right = Vec3::new(-yaw.sin(), 0.0, yaw.cos());
    let up = right.cross(forward).normalize_or_zero();
    (forward, right, up)
}

fn wrap_angles(yaw: &mut f32, pitch: &mut f32) {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    if yaw.is_finite() {
        *yaw = (*yaw + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
    if pitch.is_finite() {
        *pitch = (*pitch + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
}

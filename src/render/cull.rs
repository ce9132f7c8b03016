//! Distance + frustum visibility filter for the "draw all" pass.

use crate::scene::Aabb;
use glam::{Mat4, Vec3, Vec4};

/// Half-space `normal · p + d >= 0`, normal pointing into the frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    fn from_coefficients(v: Vec4) -> Self {
        let normal = v.truncate();
        let len = normal.length();
        if len > 1e-12 {
            Self {
                normal: normal / len,
                d: v.w / len,
            }
        } else {
            Self { normal, d: v.w }
        }
    }

    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the six planes from an OpenGL-style (NDC z in [-1, 1]) view-projection matrix.
    pub fn from_view_projection(m: &Mat4) -> Self {
        let (r0, r1, r2, r3) = (m.row(0), m.row(1), m.row(2), m.row(3));
        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r3 + r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// Rejects the box as soon as it lies fully outside one plane.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            let positive = Vec3::select(plane.normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            if plane.signed_distance(positive) < 0.0 {
                return false;
            }
        }
        true
    }
}

pub fn is_visible(
    bounds: &Aabb,
    frustum: &Frustum,
    camera_position: Vec3,
    max_distance: f32,
) -> bool {
    (bounds.center() - camera_position).length_squared() < max_distance * max_distance
        && frustum.intersects_aabb(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::camera::{Projection, ViewCamera};
    use crate::scene::{Shape, ShapeGeometry, ShapeId, ShapeTransform};
    use glam::Vec2;

    fn camera() -> ViewCamera {
        ViewCamera::look_at(
            Vec3::ZERO,
            Vec3::NEG_Z,
            Vec3::Y,
            Projection::Perspective {
                fov_y: 90f32.to_radians(),
                near: 0.1,
                far: 100.0,
            },
            Vec2::new(100.0, 100.0),
        )
    }

    fn unit_box_at(center: Vec3) -> Aabb {
        Aabb::new(center - Vec3::splat(0.5), center + Vec3::splat(0.5))
    }

    #[test]
    fn box_in_front_is_visible() {
        let cam = camera();
        let bounds = unit_box_at(Vec3::new(0.0, 0.0, -10.0));
        assert!(is_visible(&bounds, &cam.frustum(), cam.position, 50.0));
    }

    #[test]
    fn box_behind_camera_is_rejected() {
        let cam = camera();
        let bounds = unit_box_at(Vec3::new(0.0, 0.0, 10.0));
        assert!(!cam.frustum().intersects_aabb(&bounds));
    }

    #[test]
    fn box_beyond_max_distance_is_rejected() {
        let cam = camera();
        let bounds = unit_box_at(Vec3::new(0.0, 0.0, -60.0));
        assert!(cam.frustum().intersects_aabb(&bounds));
        assert!(!is_visible(&bounds, &cam.frustum(), cam.position, 50.0));
    }

    #[test]
    fn box_straddling_side_plane_is_visible() {
        let cam = camera();
        // 90° fov: the right plane passes through x = 10 at z = -10.
        let bounds = unit_box_at(Vec3::new(10.3, 0.0, -10.0));
        assert!(cam.frustum().intersects_aabb(&bounds));
        let outside = unit_box_at(Vec3::new(12.0, 0.0, -10.0));
        assert!(!cam.frustum().intersects_aabb(&outside));
    }

    #[test]
    fn stretched_sphere_reaching_into_view_is_visible() {
        let cam = camera();
        let sphere = Shape {
            id: ShapeId(1),
            name: "Stretched".to_string(),
            geometry: ShapeGeometry::Sphere {
                center: [0.0; 3],
                radius: 1.0,
            },
            transform: ShapeTransform {
                position: [12.5, 0.0, -10.0],
                rotation_deg: [0.0; 3],
                scale: [1.0, 8.0, 1.0],
            },
            enabled: true,
            is_trigger: false,
            material: None,
        };
        assert!(is_visible(&sphere.world_bounds(), &cam.frustum(), cam.position, 50.0));
    }

    #[test]
    fn zero_max_distance_hides_everything() {
        let cam = camera();
        let frustum = cam.frustum();
        for z in [-0.2f32, -1.0, -5.0, -40.0] {
            let bounds = unit_box_at(Vec3::new(0.0, 0.0, z));
            assert!(!is_visible(&bounds, &frustum, cam.position, 0.0));
        }
        // Independent of frustum shape: a degenerate frustum that accepts everything.
        let open = Frustum {
            planes: [Plane {
                normal: Vec3::ZERO,
                d: 1.0,
            }; 6],
        };
        assert!(!is_visible(&unit_box_at(Vec3::ZERO), &open, Vec3::ZERO, 0.0));
    }
}

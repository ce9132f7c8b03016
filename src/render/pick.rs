//! Ray picking against the collider set.
//!
//! Hosts that own a physics scene implement [`SceneQuery`] on top of their own
//! raycast; [`SceneState`] ships an analytic implementation that intersects
//! each collider in its local space, so non-uniform scale is exact.

use crate::palette::{Palette, PaletteEntry};
use crate::scene::{Aabb, MaterialLibrary, SceneState, Shape, ShapeGeometry, ShapeId};
use glam::Vec3;

/// Search distance of the cursor pick ray, independent of the draw-all distance.
pub const PICK_DISTANCE: f32 = 1000.0;

const EPSILON: f32 = 1e-7;

/// World-space ray with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub shape: ShapeId,
    pub point: Vec3,
    pub distance: f32,
}

/// Scene collaborator: shape enumeration, lookup and nearest-hit raycast.
pub trait SceneQuery {
    fn enumerate_shapes(&self) -> Vec<&Shape>;
    fn shape(&self, id: ShapeId) -> Option<&Shape>;
    fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape>;
    fn materials(&self) -> &MaterialLibrary;
    /// Nearest enabled, non-trigger shape hit within `max_distance`.
    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<PickHit>;
}

impl SceneQuery for SceneState {
    fn enumerate_shapes(&self) -> Vec<&Shape> {
        self.shapes().iter().collect()
    }

    fn shape(&self, id: ShapeId) -> Option<&Shape> {
        SceneState::shape(self, id)
    }

    fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        SceneState::shape_mut(self, id)
    }

    fn materials(&self) -> &MaterialLibrary {
        SceneState::materials(self)
    }

    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<PickHit> {
        if ray.direction == Vec3::ZERO {
            return None;
        }
        let mut best: Option<PickHit> = None;
        for shape in self.shapes().iter().filter(|shape| shape.is_solid()) {
            let Some(distance) = intersect_shape(ray, shape) else {
                continue;
            };
            if distance > max_distance {
                continue;
            }
            if best.as_ref().map_or(true, |b| distance < b.distance) {
                best = Some(PickHit {
                    shape: shape.id,
                    point: ray.at(distance),
                    distance,
                });
            }
        }
        best
    }
}

/// First 3D palette entry whose material is the shape's material.
pub fn resolve_entry<'p>(
    palette: Option<&'p Palette>,
    shape: &Shape,
) -> Option<(usize, &'p PaletteEntry)> {
    palette?.find_by_material(shape.material)
}

/// Distance along `ray` to the first surface of `shape` in front of the origin.
pub fn intersect_shape(ray: &Ray, shape: &Shape) -> Option<f32> {
    let matrix = shape.transform.matrix();
    if matrix.determinant().abs() < EPSILON {
        return None;
    }
    let inverse = matrix.inverse();
    // Affine map: t is preserved as long as the local direction is not renormalised.
    let origin = inverse.transform_point3(ray.origin);
    let direction = inverse.transform_vector3(ray.direction);

    match &shape.geometry {
        ShapeGeometry::Box {
            center,
            half_extents,
        } => {
            let c = Vec3::from_array(*center);
            let h = Vec3::from_array(*half_extents).abs();
            ray_aabb(origin, direction, &Aabb::new(c - h, c + h))
        }
        ShapeGeometry::Sphere { center, radius } => {
            ray_sphere(origin, direction, Vec3::from_array(*center), radius.abs())
        }
        ShapeGeometry::Capsule {
            center,
            height,
            radius,
            axis,
        } => {
            let r = radius.abs();
            let half = (height.abs() * 0.5 - r).max(0.0);
            let c = Vec3::from_array(*center);
            let a = c + axis.unit() * half;
            let b = c - axis.unit() * half;
            ray_capsule(origin, direction, a, b, r)
        }
        ShapeGeometry::Mesh { mesh } => {
            let mesh = mesh.as_ref()?;
            mesh.triangles()
                .filter_map(|[v0, v1, v2]| ray_triangle(origin, direction, v0, v1, v2))
                .reduce(f32::min)
        }
    }
}

/// Slab test; `None` when the box is behind the origin or the origin is inside.
fn ray_aabb(origin: Vec3, direction: Vec3, aabb: &Aabb) -> Option<f32> {
    let inv_dir = direction.recip();
    let t1 = (aabb.min - origin) * inv_dir;
    let t2 = (aabb.max - origin) * inv_dir;
    let tmin = t1.min(t2).max_element();
    let tmax = t1.max(t2).min_element();

    if tmax < 0.0 || tmin > tmax || tmin < 0.0 {
        return None;
    }
    Some(tmin)
}

fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let a = direction.length_squared();
    let b = oc.dot(direction);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - a * c;
    if a < EPSILON || disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()) / a;
    (t >= 0.0).then_some(t)
}

// Capsule = swept sphere around segment a-b.
fn ray_capsule(origin: Vec3, direction: Vec3, a: Vec3, b: Vec3, radius: f32) -> Option<f32> {
    let ba = b - a;
    let baba = ba.length_squared();
    if baba < EPSILON {
        return ray_sphere(origin, direction, a, radius);
    }

    let oa = origin - a;
    let bard = ba.dot(direction);
    let baoa = ba.dot(oa);
    let rdoa = direction.dot(oa);
    let rdrd = direction.length_squared();
    let oaoa = oa.length_squared();

    let mut best: Option<f32> = None;
    let qa = baba * rdrd - bard * bard;
    if qa.abs() > EPSILON {
        let qb = baba * rdoa - baoa * bard;
        let qc = baba * oaoa - baoa * baoa - radius * radius * baba;
        let h = qb * qb - qa * qc;
        if h >= 0.0 {
            let t = (-qb - h.sqrt()) / qa;
            let y = baoa + t * bard;
            if t >= 0.0 && y > 0.0 && y < baba {
                best = Some(t);
            }
        }
    }

    for cap in [a, b] {
        if let Some(t) = ray_sphere(origin, direction, cap, radius) {
            if best.map_or(true, |current| t < current) {
                best = Some(t);
            }
        }
    }
    best
}

/// Möller-Trumbore ray-triangle intersection, two-sided.
fn ray_triangle(origin: Vec3, direction: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{Color, EntryKind, PaletteEntry};
    use crate::scene::{Axis, MaterialId, ShapeTransform, TriMesh};
    use std::sync::Arc;

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 10.0, z), Vec3::NEG_Y)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn box_hit_distance_respects_scale() {
        let mut scene = SceneState::new();
        let id = scene.add_shape(
            "Crate",
            ShapeGeometry::Box {
                center: [0.0; 3],
                half_extents: [0.5; 3],
            },
            ShapeTransform {
                position: [0.0, 1.0, 0.0],
                rotation_deg: [0.0; 3],
                scale: [1.0, 4.0, 1.0],
            },
            None,
        );
        let hit = scene.raycast(&down_ray(0.0, 0.0), PICK_DISTANCE).unwrap();
        assert_eq!(hit.shape, id);
        assert!(close(hit.distance, 7.0), "distance {}", hit.distance);
        assert!((hit.point - Vec3::new(0.0, 3.0, 0.0)).length() < 1e-4);
        assert!(scene.raycast(&down_ray(0.6, 0.0), PICK_DISTANCE).is_none());
    }

    #[test]
    fn nearest_shape_wins() {
        let mut scene = SceneState::new();
        scene.add_shape(
            "Low",
            ShapeGeometry::Sphere {
                center: [0.0; 3],
                radius: 1.0,
            },
            ShapeTransform::default(),
            None,
        );
        let high = scene.add_shape(
            "High",
            ShapeGeometry::Sphere {
                center: [0.0; 3],
                radius: 1.0,
            },
            ShapeTransform::from_position([0.0, 4.0, 0.0]),
            None,
        );
        let hit = scene.raycast(&down_ray(0.0, 0.0), PICK_DISTANCE).unwrap();
        assert_eq!(hit.shape, high);
        assert!(close(hit.distance, 5.0));
    }

    #[test]
    fn disabled_and_trigger_shapes_are_not_pickable() {
        let mut scene = SceneState::new();
        let top = scene.add_shape(
            "Trigger",
            ShapeGeometry::Sphere {
                center: [0.0; 3],
                radius: 1.0,
            },
            ShapeTransform::from_position([0.0, 4.0, 0.0]),
            None,
        );
        let middle = scene.add_shape(
            "Disabled",
            ShapeGeometry::Sphere {
                center: [0.0; 3],
                radius: 1.0,
            },
            ShapeTransform::from_position([0.0, 2.0, 0.0]),
            None,
        );
        let bottom = scene.add_shape(
            "Floor",
            ShapeGeometry::Box {
                center: [0.0; 3],
                half_extents: [5.0, 0.5, 5.0],
            },
            ShapeTransform::default(),
            None,
        );
        scene.shape_mut(top).unwrap().is_trigger = true;
        scene.shape_mut(middle).unwrap().enabled = false;
        let hit = scene.raycast(&down_ray(0.0, 0.0), PICK_DISTANCE).unwrap();
        assert_eq!(hit.shape, bottom);
    }

    #[test]
    fn hits_beyond_max_distance_are_ignored() {
        let mut scene = SceneState::new();
        scene.add_shape(
            "Far",
            ShapeGeometry::Sphere {
                center: [0.0; 3],
                radius: 1.0,
            },
            ShapeTransform::from_position([0.0, 0.0, -1500.0]),
            None,
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(scene.raycast(&ray, PICK_DISTANCE).is_none());
        assert!(scene.raycast(&ray, 2000.0).is_some());
    }

    #[test]
    fn capsule_hits_side_and_caps() {
        let mut scene = SceneState::new();
        scene.add_shape(
            "Pill",
            ShapeGeometry::Capsule {
                center: [0.0; 3],
                height: 4.0,
                radius: 0.5,
                axis: Axis::Y,
            },
            ShapeTransform::default(),
            None,
        );
        let side = Ray::new(Vec3::new(-10.0, 1.0, 0.0), Vec3::X);
        assert!(close(scene.raycast(&side, PICK_DISTANCE).unwrap().distance, 9.5));

        let top = down_ray(0.0, 0.0);
        assert!(close(scene.raycast(&top, PICK_DISTANCE).unwrap().distance, 8.0));

        let miss = Ray::new(Vec3::new(-10.0, 2.3, 0.0), Vec3::X);
        assert!(scene.raycast(&miss, PICK_DISTANCE).is_none());
    }

    #[test]
    fn mesh_hit_uses_nearest_triangle() {
        let mut scene = SceneState::new();
        let mesh = TriMesh::new(
            vec![
                [-1.0, 0.0, -1.0],
                [1.0, 0.0, -1.0],
                [0.0, 0.0, 1.0],
                [-1.0, 2.0, -1.0],
                [1.0, 2.0, -1.0],
                [0.0, 2.0, 1.0],
            ],
            vec![0, 1, 2, 3, 4, 5],
        );
        scene.add_shape(
            "Stack",
            ShapeGeometry::Mesh {
                mesh: Some(Arc::new(mesh)),
            },
            ShapeTransform::default(),
            None,
        );
        let hit = scene.raycast(&down_ray(0.0, 0.0), PICK_DISTANCE).unwrap();
        assert!(close(hit.distance, 8.0));
    }

    #[test]
    fn ray_starting_inside_shape_does_not_hit_it() {
        let mut scene = SceneState::new();
        scene.add_shape(
            "Room",
            ShapeGeometry::Box {
                center: [0.0; 3],
                half_extents: [5.0; 3],
            },
            ShapeTransform::default(),
            None,
        );
        assert!(scene.raycast(&Ray::new(Vec3::ZERO, Vec3::X), PICK_DISTANCE).is_none());
    }

    #[test]
    fn resolve_entry_uses_palette_identity() {
        let mut scene = SceneState::new();
        let ice = scene.materials_mut().add("Ice", 0.02, 0.02, 0.0);
        let id = scene.add_shape(
            "Floor",
            ShapeGeometry::Box {
                center: [0.0; 3],
                half_extents: [1.0; 3],
            },
            ShapeTransform::default(),
            Some(ice),
        );
        let shape = scene.shape(id).unwrap();

        let mut palette = Palette::new();
        palette.push(EntryKind::Shape3D, PaletteEntry::new(Some(MaterialId(99)), Color::RED));
        palette.push(EntryKind::Shape3D, PaletteEntry::new(Some(ice), Color::BLUE));

        let (index, entry) = resolve_entry(Some(&palette), shape).unwrap();
        assert_eq!(index, 1);
        assert_eq!(entry.color, Color::BLUE);
        assert!(resolve_entry(None, shape).is_none());
    }
}

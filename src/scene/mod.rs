pub mod serialization;

use glam::{Mat4, Vec3};
use std::sync::Arc;

/// Stable handle of a collider shape inside a [`SceneState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ShapeId(pub u32);

/// Identity of a physics material resource. Two references are the same
/// material iff their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MaterialId(pub u32);

/// Physics material resource. The overlay only cares about identity and name;
/// the surface parameters are carried for the host's inspector.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhysicsMaterial {
    pub id: MaterialId,
    pub name: String,
    pub dynamic_friction: f32,
    pub static_friction: f32,
    pub bounciness: f32,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct MaterialLibrary {
    materials: Vec<PhysicsMaterial>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self {
            materials: Vec::new(),
        }
    }

    pub fn add(
        &mut self,
        name: &str,
        dynamic_friction: f32,
        static_friction: f32,
        bounciness: f32,
    ) -> MaterialId {
        let next = self
            .materials
            .iter()
            .map(|material| material.id.0 + 1)
            .max()
            .unwrap_or(1);
        let id = MaterialId(next);
        self.materials.push(PhysicsMaterial {
            id,
            name: name.to_string(),
            dynamic_friction,
            static_friction,
            bounciness,
        });
        id
    }

    pub fn get(&self, id: MaterialId) -> Option<&PhysicsMaterial> {
        self.materials.iter().find(|material| material.id == id)
    }

    pub fn materials(&self) -> &[PhysicsMaterial] {
        &self.materials
    }

    /// Display name of a material reference; unset or dangling references read as "null".
    pub fn display_name(&self, id: Option<MaterialId>) -> &str {
        id.and_then(|id| self.get(id))
            .map(|material| material.name.as_str())
            .unwrap_or("null")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// The two axes orthogonal to this one, in X/Y/Z order.
    pub fn others(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }
}

/// Indexed triangle mesh in the shape's local space.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TriMesh {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl TriMesh {
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.len() < 3
    }

    /// Triangles with out-of-range indices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(move |tri| {
            let a = self.positions.get(tri[0] as usize)?;
            let b = self.positions.get(tri[1] as usize)?;
            let c = self.positions.get(tri[2] as usize)?;
            Some([Vec3::from_array(*a), Vec3::from_array(*b), Vec3::from_array(*c)])
        })
    }

    pub fn local_bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().map(|p| Vec3::from_array(*p)))
    }
}

/// Kind-specific local geometry of a collider.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ShapeGeometry {
    Box {
        center: [f32; 3],
        half_extents: [f32; 3],
    },
    Capsule {
        center: [f32; 3],
        height: f32,
        radius: f32,
        axis: Axis,
    },
    Sphere {
        center: [f32; 3],
        radius: f32,
    },
    Mesh {
        mesh: Option<Arc<TriMesh>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Box,
    Capsule,
    Sphere,
    Mesh,
}

impl ShapeGeometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeGeometry::Box { .. } => ShapeKind::Box,
            ShapeGeometry::Capsule { .. } => ShapeKind::Capsule,
            ShapeGeometry::Sphere { .. } => ShapeKind::Sphere,
            ShapeGeometry::Mesh { .. } => ShapeKind::Mesh,
        }
    }

    fn local_bounds(&self) -> Option<Aabb> {
        match self {
            ShapeGeometry::Box {
                center,
                half_extents,
            } => {
                let c = Vec3::from_array(*center);
                let h = Vec3::from_array(*half_extents).abs();
                Some(Aabb::new(c - h, c + h))
            }
            ShapeGeometry::Capsule {
                center,
                height,
                radius,
                axis,
            } => {
                let c = Vec3::from_array(*center);
                let r = radius.abs();
                let mut h = Vec3::splat(r);
                h[axis.index()] = (height.abs() * 0.5).max(r);
                Some(Aabb::new(c - h, c + h))
            }
            ShapeGeometry::Sphere { center, radius } => {
                let c = Vec3::from_array(*center);
                let h = Vec3::splat(radius.abs());
                Some(Aabb::new(c - h, c + h))
            }
            ShapeGeometry::Mesh { mesh } => mesh.as_ref().and_then(|mesh| mesh.local_bounds()),
        }
    }
}

/// World placement of a collider: translation, Z·Y·X euler rotation in degrees, scale.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeTransform {
    pub position: [f32; 3],
    pub rotation_deg: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for ShapeTransform {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation_deg: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

impl ShapeTransform {
    pub fn from_position(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array(&compose_transform_matrix(
            self.position,
            self.rotation_deg,
            self.scale,
        ))
    }

    /// Per-axis world scale magnitude.
    pub fn lossy_scale(&self) -> Vec3 {
        Vec3::from_array(self.scale).abs()
    }

    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.matrix().transform_point3(local)
    }

    /// World centre and radius of a sphere as drawn: radius times the largest scale.
    pub fn sphere_outline(&self, center: Vec3, radius: f32) -> (Vec3, f32) {
        (
            self.transform_point(center),
            radius.abs() * self.lossy_scale().max_element(),
        )
    }

    /// World cap centres and radius of a capsule as drawn.
    pub fn capsule_outline(
        &self,
        center: Vec3,
        height: f32,
        radius: f32,
        axis: Axis,
    ) -> CapsuleOutline {
        let scale = self.lossy_scale();
        let (a, b) = axis.others();
        let world_radius = radius * scale[a.index()].max(scale[b.index()]);

        if height < radius * 2.0 {
            return CapsuleOutline::Sphere {
                center: self.transform_point(center),
                radius: world_radius,
            };
        }

        let along = scale[axis.index()];
        let offset = if along > 0.0 {
            height * 0.5 - world_radius / along
        } else {
            0.0
        };
        let matrix = self.matrix();
        CapsuleOutline::Body {
            top: matrix.transform_point3(center + axis.unit() * offset),
            bottom: matrix.transform_point3(center - axis.unit() * offset),
            radius: world_radius,
        }
    }
}

/// Capsule silhouette in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapsuleOutline {
    /// Height below two radii: the caps overlap and the capsule reads as a sphere.
    Sphere { center: Vec3, radius: f32 },
    Body { top: Vec3, bottom: Vec3, radius: f32 },
}

impl CapsuleOutline {
    pub fn bounds(&self) -> Aabb {
        match *self {
            CapsuleOutline::Sphere { center, radius } => Aabb::around(center, radius),
            CapsuleOutline::Body {
                top,
                bottom,
                radius,
            } => Aabb::around(top, radius).union(&Aabb::around(bottom, radius)),
        }
    }
}

/// Collider shape descriptor as seen by the overlay.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub name: String,
    pub geometry: ShapeGeometry,
    pub transform: ShapeTransform,
    pub enabled: bool,
    pub is_trigger: bool,
    pub material: Option<MaterialId>,
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    /// Disabled and trigger shapes are never drawn or picked.
    pub fn is_solid(&self) -> bool {
        self.enabled && !self.is_trigger
    }

    /// Conservative world-space bounds: the transformed local bounds, grown to
    /// cover the sphere and capsule outlines the overlay draws.
    pub fn world_bounds(&self) -> Aabb {
        let matrix = self.transform.matrix();
        let bounds = match self.geometry.local_bounds() {
            Some(local) => local.transformed(&matrix),
            None => {
                let origin = matrix.transform_point3(Vec3::ZERO);
                Aabb::new(origin, origin)
            }
        };
        match &self.geometry {
            ShapeGeometry::Sphere { center, radius } => {
                let (center, radius) = self
                    .transform
                    .sphere_outline(Vec3::from_array(*center), *radius);
                bounds.union(&Aabb::around(center, radius))
            }
            ShapeGeometry::Capsule {
                center,
                height,
                radius,
                axis,
            } => {
                let outline = self.transform.capsule_outline(
                    Vec3::from_array(*center),
                    *height,
                    radius.abs(),
                    *axis,
                );
                bounds.union(&outline.bounds())
            }
            ShapeGeometry::Box { .. } | ShapeGeometry::Mesh { .. } => bounds,
        }
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn around(center: Vec3, radius: f32) -> Self {
        let r = Vec3::splat(radius.abs());
        Self::new(center - r, center + r)
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::new(first, first);
        for p in iter {
            bounds.min = bounds.min.min(p);
            bounds.max = bounds.max.max(p);
        }
        Some(bounds)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half size along each axis.
    pub fn extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, b.y, b.z),
            Vec3::new(a.x, b.y, b.z),
        ]
    }

    pub fn contains_point(&self, p: Vec3, eps: f32) -> bool {
        p.cmpge(self.min - Vec3::splat(eps)).all() && p.cmple(self.max + Vec3::splat(eps)).all()
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        let corners = self.corners().map(|c| matrix.transform_point3(c));
        // Eight corners, never empty.
        Aabb::from_points(corners).unwrap_or(*self)
    }
}

/// Collider set plus the material resources they reference.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SceneState {
    materials: MaterialLibrary,
    shapes: Vec<Shape>,
}

impl SceneState {
    pub fn new() -> Self {
        Self {
            materials: MaterialLibrary::new(),
            shapes: Vec::new(),
        }
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialLibrary {
        &mut self.materials
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id == id)
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|shape| shape.id == id)
    }

    pub fn add_shape(
        &mut self,
        name: &str,
        geometry: ShapeGeometry,
        transform: ShapeTransform,
        material: Option<MaterialId>,
    ) -> ShapeId {
        let id = ShapeId(
            self.shapes
                .iter()
                .map(|shape| shape.id.0 + 1)
                .max()
                .unwrap_or(1),
        );
        self.shapes.push(Shape {
            id,
            name: name.to_string(),
            geometry,
            transform,
            enabled: true,
            is_trigger: false,
            material,
        });
        id
    }

    /// Union of every shape's world bounds, for framing the camera.
    pub fn bounds(&self) -> Option<Aabb> {
        self.shapes
            .iter()
            .map(Shape::world_bounds)
            .reduce(|acc, bounds| acc.union(&bounds))
    }
}

pub fn compose_transform_matrix(
    position: [f32; 3],
    rotation_deg: [f32; 3],
    scale: [f32; 3],
) -> [f32; 16] {
    let (rx, ry, rz) = (
        rotation_deg[0].to_radians(),
        rotation_deg[1].to_radians(),
        rotation_deg[2].to_radians(),
    );
    let (sx, cx) = rx.sin_cos();
    let (sy, cy) = ry.sin_cos();
    let (sz, cz) = rz.sin_cos();

    // Rotation order: Z (roll) * Y (yaw) * X (pitch)
    let r00 = cz * cy;
    let r01 = cz * sy * sx - sz * cx;
    let r02 = cz * sy * cx + sz * sx;
    let r10 = sz * cy;
    let r11 = sz * sy * sx + cz * cx;
    let r12 = sz * sy * cx - cz * sx;
    let r20 = -sy;
    let r21 = cy * sx;
    let r22 = cy * cx;

    let (sx, sy, sz) = (scale[0], scale[1], scale[2]);
    [
        r00 * sx,
        r10 * sx,
        r20 * sx,
        0.0,
        r01 * sy,
        r11 * sy,
        r21 * sy,
        0.0,
        r02 * sz,
        r12 * sz,
        r22 * sz,
        0.0,
        position[0],
        position[1],
        position[2],
        1.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn transform_matches_glam_zyx_composition() {
        let transform = ShapeTransform {
            position: [1.0, -2.0, 3.0],
            rotation_deg: [30.0, 45.0, 60.0],
            scale: [2.0, 1.0, 0.5],
        };
        let rotation = Quat::from_rotation_z(60f32.to_radians())
            * Quat::from_rotation_y(45f32.to_radians())
            * Quat::from_rotation_x(30f32.to_radians());
        let expected = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 1.0, 0.5),
            rotation,
            Vec3::new(1.0, -2.0, 3.0),
        );
        let p = Vec3::new(0.3, -0.7, 1.1);
        assert!(approx(transform.transform_point(p), expected.transform_point3(p)));
    }

    #[test]
    fn lossy_scale_ignores_mirroring() {
        let transform = ShapeTransform {
            scale: [-2.0, 1.0, -0.5],
            ..ShapeTransform::default()
        };
        assert_eq!(transform.lossy_scale(), Vec3::new(2.0, 1.0, 0.5));
    }

    #[test]
    fn world_bounds_contain_rotated_box_corners() {
        let shape = Shape {
            id: ShapeId(1),
            name: "Crate".to_string(),
            geometry: ShapeGeometry::Box {
                center: [0.5, 0.0, 0.0],
                half_extents: [1.0, 0.5, 2.0],
            },
            transform: ShapeTransform {
                position: [3.0, 1.0, -1.0],
                rotation_deg: [10.0, 35.0, -20.0],
                scale: [1.5, 2.0, 0.75],
            },
            enabled: true,
            is_trigger: false,
            material: None,
        };
        let bounds = shape.world_bounds();
        let local = Aabb::new(Vec3::new(-0.5, -0.5, -2.0), Vec3::new(1.5, 0.5, 2.0));
        for corner in local.corners() {
            assert!(bounds.contains_point(shape.transform.transform_point(corner), 1e-4));
        }
    }

    #[test]
    fn world_bounds_contain_capsule_tips() {
        let shape = Shape {
            id: ShapeId(1),
            name: "Pill".to_string(),
            geometry: ShapeGeometry::Capsule {
                center: [0.0, 0.0, 0.0],
                height: 4.0,
                radius: 0.5,
                axis: Axis::Z,
            },
            transform: ShapeTransform {
                position: [0.0, 2.0, 0.0],
                rotation_deg: [0.0, 90.0, 0.0],
                scale: [1.0, 1.0, 3.0],
            },
            enabled: true,
            is_trigger: false,
            material: None,
        };
        let bounds = shape.world_bounds();
        for tip in [Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, -2.0)] {
            assert!(bounds.contains_point(shape.transform.transform_point(tip), 1e-4));
        }
    }

    fn placed(geometry: ShapeGeometry, position: [f32; 3], scale: [f32; 3]) -> Shape {
        Shape {
            id: ShapeId(1),
            name: "Scaled".to_string(),
            geometry,
            transform: ShapeTransform {
                position,
                rotation_deg: [0.0; 3],
                scale,
            },
            enabled: true,
            is_trigger: false,
            material: None,
        }
    }

    #[test]
    fn sphere_bounds_cover_largest_scale_radius() {
        let shape = placed(
            ShapeGeometry::Sphere {
                center: [0.0; 3],
                radius: 1.0,
            },
            [12.5, 0.0, -10.0],
            [1.0, 8.0, 1.0],
        );
        let bounds = shape.world_bounds();
        for offset in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
            let p = Vec3::new(12.5, 0.0, -10.0) + offset * 8.0;
            assert!(bounds.contains_point(p, 1e-4), "{:?} outside {:?}", p, bounds);
        }
    }

    #[test]
    fn capsule_bounds_cover_orthogonal_scale_radius() {
        let shape = placed(
            ShapeGeometry::Capsule {
                center: [0.0; 3],
                height: 4.0,
                radius: 1.0,
                axis: Axis::Y,
            },
            [0.0; 3],
            [3.0, 1.0, 1.0],
        );
        let bounds = shape.world_bounds();
        assert!(bounds.contains_point(Vec3::new(0.0, 0.0, 3.0), 1e-4));
        assert!(bounds.contains_point(Vec3::new(0.0, 0.0, -3.0), 1e-4));
        assert!(bounds.contains_point(Vec3::new(0.0, 2.0, 0.0), 1e-4));

        let degenerate = placed(
            ShapeGeometry::Capsule {
                center: [0.0; 3],
                height: 1.0,
                radius: 1.0,
                axis: Axis::Y,
            },
            [0.0; 3],
            [1.0, 5.0, 2.0],
        );
        let bounds = degenerate.world_bounds();
        assert!(bounds.contains_point(Vec3::new(0.0, 0.0, 2.0), 1e-4));
        assert!(bounds.contains_point(Vec3::new(2.0, 0.0, 0.0), 1e-4));
        assert!(bounds.contains_point(Vec3::new(0.0, 5.0, 0.0), 1e-4));
    }

    #[test]
    fn material_display_name_falls_back_to_null() {
        let mut library = MaterialLibrary::new();
        let ice = library.add("Ice", 0.02, 0.02, 0.0);
        assert_eq!(library.display_name(Some(ice)), "Ice");
        assert_eq!(library.display_name(None), "null");
        assert_eq!(library.display_name(Some(MaterialId(999))), "null");
    }

    #[test]
    fn shape_ids_are_unique_and_resolvable() {
        let mut scene = SceneState::new();
        let a = scene.add_shape(
            "A",
            ShapeGeometry::Sphere {
                center: [0.0; 3],
                radius: 1.0,
            },
            ShapeTransform::default(),
            None,
        );
        let b = scene.add_shape(
            "B",
            ShapeGeometry::Sphere {
                center: [0.0; 3],
                radius: 1.0,
            },
            ShapeTransform::from_position([5.0, 0.0, 0.0]),
            None,
        );
        assert_ne!(a, b);
        assert_eq!(scene.shape(b).map(|s| s.name.as_str()), Some("B"));
        let bounds = scene.bounds().unwrap();
        assert!(approx(bounds.min, Vec3::new(-1.0, -1.0, -1.0)));
        assert!(approx(bounds.max, Vec3::new(6.0, 1.0, 1.0)));
    }
}

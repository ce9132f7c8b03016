use crate::palette::Color;
use crate::render::camera::{Projection, ViewCamera};
use crate::render::{DrawSurface, FlatMaterial, UNLIT_COLOR_SHADER};
use crate::scene::{Axis, CapsuleOutline, Shape, ShapeGeometry, ShapeTransform, TriMesh};
use glam::{Mat4, Vec3};

const PARALLEL_EPSILON: f32 = 1e-6;

/// Emits schematic wire outlines for collider shapes.
///
/// The unlit shader for mesh wireframes is looked up on whichever surface is
/// being drawn to, so one renderer can serve several surfaces.
#[derive(Debug, Default, Clone, Copy)]
pub struct WireframeRenderer;

impl WireframeRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Draws `shape` in `color`. Disabled and trigger shapes emit nothing.
    pub fn render(
        &self,
        shape: &Shape,
        color: Color,
        camera: Option<&ViewCamera>,
        surface: &mut dyn DrawSurface,
    ) {
        if !shape.is_solid() {
            return;
        }
        match &shape.geometry {
            ShapeGeometry::Box {
                center,
                half_extents,
            } => draw_box(
                &shape.transform,
                Vec3::from_array(*center),
                Vec3::from_array(*half_extents),
                color,
                surface,
            ),
            ShapeGeometry::Capsule {
                center,
                height,
                radius,
                axis,
            } => draw_capsule(
                &shape.transform,
                Vec3::from_array(*center),
                *height,
                *radius,
                *axis,
                color,
                surface,
            ),
            ShapeGeometry::Sphere { center, radius } => draw_sphere(
                &shape.transform,
                Vec3::from_array(*center),
                *radius,
                color,
                camera,
                surface,
            ),
            ShapeGeometry::Mesh { mesh } => {
                self.draw_mesh(&shape.transform, mesh.as_deref(), color, surface)
            }
        }
    }

    fn draw_mesh(
        &self,
        transform: &ShapeTransform,
        mesh: Option<&TriMesh>,
        color: Color,
        surface: &mut dyn DrawSurface,
    ) {
        let Some(shader) = surface.find_shader(UNLIT_COLOR_SHADER) else {
            log::debug!("no '{}' shader, skipping mesh collider", UNLIT_COLOR_SHADER);
            return;
        };
        let Some(mesh) = mesh.filter(|mesh| !mesh.is_empty()) else {
            return;
        };

        let material = FlatMaterial { shader, color };
        surface.set_wireframe(true);
        surface.draw_mesh(mesh, &transform.matrix(), &material);
        surface.set_wireframe(false);
    }
}

fn draw_box(
    transform: &ShapeTransform,
    center: Vec3,
    half_extents: Vec3,
    color: Color,
    surface: &mut dyn DrawSurface,
) {
    surface.wire_cube(&transform.matrix(), center, half_extents * 2.0, color);
}

fn draw_three_discs(center: Vec3, radius: f32, color: Color, surface: &mut dyn DrawSurface) {
    surface.wire_disc(center, Vec3::Z, radius, color);
    surface.wire_disc(center, Vec3::X, radius, color);
    surface.wire_disc(center, Vec3::Y, radius, color);
}

fn draw_sphere(
    transform: &ShapeTransform,
    center: Vec3,
    radius: f32,
    color: Color,
    camera: Option<&ViewCamera>,
    surface: &mut dyn DrawSurface,
) {
    let (world_center, radius) = transform.sphere_outline(center, radius);
    draw_three_discs(world_center, radius, color, surface);

    let Some(camera) = camera else {
        return;
    };
    match camera.projection {
        Projection::Orthographic { .. } => {
            surface.wire_disc(world_center, camera.forward, radius, color);
        }
        Projection::Perspective { .. } => {
            if let Some((disc_center, normal, disc_radius)) =
                silhouette_disc(world_center, radius, camera.position)
            {
                surface.wire_disc(disc_center, normal, disc_radius, color);
            }
        }
    }
}

/// Outline circle of a sphere as seen from `eye`: `(center, normal, radius)`.
///
/// `None` when the eye is inside or on the sphere.
pub fn silhouette_disc(center: Vec3, radius: f32, eye: Vec3) -> Option<(Vec3, Vec3, f32)> {
    let normal = center - eye;
    let d2 = normal.length_squared();
    let r2 = radius * radius;
    if d2 <= r2 {
        return None;
    }
    let disc_radius = (r2 - r2 * r2 / d2).sqrt();
    Some((center - r2 * normal / d2, normal, disc_radius))
}

fn draw_capsule(
    transform: &ShapeTransform,
    center: Vec3,
    height: f32,
    radius: f32,
    axis: Axis,
    color: Color,
    surface: &mut dyn DrawSurface,
) {
    let (world_top, world_bottom, world_radius) =
        match transform.capsule_outline(center, height, radius, axis) {
            CapsuleOutline::Sphere { center, radius } => {
                draw_three_discs(center, radius, color, surface);
                return;
            }
            CapsuleOutline::Body {
                top,
                bottom,
                radius,
            } => (top, bottom, radius),
        };

    let matrix = transform.matrix();
    let up = capsule_up(&matrix, world_top - world_bottom, axis);
    let mut reference = Vec3::Y;
    if up.dot(reference).abs() > 1.0 - PARALLEL_EPSILON {
        reference = Vec3::Z;
    }
    let right = up.cross(-reference).normalize_or_zero();
    let forward = up.cross(-right).normalize_or_zero();

    surface.wire_disc(world_top, up, world_radius, color);
    surface.wire_disc(world_bottom, up, world_radius, color);

    surface.wire_arc(world_top, forward, right, 180.0, world_radius, color);
    surface.wire_arc(world_top, -right, forward, 180.0, world_radius, color);
    surface.wire_arc(world_bottom, -forward, right, 180.0, world_radius, color);
    surface.wire_arc(world_bottom, right, forward, 180.0, world_radius, color);

    for side in [right, -right, forward, -forward] {
        let offset = side * world_radius;
        surface.line(world_top + offset, world_bottom + offset, color);
    }
}

// Unit capsule axis in world space; falls back to the transformed local axis
// when the cylinder section has collapsed to a point.
fn capsule_up(matrix: &Mat4, span: Vec3, axis: Axis) -> Vec3 {
    if span.length_squared() > PARALLEL_EPSILON {
        return span.normalize();
    }
    let transformed = matrix.transform_vector3(axis.unit());
    if transformed.length_squared() > PARALLEL_EPSILON {
        transformed.normalize()
    } else {
        Vec3::Y
    }
}

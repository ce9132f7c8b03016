pub mod camera;
pub mod cull;
pub mod lines;
pub mod pick;
mod wireframe;

pub use camera::{CameraController, Projection, ViewCamera};
pub use cull::{is_visible, Frustum, Plane};
pub use lines::{LineBatch, LineVertex};
pub use pick::{resolve_entry, PickHit, Ray, SceneQuery, PICK_DISTANCE};
pub use wireframe::{silhouette_disc, WireframeRenderer};

use crate::palette::Color;
use crate::scene::TriMesh;
use glam::{Mat4, Vec3};

/// Name of the flat unlit shader used for mesh wireframes.
pub const UNLIT_COLOR_SHADER: &str = "Unlit/Color";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Flat unlit material: a shader handle plus the colour it is parameterised with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatMaterial {
    pub shader: ShaderId,
    pub color: Color,
}

/// Immediate-mode drawing surface the overlay emits into.
///
/// Discs and arcs are world-space circles: `normal` is the circle's axis,
/// arcs start at `from` and sweep `angle_deg` counter-clockwise around
/// `normal`.
pub trait DrawSurface {
    fn wire_cube(&mut self, transform: &Mat4, center: Vec3, size: Vec3, color: Color);
    fn wire_disc(&mut self, center: Vec3, normal: Vec3, radius: f32, color: Color);
    fn wire_arc(
        &mut self,
        center: Vec3,
        normal: Vec3,
        from: Vec3,
        angle_deg: f32,
        radius: f32,
        color: Color,
    );
    fn line(&mut self, a: Vec3, b: Vec3, color: Color);

    fn find_shader(&mut self, name: &str) -> Option<ShaderId>;
    fn set_wireframe(&mut self, enabled: bool);
    fn draw_mesh(&mut self, mesh: &TriMesh, transform: &Mat4, material: &FlatMaterial);
}

#[derive(Debug, Clone, PartialEq)]
pub enum WirePrimitive {
    Cube {
        transform: Mat4,
        center: Vec3,
        size: Vec3,
        color: Color,
    },
    Disc {
        center: Vec3,
        normal: Vec3,
        radius: f32,
        color: Color,
    },
    Arc {
        center: Vec3,
        normal: Vec3,
        from: Vec3,
        angle_deg: f32,
        radius: f32,
        color: Color,
    },
    Line {
        a: Vec3,
        b: Vec3,
        color: Color,
    },
    Mesh {
        triangles: usize,
        transform: Mat4,
        material: FlatMaterial,
        wireframe: bool,
    },
}

impl WirePrimitive {
    pub fn color(&self) -> Color {
        match self {
            WirePrimitive::Cube { color, .. }
            | WirePrimitive::Disc { color, .. }
            | WirePrimitive::Arc { color, .. }
            | WirePrimitive::Line { color, .. } => *color,
            WirePrimitive::Mesh { material, .. } => material.color,
        }
    }
}

/// Surface that records every primitive; used by hosts that batch their own
/// draw calls and by tests.
#[derive(Debug, Default)]
pub struct PrimitiveRecorder {
    pub primitives: Vec<WirePrimitive>,
    pub wireframe: bool,
    shaders: Vec<String>,
}

impl PrimitiveRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder that can resolve the unlit colour shader.
    pub fn with_unlit_shader() -> Self {
        Self {
            shaders: vec![UNLIT_COLOR_SHADER.to_string()],
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn discs(&self) -> Vec<(Vec3, Vec3, f32)> {
        self.primitives
            .iter()
            .filter_map(|p| match p {
                WirePrimitive::Disc {
                    center,
                    normal,
                    radius,
                    ..
                } => Some((*center, *normal, *radius)),
                _ => None,
            })
            .collect()
    }

    pub fn count_arcs(&self) -> usize {
        self.primitives
            .iter()
            .filter(|p| matches!(p, WirePrimitive::Arc { .. }))
            .count()
    }

    pub fn count_lines(&self) -> usize {
        self.primitives
            .iter()
            .filter(|p| matches!(p, WirePrimitive::Line { .. }))
            .count()
    }
}

impl DrawSurface for PrimitiveRecorder {
    fn wire_cube(&mut self, transform: &Mat4, center: Vec3, size: Vec3, color: Color) {
        self.primitives.push(WirePrimitive::Cube {
            transform: *transform,
            center,
            size,
            color,
        });
    }

    fn wire_disc(&mut self, center: Vec3, normal: Vec3, radius: f32, color: Color) {
        self.primitives.push(WirePrimitive::Disc {
            center,
            normal,
            radius,
            color,
        });
    }

    fn wire_arc(
        &mut self,
        center: Vec3,
        normal: Vec3,
        from: Vec3,
        angle_deg: f32,
        radius: f32,
        color: Color,
    ) {
        self.primitives.push(WirePrimitive::Arc {
            center,
            normal,
            from,
            angle_deg,
            radius,
            color,
        });
    }

    fn line(&mut self, a: Vec3, b: Vec3, color: Color) {
        self.primitives.push(WirePrimitive::Line { a, b, color });
    }

    fn find_shader(&mut self, name: &str) -> Option<ShaderId> {
        self.shaders
            .iter()
            .position(|shader| shader == name)
            .map(|index| ShaderId(index as u32 + 1))
    }

    fn set_wireframe(&mut self, enabled: bool) {
        self.wireframe = enabled;
    }

    fn draw_mesh(&mut self, mesh: &TriMesh, transform: &Mat4, material: &FlatMaterial) {
        self.primitives.push(WirePrimitive::Mesh {
            triangles: mesh.triangles().count(),
            transform: *transform,
            material: *material,
            wireframe: self.wireframe,
        });
    }
}

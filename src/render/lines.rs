//! CPU tessellation of overlay primitives into a coloured line list.

use crate::palette::Color;
use crate::render::{DrawSurface, FlatMaterial, ShaderId, UNLIT_COLOR_SHADER};
use crate::scene::TriMesh;
use glam::{Mat4, Vec3};
use std::collections::HashSet;

const DEFAULT_SEGMENTS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Line-list surface: every two vertices form one segment. Filled mesh draws
/// (wireframe mode off) land in `triangles` instead.
#[derive(Debug)]
pub struct LineBatch {
    vertices: Vec<LineVertex>,
    triangles: Vec<LineVertex>,
    segments: usize,
    unlit_shader: Option<ShaderId>,
    wireframe: bool,
}

impl LineBatch {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            segments: DEFAULT_SEGMENTS,
            unlit_shader: Some(ShaderId(1)),
            wireframe: false,
        }
    }

    /// Batch without a flat shader: mesh colliders are skipped.
    pub fn without_mesh_shader() -> Self {
        Self {
            unlit_shader: None,
            ..Self::new()
        }
    }

    /// Segments used for a full circle.
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments.max(8);
        self
    }

    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[LineVertex] {
        &self.triangles
    }

    pub fn segment_count(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.triangles.clear();
    }

    fn push_segment(&mut self, a: Vec3, b: Vec3, color: Color) {
        let color = color.to_array();
        self.vertices.push(LineVertex {
            position: a.to_array(),
            color,
        });
        self.vertices.push(LineVertex {
            position: b.to_array(),
            color,
        });
    }

    fn push_polyline(&mut self, points: &[Vec3], color: Color) {
        for pair in points.windows(2) {
            self.push_segment(pair[0], pair[1], color);
        }
    }
}

impl Default for LineBatch {
    fn default() -> Self {
        Self::new()
    }
}

// Points on a circle arc; `from` is projected into the circle plane.
fn arc_points(
    center: Vec3,
    normal: Vec3,
    from: Vec3,
    angle_deg: f32,
    radius: f32,
    segments: usize,
) -> Vec<Vec3> {
    let n = normal.normalize_or_zero();
    if n == Vec3::ZERO {
        return Vec::new();
    }
    let mut start = (from - n * from.dot(n)).normalize_or_zero();
    if start == Vec3::ZERO {
        start = n.any_orthonormal_vector();
    }
    let side = n.cross(start);
    let sweep = angle_deg.to_radians();
    let steps = ((segments as f32 * angle_deg.abs() / 360.0).ceil() as usize).max(4);
    (0..=steps)
        .map(|i| {
            let t = sweep * i as f32 / steps as f32;
            center + (start * t.cos() + side * t.sin()) * radius
        })
        .collect()
}

impl DrawSurface for LineBatch {
    fn wire_cube(&mut self, transform: &Mat4, center: Vec3, size: Vec3, color: Color) {
        let h = size * 0.5;
        let corners: Vec<Vec3> = [
            [-1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
            [1.0, 1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
            [1.0, 1.0, 1.0],
            [-1.0, 1.0, 1.0],
        ]
        .iter()
        .map(|s| transform.transform_point3(center + Vec3::from_array(*s) * h))
        .collect();
        #[rustfmt::skip]
        const EDGES: [(usize, usize); 12] = [
            (0, 1), (1, 2), (2, 3), (3, 0),
            (4, 5), (5, 6), (6, 7), (7, 4),
            (0, 4), (1, 5), (2, 6), (3, 7),
        ];
        for (a, b) in EDGES {
            self.push_segment(corners[a], corners[b], color);
        }
    }

    fn wire_disc(&mut self, center: Vec3, normal: Vec3, radius: f32, color: Color) {
        let from = normal.normalize_or_zero().any_orthonormal_vector();
        let points = arc_points(center, normal, from, 360.0, radius, self.segments);
        self.push_polyline(&points, color);
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
        let points = arc_points(center, normal, from, angle_deg, radius, self.segments);
        self.push_polyline(&points, color);
    }

    fn line(&mut self, a: Vec3, b: Vec3, color: Color) {
        self.push_segment(a, b, color);
    }

    fn find_shader(&mut self, name: &str) -> Option<ShaderId> {
        if name == UNLIT_COLOR_SHADER {
            self.unlit_shader
        } else {
            None
        }
    }

    fn set_wireframe(&mut self, enabled: bool) {
        self.wireframe = enabled;
    }

    fn draw_mesh(&mut self, mesh: &TriMesh, transform: &Mat4, material: &FlatMaterial) {
        if !self.wireframe {
            let color = material.color.to_array();
            for tri in mesh.triangles() {
                for p in tri {
                    self.triangles.push(LineVertex {
                        position: transform.transform_point3(p).to_array(),
                        color,
                    });
                }
            }
            return;
        }

        let mut seen: HashSet<(u32, u32)> = HashSet::new();
        let vertex_count = mesh.positions.len() as u32;
        for tri in mesh.indices.chunks_exact(3) {
            if tri.iter().any(|&i| i >= vertex_count) {
                continue;
            }
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                if !seen.insert((a.min(b), a.max(b))) {
                    continue;
                }
                let pa = transform.transform_point3(Vec3::from_array(mesh.positions[a as usize]));
                let pb = transform.transform_point3(Vec3::from_array(mesh.positions[b as usize]));
                self.push_segment(pa, pb, material.color);
            }
        }
    }
}

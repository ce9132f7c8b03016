//! Headless driver for the collider paint overlay.
//!
//! Loads (or builds) a scene, palette and settings, frames the scene, then runs
//! a repaint, a paint trigger, a second repaint and an undo, logging what the
//! overlay drew each time.

use clap::Parser;
use collider_paint::overlay::{
    InputEvent, OverlayController, OverlaySettings, PointerButton, RepaintHooks, UndoHistory,
};
use collider_paint::palette::{Color, EntryKind, Palette, PaletteEntry};
use collider_paint::render::{CameraController, LineBatch, Projection, SceneQuery, ViewCamera};
use collider_paint::scene::serialization::{load_scene_from_file, save_scene_to_file};
use collider_paint::scene::{
    Axis, MaterialLibrary, SceneState, ShapeGeometry, ShapeTransform, TriMesh,
};
use glam::{Vec2, Vec3};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

#[derive(Parser, Debug, Default)]
#[command(version, about = "Collider physics-material paint overlay (headless run)")]
struct Args {
    /// Overlay settings JSON
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Scene JSON; a demo scene is built when omitted
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Palette JSON; defaults to one entry per scene material
    #[arg(long)]
    palette: Option<PathBuf>,

    /// Write the painted scene here before undoing
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => OverlaySettings::load(path).unwrap_or_else(|e| {
            log::warn!("Failed to load settings: {}", e);
            OverlaySettings::default()
        }),
        None => OverlaySettings::default(),
    };

    let mut scene = match &args.scene {
        Some(path) => match load_scene_from_file(path) {
            Ok(scene) => {
                log::info!("Scene loaded from {:?}", path);
                scene
            }
            Err(e) => {
                log::warn!("Failed to load scene: {}", e);
                demo_scene()
            }
        },
        None => demo_scene(),
    };

    let palette = match &args.palette {
        Some(path) => Palette::load(path).unwrap_or_else(|e| {
            log::warn!("Failed to load palette: {}", e);
            demo_palette(scene.materials())
        }),
        None => demo_palette(scene.materials()),
    };

    let camera = frame_scene(&scene);
    let cursor = scene
        .shapes()
        .iter()
        .find(|shape| shape.is_solid())
        .and_then(|shape| project_to_cursor(&camera, shape.world_bounds().center()))
        .unwrap_or(VIEWPORT * 0.5);

    let hooks = RepaintHooks::new();
    let mut overlay = OverlayController::new(settings);
    overlay.set_palette(Some(Rc::new(palette)));
    overlay.activate(&hooks);

    let last = overlay
        .palette()
        .map_or(0, |palette| palette.entries(EntryKind::Shape3D).len());
    if last > 0 {
        overlay.toggle_entry(EntryKind::Shape3D, last - 1);
    }
    for row in overlay.palette_rows(scene.materials()) {
        log::info!(
            "  [{}] {:<12} {}",
            row.index,
            row.name,
            if row.selected { "(selected)" } else { "" }
        );
    }

    let mut batch = LineBatch::new();
    repaint(&mut overlay, &scene, &camera, cursor, &mut batch, "before paint");

    let mut history = UndoHistory::new();
    let event = match overlay.settings.hotkey {
        Some(key) => InputEvent::KeyDown(key),
        None => InputEvent::PointerDown(PointerButton::Primary),
    };
    let response = overlay.on_trigger(&mut scene, &camera, cursor, event, &mut history);
    log::info!(
        "Trigger {:?}: consumed={} painted={}",
        event,
        response.consumed,
        response.painted
    );

    repaint(&mut overlay, &scene, &camera, cursor, &mut batch, "after paint");

    if let Some(path) = &args.save {
        match save_scene_to_file(&scene, path) {
            Ok(()) => log::info!("Scene saved to {:?}", path),
            Err(e) => log::warn!("Failed to save scene: {}", e),
        }
    }

    if let Some(edit) = history.undo(&mut scene) {
        log::info!("Undid '{}'", edit.label);
    }
    repaint(&mut overlay, &scene, &camera, cursor, &mut batch, "after undo");

    overlay.deactivate();
}

fn repaint(
    overlay: &mut OverlayController,
    scene: &SceneState,
    camera: &ViewCamera,
    cursor: Vec2,
    batch: &mut LineBatch,
    stage: &str,
) {
    batch.clear();
    let stats = overlay.on_repaint(scene, camera, cursor, batch);
    let hovered = stats
        .hovered
        .and_then(|id| SceneQuery::shape(scene, id))
        .map(|shape| shape.name.as_str())
        .unwrap_or("-");
    log::info!(
        "Repaint {}: {} dimmed, {} culled, {} unresolved, hovered {} (entry {:?}), {} lines",
        stage,
        stats.drawn_all,
        stats.culled,
        stats.unresolved,
        hovered,
        stats.hovered_entry,
        batch.segment_count()
    );
}

fn frame_scene(scene: &SceneState) -> ViewCamera {
    let (center, extent) = scene
        .bounds()
        .map(|bounds| (bounds.center(), bounds.extent()))
        .unwrap_or((Vec3::ZERO, Vec3::ONE));
    CameraController::from_bounds(center.to_array(), extent.to_array()).view_camera(
        Projection::Perspective {
            fov_y: 60f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        },
        VIEWPORT,
    )
}

fn project_to_cursor(camera: &ViewCamera, point: Vec3) -> Option<Vec2> {
    let clip = camera.view_projection() * point.extend(1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(Vec2::new(
        (ndc.x + 1.0) * 0.5 * camera.viewport.x,
        (1.0 - ndc.y) * 0.5 * camera.viewport.y,
    ))
}

fn demo_scene() -> SceneState {
    let mut scene = SceneState::new();
    let rubber = scene.materials_mut().add("Rubber", 0.8, 0.9, 0.6);
    let ice = scene.materials_mut().add("Ice", 0.02, 0.02, 0.0);
    scene.materials_mut().add("Metal", 0.4, 0.5, 0.1);

    scene.add_shape(
        "Crate",
        ShapeGeometry::Box {
            center: [0.0, 0.5, 0.0],
            half_extents: [0.5, 0.5, 0.5],
        },
        ShapeTransform {
            position: [0.0, 0.0, 0.0],
            rotation_deg: [0.0, 30.0, 0.0],
            scale: [2.0, 1.0, 1.0],
        },
        Some(rubber),
    );
    scene.add_shape(
        "Floor",
        ShapeGeometry::Box {
            center: [0.0, -0.05, 0.0],
            half_extents: [10.0, 0.05, 10.0],
        },
        ShapeTransform::default(),
        Some(ice),
    );
    scene.add_shape(
        "Ball",
        ShapeGeometry::Sphere {
            center: [0.0; 3],
            radius: 0.5,
        },
        ShapeTransform::from_position([3.0, 0.5, 0.0]),
        Some(rubber),
    );
    scene.add_shape(
        "Pillar",
        ShapeGeometry::Capsule {
            center: [0.0; 3],
            height: 3.0,
            radius: 0.4,
            axis: Axis::Y,
        },
        ShapeTransform::from_position([-3.0, 1.5, 0.0]),
        Some(ice),
    );
    scene.add_shape(
        "Pebble",
        ShapeGeometry::Capsule {
            center: [0.0; 3],
            height: 0.5,
            radius: 0.5,
            axis: Axis::X,
        },
        ShapeTransform::from_position([0.0, 0.5, 3.0]),
        None,
    );
    let ramp = TriMesh::new(
        vec![
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [0.0, 0.0, 2.0],
            [0.0, 1.0, 0.0],
        ],
        vec![0, 1, 2, 0, 3, 1, 0, 2, 3, 1, 3, 2],
    );
    scene.add_shape(
        "Ramp",
        ShapeGeometry::Mesh {
            mesh: Some(Arc::new(ramp)),
        },
        ShapeTransform::from_position([0.0, 0.0, -4.0]),
        Some(ice),
    );
    let zone = scene.add_shape(
        "KillZone",
        ShapeGeometry::Box {
            center: [0.0; 3],
            half_extents: [20.0, 1.0, 20.0],
        },
        ShapeTransform::from_position([0.0, -5.0, 0.0]),
        None,
    );
    if let Some(shape) = scene.shape_mut(zone) {
        shape.is_trigger = true;
    }
    scene
}

fn demo_palette(materials: &MaterialLibrary) -> Palette {
    const COLORS: [Color; 4] = [
        Color::RED,
        Color::rgba(0.4, 0.8, 1.0, 1.0),
        Color::rgba(0.7, 0.7, 0.7, 1.0),
        Color::GREEN,
    ];
    let mut palette = Palette::new();
    palette.push(EntryKind::Shape3D, PaletteEntry::new(None, Color::WHITE));
    for (material, color) in materials.materials().iter().zip(COLORS) {
        palette.push(EntryKind::Shape3D, PaletteEntry::new(Some(material.id), color));
    }
    palette
}

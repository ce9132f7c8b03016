//! Paint overlay: per-frame draw pass and per-event paint pass.

pub mod history;
pub mod input;
pub mod session;
pub mod settings;

pub use history::{EditRecorder, EditScope, MaterialEdit, UndoHistory};
pub use input::{EventResponse, InputEvent, PointerButton, TriggerLatch};
pub use session::{RepaintHooks, Subscription};
pub use settings::OverlaySettings;

use crate::palette::{Color, EntryKind, Palette, PaletteEntry};
use crate::render::{
    is_visible, resolve_entry, DrawSurface, SceneQuery, ViewCamera, WireframeRenderer,
    PICK_DISTANCE,
};
use crate::scene::{MaterialId, MaterialLibrary, ShapeId};
use glam::Vec2;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Idle,
    Selected { kind: EntryKind, index: usize },
}

/// What one repaint drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn_all: usize,
    pub culled: usize,
    pub unresolved: usize,
    pub hovered: Option<ShapeId>,
    /// Palette index the hovered shape resolved to.
    pub hovered_entry: Option<usize>,
}

/// One toggle button of the palette panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteRow {
    pub index: usize,
    pub name: String,
    pub color: Color,
    pub selected: bool,
}

pub struct OverlayController {
    pub settings: OverlaySettings,
    palette: Option<Rc<Palette>>,
    selection: Selection,
    renderer: WireframeRenderer,
    latch: TriggerLatch,
    subscription: Option<Subscription>,
}

impl OverlayController {
    pub fn new(settings: OverlaySettings) -> Self {
        Self {
            settings,
            palette: None,
            selection: Selection::Idle,
            renderer: WireframeRenderer::new(),
            latch: TriggerLatch::new(),
            subscription: None,
        }
    }

    /// Subscribes to repaints once; repeated activation keeps the existing subscription.
    pub fn activate(&mut self, hooks: &RepaintHooks) {
        if self.is_active() {
            return;
        }
        self.subscription = Some(hooks.subscribe());
        log::info!("Collider paint overlay activated");
    }

    pub fn deactivate(&mut self) {
        if self.subscription.take().is_some() {
            log::info!("Collider paint overlay deactivated");
        }
        self.latch.reset();
    }

    pub fn is_active(&self) -> bool {
        self.subscription
            .as_ref()
            .map_or(false, Subscription::is_live)
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_deref()
    }

    /// Switching to a different palette drops the selection.
    pub fn set_palette(&mut self, palette: Option<Rc<Palette>>) {
        let same = match (&self.palette, &palette) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if !same {
            self.selection = Selection::Idle;
        }
        self.palette = palette;
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Selects the entry, or returns to idle when it is already selected.
    pub fn toggle_entry(&mut self, kind: EntryKind, index: usize) -> Selection {
        let exists = self
            .palette()
            .map_or(false, |palette| palette.entry(kind, index).is_some());
        if !exists {
            log::debug!("no {:?} palette entry at {}", kind, index);
            return self.selection;
        }
        let toggled = Selection::Selected { kind, index };
        self.selection = if self.selection == toggled {
            Selection::Idle
        } else {
            toggled
        };
        self.selection
    }

    pub fn selected_entry(&self) -> Option<(EntryKind, &PaletteEntry)> {
        let Selection::Selected { kind, index } = self.selection else {
            return None;
        };
        self.palette()?.entry(kind, index).map(|entry| (kind, entry))
    }

    /// Material of the selected entry. `None` both when idle and for a null entry.
    pub fn current_material(&self) -> Option<MaterialId> {
        self.selected_entry().and_then(|(_, entry)| entry.material)
    }

    pub fn palette_rows(&self, materials: &MaterialLibrary) -> Vec<PaletteRow> {
        let Some(palette) = self.palette() else {
            return Vec::new();
        };
        palette
            .entries(EntryKind::Shape3D)
            .iter()
            .enumerate()
            .map(|(index, entry)| PaletteRow {
                index,
                name: entry.display_name(materials).to_string(),
                color: entry.color.with_alpha(1.0),
                selected: self.selection
                    == Selection::Selected {
                        kind: EntryKind::Shape3D,
                        index,
                    },
            })
            .collect()
    }

    /// Draw pass: every visible shape dimmed, then the shape under the cursor at full alpha.
    pub fn on_repaint<Q: SceneQuery + ?Sized>(
        &mut self,
        scene: &Q,
        camera: &ViewCamera,
        cursor: Vec2,
        surface: &mut dyn DrawSurface,
    ) -> FrameStats {
        let mut stats = FrameStats::default();
        if !self.is_active() {
            return stats;
        }
        let palette = self.palette.as_deref();
        let alpha = self.settings.alpha;
        let max_distance = self.settings.max_distance;

        if self.settings.draw_all && alpha > 0.0 && max_distance > 0.0 {
            let frustum = camera.frustum();
            for shape in scene.enumerate_shapes() {
                if !shape.is_solid() {
                    continue;
                }
                if !is_visible(&shape.world_bounds(), &frustum, camera.position, max_distance) {
                    stats.culled += 1;
                    continue;
                }
                let Some((_, entry)) = resolve_entry(palette, shape) else {
                    stats.unresolved += 1;
                    continue;
                };
                let color = entry.color.with_alpha(entry.color.a * alpha);
                self.renderer.render(shape, color, Some(camera), surface);
                stats.drawn_all += 1;
            }
        }

        let ray = camera.screen_ray(cursor);
        if let Some(shape) = scene
            .raycast(&ray, PICK_DISTANCE)
            .and_then(|hit| scene.shape(hit.shape))
        {
            stats.hovered = Some(shape.id);
            if let Some((index, entry)) = resolve_entry(palette, shape) {
                stats.hovered_entry = Some(index);
                self.renderer.render(shape, entry.color, Some(camera), surface);
            }
        }

        log::trace!("overlay frame: {:?}", stats);
        stats
    }

    /// Paint pass for one input event.
    pub fn on_trigger<Q: SceneQuery + ?Sized>(
        &mut self,
        scene: &mut Q,
        camera: &ViewCamera,
        cursor: Vec2,
        event: InputEvent,
        recorder: &mut dyn EditRecorder,
    ) -> EventResponse {
        if !self.is_active() || !self.latch.is_trigger(event, &self.settings) {
            return EventResponse::IGNORED;
        }
        EventResponse {
            consumed: true,
            painted: self.paint_under_cursor(scene, camera, cursor, recorder),
        }
    }

    fn paint_under_cursor<Q: SceneQuery + ?Sized>(
        &self,
        scene: &mut Q,
        camera: &ViewCamera,
        cursor: Vec2,
        recorder: &mut dyn EditRecorder,
    ) -> bool {
        let ray = camera.screen_ray(cursor);
        let Some(hit) = scene.raycast(&ray, PICK_DISTANCE) else {
            return false;
        };
        let Some((kind, entry)) = self.selected_entry() else {
            return false;
        };
        if kind != EntryKind::Shape3D {
            log::debug!("2D palette entry selected, nothing to paint on a 3D shape");
            return false;
        }
        let material = entry.material;
        let label = format!("swap material {}", scene.materials().display_name(material));

        let Some(shape) = scene.shape_mut(hit.shape) else {
            return false;
        };
        log::info!("Swap material '{}'", shape.name);
        let mut scope = EditScope::begin(recorder, shape.id, &label, shape.material);
        shape.material = material;
        scope.set_after(material);
        true
    }
}

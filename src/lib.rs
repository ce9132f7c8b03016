//! Collider physics-material paint overlay.
//!
//! Draws schematic wireframes of box, sphere, capsule and mesh colliders
//! coloured by their palette entry, and paints the selected palette material
//! onto the collider under the cursor as an undoable edit.

pub mod overlay;
pub mod palette;
pub mod render;
pub mod scene;

pub use overlay::{
    EditRecorder, EventResponse, FrameStats, InputEvent, OverlayController, OverlaySettings,
    PointerButton, RepaintHooks, Selection, UndoHistory,
};
pub use palette::{Color, EntryKind, Palette, PaletteEntry};
pub use render::{DrawSurface, LineBatch, PrimitiveRecorder, SceneQuery, ViewCamera};
pub use scene::{MaterialId, SceneState, Shape, ShapeGeometry, ShapeId, ShapeTransform};

//! Recoverable edits of a shape's material assignment.

use crate::render::SceneQuery;
use crate::scene::{MaterialId, ShapeId};

/// Host undo surface. Every `begin_edit` is followed by exactly one `end_edit`
/// for the same target.
pub trait EditRecorder {
    fn begin_edit(&mut self, target: ShapeId, label: &str, before: Option<MaterialId>);
    fn end_edit(&mut self, target: ShapeId, after: Option<MaterialId>);
}

/// Scoped edit: `end_edit` runs when the guard drops, whatever happens in between.
pub struct EditScope<'a> {
    recorder: &'a mut dyn EditRecorder,
    target: ShapeId,
    after: Option<MaterialId>,
}

impl<'a> EditScope<'a> {
    pub fn begin(
        recorder: &'a mut dyn EditRecorder,
        target: ShapeId,
        label: &str,
        before: Option<MaterialId>,
    ) -> Self {
        recorder.begin_edit(target, label, before);
        Self {
            recorder,
            target,
            after: before,
        }
    }

    pub fn set_after(&mut self, after: Option<MaterialId>) {
        self.after = after;
    }
}

impl Drop for EditScope<'_> {
    fn drop(&mut self) {
        self.recorder.end_edit(self.target, self.after);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialEdit {
    pub target: ShapeId,
    pub label: String,
    pub before: Option<MaterialId>,
    pub after: Option<MaterialId>,
}

#[derive(Debug, Clone)]
struct PendingEdit {
    target: ShapeId,
    label: String,
    before: Option<MaterialId>,
}

/// Linear undo/redo stacks of material edits.
#[derive(Debug, Default)]
pub struct UndoHistory {
    pending: Option<PendingEdit>,
    undo_stack: Vec<MaterialEdit>,
    redo_stack: Vec<MaterialEdit>,
}

impl UndoHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn last_label(&self) -> Option<&str> {
        self.undo_stack.last().map(|edit| edit.label.as_str())
    }

    /// Restores the material from before the most recent edit.
    pub fn undo(&mut self, scene: &mut dyn SceneQuery) -> Option<&MaterialEdit> {
        let edit = self.undo_stack.pop()?;
        apply(scene, edit.target, edit.before);
        self.redo_stack.push(edit);
        self.redo_stack.last()
    }

    pub fn redo(&mut self, scene: &mut dyn SceneQuery) -> Option<&MaterialEdit> {
        let edit = self.redo_stack.pop()?;
        apply(scene, edit.target, edit.after);
        self.undo_stack.push(edit);
        self.undo_stack.last()
    }
}

fn apply(scene: &mut dyn SceneQuery, target: ShapeId, material: Option<MaterialId>) {
    match scene.shape_mut(target) {
        Some(shape) => shape.material = material,
        None => log::warn!("shape {:?} no longer exists, edit skipped", target),
    }
}

impl EditRecorder for UndoHistory {
    fn begin_edit(&mut self, target: ShapeId, label: &str, before: Option<MaterialId>) {
        if self.pending.is_some() {
            log::warn!("nested edit on {:?}, previous edit dropped", target);
        }
        self.pending = Some(PendingEdit {
            target,
            label: label.to_string(),
            before,
        });
    }

    fn end_edit(&mut self, target: ShapeId, after: Option<MaterialId>) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if pending.target != target || pending.before == after {
            return;
        }
        self.redo_stack.clear();
        self.undo_stack.push(MaterialEdit {
            target,
            label: pending.label,
            before: pending.before,
            after,
        });
    }
}

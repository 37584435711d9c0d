//! Undo/redo history — a bounded stack of reversible scene commands.
//!
//! Commands are a tagged enum rather than trait objects: the scene knows
//! exactly three reversible mutations (insert, delete, normalize) and the
//! enum keeps ownership transfer explicit — items live either in the scene
//! or inside the command that removed them, never both.

use std::collections::VecDeque;

use uuid::Uuid;

use crate::item::ImageItem;
use crate::scene::Scene;

/// How many commands the history keeps; the oldest entry is evicted first.
pub const DEFAULT_UNDO_LIMIT: usize = 100;

pub enum SceneCommand {
    /// Add a batch of items (file import, clipboard paste). `items` holds
    /// the batch while it is *not* in the scene.
    InsertItems {
        ids: Vec<Uuid>,
        items: Vec<ImageItem>,
    },
    /// Remove a batch of items. `items` holds them while removed.
    DeleteItems {
        ids: Vec<Uuid>,
        items: Vec<ImageItem>,
    },
    /// Rescale items: `(id, old scale, new scale)` per item.
    NormalizeItems { scales: Vec<(Uuid, f32, f32)> },
}

impl SceneCommand {
    pub fn insert(items: Vec<ImageItem>) -> Self {
        let ids = items.iter().map(|item| item.id()).collect();
        SceneCommand::InsertItems { ids, items }
    }

    pub fn delete(ids: Vec<Uuid>) -> Self {
        SceneCommand::DeleteItems {
            ids,
            items: Vec::new(),
        }
    }

    pub fn normalize(scales: Vec<(Uuid, f32, f32)>) -> Self {
        SceneCommand::NormalizeItems { scales }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SceneCommand::InsertItems { .. } => "Insert Items",
            SceneCommand::DeleteItems { .. } => "Delete Items",
            SceneCommand::NormalizeItems { .. } => "Normalize Items",
        }
    }

    fn apply(&mut self, scene: &mut Scene) {
        match self {
            SceneCommand::InsertItems { items, .. } => {
                scene.clear_selection();
                for mut item in items.drain(..) {
                    item.selected = true;
                    scene.add_item(item);
                }
            }
            SceneCommand::DeleteItems { ids, items } => {
                for id in ids.iter() {
                    if let Some(item) = scene.take_item(*id) {
                        items.push(item);
                    }
                }
            }
            SceneCommand::NormalizeItems { scales } => {
                for (id, _old, new) in scales.iter() {
                    if let Some(item) = scene.get_mut(*id) {
                        item.set_scale_keep_center(*new);
                    }
                }
                scene.mark_changed();
            }
        }
    }

    fn revert(&mut self, scene: &mut Scene) {
        match self {
            SceneCommand::InsertItems { ids, items } => {
                for id in ids.iter() {
                    if let Some(item) = scene.take_item(*id) {
                        items.push(item);
                    }
                }
            }
            SceneCommand::DeleteItems { items, .. } => {
                for item in items.drain(..) {
                    scene.add_item(item);
                }
            }
            SceneCommand::NormalizeItems { scales } => {
                for (id, old, _new) in scales.iter() {
                    if let Some(item) = scene.get_mut(*id) {
                        item.set_scale_keep_center(*old);
                    }
                }
                scene.mark_changed();
            }
        }
    }
}

/// Bounded undo/redo stacks. Pushing a new command clears the redo stack;
/// exceeding the limit evicts the oldest undo entry.
pub struct History {
    undo_stack: VecDeque<SceneCommand>,
    redo_stack: Vec<SceneCommand>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_UNDO_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Execute `command` against the scene and record it.
    pub fn push(&mut self, mut command: SceneCommand, scene: &mut Scene) {
        command.apply(scene);
        self.redo_stack.clear();
        self.undo_stack.push_back(command);
        while self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
    }

    /// Revert the most recent command. Returns its label, or `None` when
    /// the stack is empty.
    pub fn undo(&mut self, scene: &mut Scene) -> Option<&'static str> {
        let mut command = self.undo_stack.pop_back()?;
        command.revert(scene);
        let label = command.label();
        self.redo_stack.push(command);
        Some(label)
    }

    /// Re-apply the most recently undone command.
    pub fn redo(&mut self, scene: &mut Scene) -> Option<&'static str> {
        let mut command = self.redo_stack.pop()?;
        command.apply(scene);
        let label = command.label();
        self.undo_stack.push_back(command);
        Some(label)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

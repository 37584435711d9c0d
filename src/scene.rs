//! The scene — an ordered collection of image items plus selection state.
//!
//! The scene owns no view state; the [`crate::view::Viewport`] maps it to
//! the screen. Geometry changes raise a `changed` flag that the app shell
//! drains once per frame to know when to recalculate the scene rectangle.

use egui::{Pos2, Rect, Vec2};
use uuid::Uuid;

use crate::components::history::SceneCommand;
use crate::item::ImageItem;

#[derive(Default)]
pub struct Scene {
    items: Vec<ImageItem>,
    changed: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Item access -------------------------------------------------------

    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut ImageItem> {
        self.items.iter_mut()
    }

    pub fn get(&self, id: Uuid) -> Option<&ImageItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut ImageItem> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// Mutable access by insertion index (z-ordered painting).
    pub fn item_by_index_mut(&mut self, index: usize) -> Option<&mut ImageItem> {
        self.items.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // --- Mutation ----------------------------------------------------------

    pub fn add_item(&mut self, item: ImageItem) {
        self.items.push(item);
        self.changed = true;
    }

    /// Remove an item from the scene and hand it back (undo bookkeeping).
    pub fn take_item(&mut self, id: Uuid) -> Option<ImageItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        self.changed = true;
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            self.changed = true;
        }
        self.items.clear();
    }

    /// Translate every selected item by `delta` (scene units). Direct
    /// manipulation; not recorded on the undo stack.
    pub fn move_selected(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        for item in self.items.iter_mut().filter(|i| i.selected) {
            item.pos += delta;
        }
        self.changed = true;
    }

    /// Mirror every selected item horizontally, in place.
    pub fn flip_selected(&mut self) {
        for item in self.items.iter_mut().filter(|i| i.selected) {
            item.do_flip();
        }
        self.changed = true;
    }

    /// Rotate every selected item by `degrees` about its own center.
    pub fn rotate_selected(&mut self, degrees: f32) {
        for item in self.items.iter_mut().filter(|i| i.selected) {
            let center = item.scene_rect().center();
            item.rotation = (item.rotation + degrees) % 360.0;
            item.set_pos_center(center);
        }
        self.changed = true;
    }

    /// Raise a geometry-changed flag (used by undo commands that mutate
    /// items behind the scene's back).
    pub(crate) fn mark_changed(&mut self) {
        self.changed = true;
    }

    /// Drain the geometry-changed flag; returns whether anything changed
    /// since the last call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }

    // --- Selection ---------------------------------------------------------

    pub fn has_selection(&self) -> bool {
        self.items.iter().any(|item| item.selected)
    }

    pub fn selected_ids(&self) -> Vec<Uuid> {
        self.items
            .iter()
            .filter(|item| item.selected)
            .map(|item| item.id())
            .collect()
    }

    pub fn selection_count(&self) -> usize {
        self.items.iter().filter(|item| item.selected).count()
    }

    pub fn clear_selection(&mut self) {
        for item in &mut self.items {
            item.selected = false;
        }
    }

    pub fn select_all(&mut self) {
        for item in &mut self.items {
            item.selected = true;
        }
    }

    /// The topmost item (highest z, then latest inserted) under
    /// `scene_pos`, if any.
    pub fn item_at(&self, scene_pos: Pos2) -> Option<Uuid> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.contains(scene_pos))
            .max_by(|(ia, a), (ib, b)| {
                a.z.partial_cmp(&b.z)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(ia.cmp(ib))
            })
            .map(|(_, item)| item.id())
    }

    // --- Geometry ----------------------------------------------------------

    /// The union of all items' bounding rectangles, or a zero rect at the
    /// origin for an empty scene.
    pub fn items_bounding_rect(&self) -> Rect {
        if self.items.is_empty() {
            return Rect::from_min_max(Pos2::ZERO, Pos2::ZERO);
        }
        let mut bounds = Rect::NOTHING;
        for item in &self.items {
            bounds = bounds.union(item.scene_rect());
        }
        bounds
    }

    /// The bounding rectangle of the current selection, if any.
    pub fn selection_bounding_rect(&self) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for item in self.items.iter().filter(|i| i.selected) {
            let rect = item.scene_rect();
            bounds = Some(match bounds {
                Some(b) => b.union(rect),
                None => rect,
            });
        }
        bounds
    }

    // --- Normalize ---------------------------------------------------------

    /// Rescale the selected items so their displayed heights equal the
    /// selection's average. Returns the undoable command, or `None` with
    /// fewer than two selected items.
    pub fn normalize_height(&self) -> Option<SceneCommand> {
        self.normalize_by(|item| item.size().y)
    }

    /// Same, for widths.
    pub fn normalize_width(&self) -> Option<SceneCommand> {
        self.normalize_by(|item| item.size().x)
    }

    /// Rescale the selected items so their displayed areas equal the
    /// selection's average.
    pub fn normalize_size(&self) -> Option<SceneCommand> {
        let selected: Vec<&ImageItem> = self
            .items
            .iter()
            .filter(|i| i.selected && i.width() > 0 && i.height() > 0)
            .collect();
        if selected.len() < 2 {
            return None;
        }
        let avg_area = selected
            .iter()
            .map(|i| i.size().x * i.size().y * i.scale() * i.scale())
            .sum::<f32>()
            / selected.len() as f32;
        let scales = selected
            .iter()
            .map(|i| {
                let base_area = i.size().x * i.size().y;
                (i.id(), i.scale(), (avg_area / base_area).sqrt())
            })
            .collect();
        Some(SceneCommand::normalize(scales))
    }

    fn normalize_by(&self, dimension: impl Fn(&ImageItem) -> f32) -> Option<SceneCommand> {
        let selected: Vec<&ImageItem> = self
            .items
            .iter()
            .filter(|i| i.selected && dimension(i) > 0.0)
            .collect();
        if selected.len() < 2 {
            return None;
        }
        let avg = selected
            .iter()
            .map(|i| dimension(i) * i.scale())
            .sum::<f32>()
            / selected.len() as f32;
        let scales = selected
            .iter()
            .map(|i| (i.id(), i.scale(), avg / dimension(i)))
            .collect();
        Some(SceneCommand::normalize(scales))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;
    use image::RgbaImage;

    fn item_at(x: f32, y: f32, w: u32, h: u32) -> ImageItem {
        let mut item = ImageItem::new(RgbaImage::new(w, h), None);
        item.pos = pos2(x, y);
        item
    }

    #[test]
    fn empty_scene_bounding_rect_is_zero_at_origin() {
        let scene = Scene::new();
        let rect = scene.items_bounding_rect();
        assert_eq!(rect.min, Pos2::ZERO);
        assert_eq!(rect.max, Pos2::ZERO);
    }

    #[test]
    fn bounding_rect_spans_all_items() {
        let mut scene = Scene::new();
        scene.add_item(item_at(0.0, 0.0, 10, 10));
        scene.add_item(item_at(100.0, 50.0, 20, 20));
        let rect = scene.items_bounding_rect();
        assert_eq!(rect.min, pos2(0.0, 0.0));
        assert_eq!(rect.max, pos2(120.0, 70.0));
    }

    #[test]
    fn item_at_picks_topmost_by_z() {
        let mut scene = Scene::new();
        let mut below = item_at(0.0, 0.0, 10, 10);
        below.z = 0.0;
        let mut above = item_at(0.0, 0.0, 10, 10);
        above.z = 1.0;
        let above_id = above.id();
        scene.add_item(above);
        scene.add_item(below);
        assert_eq!(scene.item_at(pos2(5.0, 5.0)), Some(above_id));
        assert_eq!(scene.item_at(pos2(50.0, 50.0)), None);
    }

    #[test]
    fn item_at_equal_z_picks_latest_inserted() {
        let mut scene = Scene::new();
        scene.add_item(item_at(0.0, 0.0, 10, 10));
        let second = item_at(0.0, 0.0, 10, 10);
        let second_id = second.id();
        scene.add_item(second);
        assert_eq!(scene.item_at(pos2(5.0, 5.0)), Some(second_id));
    }

    #[test]
    fn move_selected_only_moves_selection() {
        let mut scene = Scene::new();
        let mut a = item_at(0.0, 0.0, 10, 10);
        a.selected = true;
        let b = item_at(100.0, 100.0, 10, 10);
        let b_id = b.id();
        scene.add_item(a);
        scene.add_item(b);
        scene.take_changed();
        scene.move_selected(egui::vec2(5.0, -5.0));
        assert!(scene.take_changed());
        assert_eq!(scene.items()[0].pos, pos2(5.0, -5.0));
        assert_eq!(scene.get(b_id).unwrap().pos, pos2(100.0, 100.0));
    }

    #[test]
    fn normalize_height_needs_two_selected() {
        let mut scene = Scene::new();
        let mut a = item_at(0.0, 0.0, 10, 10);
        a.selected = true;
        scene.add_item(a);
        assert!(scene.normalize_height().is_none());
    }
}

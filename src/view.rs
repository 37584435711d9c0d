//! The viewport — the window onto the scene.
//!
//! Owns the view transform (uniform scale + translation), the scene
//! rectangle that bounds scrolling, the zoom limits, the fit/toggle
//! transform cache and the pan state machine. Everything here is plain
//! geometry over `egui::emath` types; the GUI shell feeds it events and
//! reads back the mapping.

use egui::{Pos2, PointerButton, Rect, Vec2};
use uuid::Uuid;

use crate::{log_debug, log_info};

/// Zoom-in stops once the items' largest view-space extent reaches this.
pub const MAX_ZOOM_EXTENT: f32 = 10_000_000.0;
/// Zoom-out stops once the items' smallest view-space extent reaches this.
pub const MIN_ZOOM_EXTENT: f32 = 50.0;
/// Per-step zoom factor.
pub const ZOOM_STEP: f32 = 1.2;

/// Snapshot of the view before a fit, for toggling back.
struct PreviousTransform {
    scale: f32,
    center: Pos2,
    toggle_item: Uuid,
}

pub struct Viewport {
    /// Viewport size in view coordinates.
    size: Vec2,
    /// view = scene * scale + translation
    scale: f32,
    translation: Vec2,
    /// Scrollable bounds in scene coordinates; always one viewport beyond
    /// the items' bounding box on every side.
    scene_rect: Rect,
    previous_transform: Option<PreviousTransform>,
}

impl Viewport {
    pub fn new(size: Vec2) -> Self {
        let mut viewport = Self {
            size,
            scale: 1.0,
            translation: Vec2::ZERO,
            scene_rect: Rect::from_min_max(Pos2::ZERO, Pos2::ZERO),
            previous_transform: None,
        };
        viewport.recalc_scene_rect(Rect::from_min_max(Pos2::ZERO, Pos2::ZERO));
        viewport
    }

    // --- Transform access --------------------------------------------------

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn scene_rect(&self) -> Rect {
        self.scene_rect
    }

    /// The item a cached pre-fit transform is keyed to, if any.
    pub fn toggle_target(&self) -> Option<Uuid> {
        self.previous_transform.as_ref().map(|p| p.toggle_item)
    }

    /// Update the viewport size (window resize); recalculates the scene
    /// rectangle like the original resize handler.
    pub fn set_viewport_size(&mut self, size: Vec2, items: Rect) {
        if size == self.size || size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        self.size = size;
        self.recalc_scene_rect(items);
    }

    /// Reset to the identity transform (empty scene, file cleared).
    pub fn reset(&mut self, items: Rect) {
        self.scale = 1.0;
        self.translation = Vec2::ZERO;
        self.previous_transform = None;
        self.recalc_scene_rect(items);
    }

    // --- Coordinate mapping ------------------------------------------------

    pub fn map_from_scene(&self, scene: Pos2) -> Pos2 {
        (scene.to_vec2() * self.scale + self.translation).to_pos2()
    }

    pub fn map_to_scene(&self, view: Pos2) -> Pos2 {
        ((view.to_vec2() - self.translation) / self.scale).to_pos2()
    }

    pub fn map_rect_from_scene(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.map_from_scene(rect.min), self.map_from_scene(rect.max))
    }

    /// Viewport center in view coordinates.
    fn view_center(&self) -> Pos2 {
        (self.size * 0.5).to_pos2()
    }

    /// The scene point currently at the viewport center — the anchor for
    /// inserts and pastes.
    pub fn view_center_scene(&self) -> Pos2 {
        self.map_to_scene(self.view_center())
    }

    /// Place `scene_pos` at the viewport center.
    pub fn center_on(&mut self, scene_pos: Pos2) {
        self.translation = self.view_center().to_vec2() - scene_pos.to_vec2() * self.scale;
    }

    // --- Scene rectangle ---------------------------------------------------

    /// Resize the scene rectangle so that it is always one viewport width
    /// wider than all items' bounding box at each side and one viewport
    /// height higher on top and bottom. This gives the impression of an
    /// infinite canvas.
    pub fn recalc_scene_rect(&mut self, items: Rect) {
        log_debug!("Recalculating scene rectangle...");
        let topleft = self.map_from_scene(items.min) - self.size;
        let bottomright = self.map_from_scene(items.max) + self.size;
        let min = self.map_to_scene(topleft);
        let max = self.map_to_scene(bottomright);
        if min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite() {
            self.scene_rect = Rect::from_min_max(min, max);
        } else {
            // Keep the previous rectangle; recoverable, not fatal.
            log_info!("Maximum scene size reached");
        }
    }

    /// Keep the visible region inside the scene rectangle.
    fn clamp_to_scene_rect(&mut self) {
        let lo = self.size - self.scene_rect.max.to_vec2() * self.scale;
        let hi = -self.scene_rect.min.to_vec2() * self.scale;
        if !lo.x.is_finite() || !lo.y.is_finite() || !hi.x.is_finite() || !hi.y.is_finite() {
            return;
        }
        self.translation.x = clamp_or_center(self.translation.x, lo.x, hi.x);
        self.translation.y = clamp_or_center(self.translation.y, lo.y, hi.y);
    }

    // --- Zoom --------------------------------------------------------------

    /// Size of the items' bounding box in view coordinates, reduced by
    /// `pick` (`f32::max` for the larger dimension, `f32::min` for the
    /// smaller). Guards both zoom directions.
    fn zoom_size(&self, items: Rect, pick: fn(f32, f32) -> f32) -> f32 {
        let topleft = self.map_from_scene(items.min);
        let bottomright = self.map_from_scene(items.max);
        pick(bottomright.x - topleft.x, bottomright.y - topleft.y)
    }

    /// One zoom-in step. Rejected (returns `false`) once the bounding box's
    /// larger view-space dimension would exceed the overflow guard.
    pub fn zoom_in(&mut self, items: Rect) -> bool {
        if self.zoom_size(items, f32::max) < MAX_ZOOM_EXTENT {
            self.apply_zoom(ZOOM_STEP, items);
            true
        } else {
            log_debug!("Maximum zoom size reached");
            false
        }
    }

    /// One zoom-out step. Rejected once the smaller view-space dimension
    /// would drop below the visibility floor.
    pub fn zoom_out(&mut self, items: Rect) -> bool {
        if self.zoom_size(items, f32::min) > MIN_ZOOM_EXTENT {
            self.apply_zoom(1.0 / ZOOM_STEP, items);
            true
        } else {
            log_debug!("Minimum zoom size reached");
            false
        }
    }

    /// Scale about the viewport center, then re-derive the scene rect.
    fn apply_zoom(&mut self, factor: f32, items: Rect) {
        let anchor = self.view_center_scene();
        self.scale *= factor;
        self.center_on(anchor);
        self.recalc_scene_rect(items);
        self.clamp_to_scene_rect();
    }

    // --- Pan ---------------------------------------------------------------

    /// Translate the view by a pointer delta (content follows the pointer;
    /// dragging right reveals content to the left).
    pub fn pan_by(&mut self, delta: Vec2) {
        self.translation += delta;
        self.clamp_to_scene_rect();
    }

    // --- Fit and toggle ----------------------------------------------------

    /// Drop the cached pre-fit transform unless it belongs to exactly
    /// `toggle_item`.
    pub fn reset_previous_transform(&mut self, toggle_item: Option<Uuid>) {
        let stale = self
            .previous_transform
            .as_ref()
            .is_some_and(|prev| toggle_item != Some(prev.toggle_item));
        if stale {
            self.previous_transform = None;
        }
    }

    /// Fit `rect` into the viewport, preserving aspect ratio.
    ///
    /// With a `toggle_item`, the pre-fit transform is remembered so a
    /// second call for the same item restores it (and a third call fits
    /// again). Toggling a different item — or fitting with no item —
    /// discards the cache.
    pub fn fit_rect(&mut self, rect: Rect, toggle_item: Option<Uuid>, items: Rect) {
        self.reset_previous_transform(toggle_item);

        if let Some(prev) = self.previous_transform.take() {
            // Same item toggled again: restore the remembered view.
            self.scale = prev.scale;
            self.center_on(prev.center);
            self.recalc_scene_rect(items);
            self.clamp_to_scene_rect();
            return;
        }

        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }

        let old_scale = self.scale;
        let old_center = self.view_center_scene();

        self.scale = (self.size.x / rect.width()).min(self.size.y / rect.height());
        self.center_on(rect.center());

        if let Some(item) = toggle_item {
            self.previous_transform = Some(PreviousTransform {
                scale: old_scale,
                center: old_center,
                toggle_item: item,
            });
        }

        self.recalc_scene_rect(items);
        self.clamp_to_scene_rect();
    }
}

fn clamp_or_center(value: f32, lo: f32, hi: f32) -> f32 {
    if lo <= hi {
        value.clamp(lo, hi)
    } else {
        // Scene rect smaller than the viewport on this axis: center it.
        (lo + hi) * 0.5
    }
}

// ===========================================================================
// Pan state machine
// ===========================================================================

/// Abstract pointer event, decoupled from the GUI toolkit's response types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed {
        button: PointerButton,
        alt: bool,
        pos: Pos2,
    },
    Moved {
        pos: Pos2,
    },
    Released,
}

/// What the state machine did with an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanOutcome {
    /// Entered pan mode; the binding should switch to a grabbing cursor.
    Started,
    /// Panning: translate the view by this pointer delta.
    Panned(Vec2),
    /// Left pan mode; restore the default cursor.
    Finished,
    /// Not a pan event; default handling applies.
    Passthrough,
}

/// idle → panning → idle. A middle-button press, or a primary press with
/// Alt held, starts a pan; every move yields the delta since the previous
/// position; release ends it. Everything else passes through.
#[derive(Debug, Default)]
pub struct Panner {
    last: Option<Pos2>,
}

impl Panner {
    pub fn is_panning(&self) -> bool {
        self.last.is_some()
    }

    pub fn handle(&mut self, event: PointerEvent) -> PanOutcome {
        match event {
            PointerEvent::Pressed { button, alt, pos } => {
                let qualifies = button == PointerButton::Middle
                    || (button == PointerButton::Primary && alt);
                if self.last.is_none() && qualifies {
                    self.last = Some(pos);
                    PanOutcome::Started
                } else {
                    PanOutcome::Passthrough
                }
            }
            PointerEvent::Moved { pos } => match self.last {
                Some(last) => {
                    self.last = Some(pos);
                    PanOutcome::Panned(pos - last)
                }
                None => PanOutcome::Passthrough,
            },
            PointerEvent::Released => {
                if self.last.take().is_some() {
                    PanOutcome::Finished
                } else {
                    PanOutcome::Passthrough
                }
            }
        }
    }
}

use egui::{PointerButton, Rect, pos2, vec2};
use uuid::Uuid;

use beeref::view::{
    MAX_ZOOM_EXTENT, MIN_ZOOM_EXTENT, PanOutcome, Panner, PointerEvent, Viewport, ZOOM_STEP,
};

fn items(w: f32, h: f32) -> Rect {
    Rect::from_min_max(pos2(0.0, 0.0), pos2(w, h))
}

fn empty_items() -> Rect {
    Rect::from_min_max(pos2(0.0, 0.0), pos2(0.0, 0.0))
}

// --- Scene rectangle -------------------------------------------------------

#[test]
fn scene_rect_extends_one_viewport_on_every_side() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    viewport.recalc_scene_rect(items(400.0, 300.0));
    let rect = viewport.scene_rect();
    assert_eq!(rect.min, pos2(-800.0, -600.0));
    assert_eq!(rect.max, pos2(1200.0, 900.0));
}

#[test]
fn scene_rect_margins_shrink_in_scene_units_when_zoomed() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    let bounds = items(400.0, 300.0);
    while viewport.scale() < 2.0 {
        assert!(viewport.zoom_in(bounds));
    }
    let scale = viewport.scale();
    let rect = viewport.scene_rect();
    // One viewport of margin, measured in view units, converted to scene.
    assert!((rect.min.x - (0.0 - 800.0 / scale)).abs() < 0.5);
    assert!((rect.min.y - (0.0 - 600.0 / scale)).abs() < 0.5);
    assert!((rect.max.x - (400.0 + 800.0 / scale)).abs() < 0.5);
    assert!((rect.max.y - (300.0 + 600.0 / scale)).abs() < 0.5);
}

#[test]
fn scene_rect_overflow_keeps_previous_rect() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    viewport.recalc_scene_rect(items(400.0, 300.0));
    let before = viewport.scene_rect();
    // f32::MAX + one viewport overflows to infinity; the recalculation
    // must be a no-op rather than poisoning the rect.
    viewport.recalc_scene_rect(Rect::from_min_max(pos2(0.0, 0.0), pos2(f32::MAX, f32::MAX)));
    assert_eq!(viewport.scene_rect(), before);
}

#[test]
fn resize_recalculates_scene_rect() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    let bounds = items(400.0, 300.0);
    viewport.recalc_scene_rect(bounds);
    viewport.set_viewport_size(vec2(400.0, 300.0), bounds);
    let rect = viewport.scene_rect();
    assert_eq!(rect.min, pos2(-400.0, -300.0));
    assert_eq!(rect.max, pos2(800.0, 600.0));
}

// --- Zoom bounds -----------------------------------------------------------

#[test]
fn zoom_in_rejected_at_maximum_extent() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    let bounds = items(100.0, 100.0);
    let mut steps = 0;
    while viewport.zoom_in(bounds) {
        steps += 1;
        assert!(steps < 200, "zoom-in never hit its bound");
    }
    // The largest view-space dimension has reached the guard.
    assert!(100.0 * viewport.scale() >= MAX_ZOOM_EXTENT);
    let scale = viewport.scale();
    assert!(!viewport.zoom_in(bounds));
    assert_eq!(viewport.scale(), scale);
}

#[test]
fn zoom_out_rejected_at_minimum_extent() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    let bounds = items(1000.0, 500.0);
    let mut steps = 0;
    while viewport.zoom_out(bounds) {
        steps += 1;
        assert!(steps < 200, "zoom-out never hit its bound");
    }
    // The smallest view-space dimension has dropped to the floor.
    assert!(500.0 * viewport.scale() <= MIN_ZOOM_EXTENT);
    let scale = viewport.scale();
    assert!(!viewport.zoom_out(bounds));
    assert_eq!(viewport.scale(), scale);
}

#[test]
fn zoom_steps_multiply_by_the_step_factor() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    let bounds = items(100.0, 100.0);
    assert!(viewport.zoom_in(bounds));
    assert!((viewport.scale() - ZOOM_STEP).abs() < 1e-6);
    assert!(viewport.zoom_out(bounds));
    assert!((viewport.scale() - 1.0).abs() < 1e-6);
}

#[test]
fn zoom_out_rejected_on_empty_scene() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    assert!(!viewport.zoom_out(empty_items()));
    assert_eq!(viewport.scale(), 1.0);
}

#[test]
fn zoom_keeps_the_view_center_fixed() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    let bounds = items(1000.0, 1000.0);
    viewport.center_on(pos2(500.0, 500.0));
    viewport.recalc_scene_rect(bounds);
    assert!(viewport.zoom_in(bounds));
    let center = viewport.view_center_scene();
    assert!((center.x - 500.0).abs() < 1e-2);
    assert!((center.y - 500.0).abs() < 1e-2);
}

// --- Fit and toggle --------------------------------------------------------

#[test]
fn fit_rect_fits_preserving_aspect_ratio() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    let bounds = items(2000.0, 2000.0);
    let target = Rect::from_min_max(pos2(30.0, 40.0), pos2(130.0, 120.0)); // 100 x 80
    viewport.fit_rect(target, None, bounds);
    // min(800/100, 600/80) = 7.5
    assert!((viewport.scale() - 7.5).abs() < 1e-4);
    let center = viewport.view_center_scene();
    assert!((center.x - 80.0).abs() < 1e-2);
    assert!((center.y - 80.0).abs() < 1e-2);
}

#[test]
fn fit_rect_toggles_back_to_the_previous_view() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    let bounds = items(2000.0, 2000.0);
    assert!(viewport.zoom_in(bounds));
    let pre_scale = viewport.scale();
    let pre_center = viewport.view_center_scene();

    let target = Rect::from_min_max(pos2(30.0, 40.0), pos2(130.0, 120.0));
    let item = Uuid::new_v4();

    viewport.fit_rect(target, Some(item), bounds);
    assert_eq!(viewport.toggle_target(), Some(item));
    assert!((viewport.scale() - 7.5).abs() < 1e-4);

    // Second call for the same item restores the exact pre-fit view.
    viewport.fit_rect(target, Some(item), bounds);
    assert!((viewport.scale() - pre_scale).abs() < 1e-4);
    let center = viewport.view_center_scene();
    assert!((center.x - pre_center.x).abs() < 1e-2);
    assert!((center.y - pre_center.y).abs() < 1e-2);
    assert_eq!(viewport.toggle_target(), None);

    // Third call fits again.
    viewport.fit_rect(target, Some(item), bounds);
    assert!((viewport.scale() - 7.5).abs() < 1e-4);
}

#[test]
fn fit_rect_with_different_item_discards_the_cache_and_fits() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    let bounds = items(2000.0, 2000.0);
    let first = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
    let second = Rect::from_min_max(pos2(500.0, 500.0), pos2(700.0, 600.0));
    let item1 = Uuid::new_v4();
    let item2 = Uuid::new_v4();

    viewport.fit_rect(first, Some(item1), bounds);
    viewport.fit_rect(second, Some(item2), bounds);

    // A fresh fit, not a restore: the cache is keyed to the second item.
    assert_eq!(viewport.toggle_target(), Some(item2));
    assert!((viewport.scale() - 4.0).abs() < 1e-4); // min(800/200, 600/100)
    let center = viewport.view_center_scene();
    assert!((center.x - 600.0).abs() < 1e-2);
    assert!((center.y - 550.0).abs() < 1e-2);
}

#[test]
fn fit_rect_without_item_discards_the_cache() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    let bounds = items(2000.0, 2000.0);
    let target = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
    viewport.fit_rect(target, Some(Uuid::new_v4()), bounds);
    assert!(viewport.toggle_target().is_some());
    viewport.fit_rect(target, None, bounds);
    assert_eq!(viewport.toggle_target(), None);
}

#[test]
fn reset_previous_transform_keeps_cache_only_for_the_same_item() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    let bounds = items(2000.0, 2000.0);
    let target = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
    let item = Uuid::new_v4();
    viewport.fit_rect(target, Some(item), bounds);

    viewport.reset_previous_transform(Some(item));
    assert_eq!(viewport.toggle_target(), Some(item));

    viewport.reset_previous_transform(Some(Uuid::new_v4()));
    assert_eq!(viewport.toggle_target(), None);
}

#[test]
fn fit_rect_ignores_degenerate_rects() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    let bounds = items(100.0, 100.0);
    let scale = viewport.scale();
    viewport.fit_rect(Rect::from_min_max(pos2(5.0, 5.0), pos2(5.0, 5.0)), None, bounds);
    assert_eq!(viewport.scale(), scale);
}

// --- Pan -------------------------------------------------------------------

#[test]
fn pan_moves_content_with_the_pointer() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    viewport.recalc_scene_rect(items(400.0, 300.0));
    let before = viewport.view_center_scene();
    viewport.pan_by(vec2(10.0, 0.0));
    let after = viewport.view_center_scene();
    // Dragging right reveals content to the left: the view center moves left.
    assert!((after.x - (before.x - 10.0)).abs() < 1e-3);
    assert!((after.y - before.y).abs() < 1e-3);
}

#[test]
fn pan_is_clamped_to_the_scene_rect() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    viewport.recalc_scene_rect(items(400.0, 300.0));
    viewport.pan_by(vec2(1_000_000.0, 1_000_000.0));
    // The visible region's top-left cannot pass the scene rect's corner.
    let top_left = viewport.map_to_scene(pos2(0.0, 0.0));
    assert!((top_left.x - viewport.scene_rect().min.x).abs() < 1e-2);
    assert!((top_left.y - viewport.scene_rect().min.y).abs() < 1e-2);
}

// --- Pan state machine -----------------------------------------------------

#[test]
fn middle_button_press_starts_a_pan() {
    let mut panner = Panner::default();
    let outcome = panner.handle(PointerEvent::Pressed {
        button: PointerButton::Middle,
        alt: false,
        pos: pos2(10.0, 10.0),
    });
    assert_eq!(outcome, PanOutcome::Started);
    assert!(panner.is_panning());

    let outcome = panner.handle(PointerEvent::Moved { pos: pos2(15.0, 8.0) });
    assert_eq!(outcome, PanOutcome::Panned(vec2(5.0, -2.0)));

    // Deltas accumulate from the previous event, not the press origin.
    let outcome = panner.handle(PointerEvent::Moved { pos: pos2(15.0, 10.0) });
    assert_eq!(outcome, PanOutcome::Panned(vec2(0.0, 2.0)));

    assert_eq!(panner.handle(PointerEvent::Released), PanOutcome::Finished);
    assert!(!panner.is_panning());
}

#[test]
fn alt_primary_press_starts_a_pan() {
    let mut panner = Panner::default();
    let outcome = panner.handle(PointerEvent::Pressed {
        button: PointerButton::Primary,
        alt: true,
        pos: pos2(0.0, 0.0),
    });
    assert_eq!(outcome, PanOutcome::Started);
}

#[test]
fn plain_primary_press_passes_through() {
    let mut panner = Panner::default();
    let outcome = panner.handle(PointerEvent::Pressed {
        button: PointerButton::Primary,
        alt: false,
        pos: pos2(0.0, 0.0),
    });
    assert_eq!(outcome, PanOutcome::Passthrough);
    assert!(!panner.is_panning());

    // Moves and releases outside a pan also pass through.
    let outcome = panner.handle(PointerEvent::Moved { pos: pos2(5.0, 5.0) });
    assert_eq!(outcome, PanOutcome::Passthrough);
    assert_eq!(panner.handle(PointerEvent::Released), PanOutcome::Passthrough);
}

#[test]
fn second_press_while_panning_passes_through() {
    let mut panner = Panner::default();
    panner.handle(PointerEvent::Pressed {
        button: PointerButton::Middle,
        alt: false,
        pos: pos2(0.0, 0.0),
    });
    let outcome = panner.handle(PointerEvent::Pressed {
        button: PointerButton::Middle,
        alt: false,
        pos: pos2(1.0, 1.0),
    });
    assert_eq!(outcome, PanOutcome::Passthrough);
}

// --- Reset -----------------------------------------------------------------

#[test]
fn reset_restores_identity_and_clears_the_toggle_cache() {
    let mut viewport = Viewport::new(vec2(800.0, 600.0));
    let bounds = items(500.0, 500.0);
    viewport.fit_rect(
        Rect::from_min_max(pos2(0.0, 0.0), pos2(50.0, 50.0)),
        Some(Uuid::new_v4()),
        bounds,
    );
    assert!(viewport.toggle_target().is_some());

    viewport.reset(empty_items());
    assert_eq!(viewport.scale(), 1.0);
    assert_eq!(viewport.toggle_target(), None);
    assert_eq!(viewport.view_center_scene(), pos2(400.0, 300.0));
}

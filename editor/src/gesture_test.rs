#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{ElementId, StickerPatch, TextPatch};

fn store_with_sticker_at(x: f64, y: f64) -> (EditorStore, ElementRef) {
    let mut store = EditorStore::new();
    let id = store.add_sticker(&StickerPatch { x: Some(x), y: Some(y), ..StickerPatch::default() });
    (store, ElementRef::sticker(id))
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_commits_original_plus_delta() {
    let (mut store, target) = store_with_sticker_at(10.0, 20.0);
    let mut tracker = GestureTracker::unrestricted();

    tracker.begin_drag(&store, target).unwrap();
    assert_eq!(tracker.state(), Gesture::Dragging { target, origin: Point::new(10.0, 20.0) });
    // Nothing moves until release.
    assert_eq!(store.element(target).unwrap().position(), Point::new(10.0, 20.0));

    let pos = tracker.end_drag(&mut store, Delta::new(30.0, -5.0)).unwrap();
    assert_eq!(pos, Point::new(40.0, 15.0));
    assert_eq!(tracker.state(), Gesture::Idle);
}

#[test]
fn unrestricted_drag_may_leave_canvas() {
    let (mut store, target) = store_with_sticker_at(10.0, 10.0);
    store.set_canvas_size(Size::new(300.0, 200.0));
    let mut tracker = GestureTracker::unrestricted();
    tracker.begin_drag(&store, target).unwrap();
    let pos = tracker.end_drag(&mut store, Delta::new(-100.0, 500.0)).unwrap();
    assert_eq!(pos, Point::new(-90.0, 510.0));
}

#[test]
fn restricted_drag_stays_inside_canvas() {
    let (mut store, target) = store_with_sticker_at(10.0, 10.0);
    store.set_canvas_size(Size::new(300.0, 200.0));
    let mut tracker = GestureTracker::new();

    tracker.begin_drag(&store, target).unwrap();
    let pos = tracker.end_drag(&mut store, Delta::new(-100.0, 500.0)).unwrap();
    // Sticker is 100x100, so the farthest corner is (200, 100).
    assert_eq!(pos, Point::new(0.0, 100.0));

    tracker.begin_drag(&store, target).unwrap();
    let pos = tracker.end_drag(&mut store, Delta::new(50.0, -30.0)).unwrap();
    assert_eq!(pos, Point::new(50.0, 70.0));
}

#[test]
fn drag_commits_from_origin_despite_mid_drag_edit() {
    let (mut store, target) = store_with_sticker_at(10.0, 20.0);
    let mut tracker = GestureTracker::unrestricted();
    tracker.begin_drag(&store, target).unwrap();

    store.update_sticker(target.id, &StickerPatch { x: Some(100.0), ..StickerPatch::default() }).unwrap();
    let pos = tracker.end_drag(&mut store, Delta::new(5.0, 0.0)).unwrap();
    assert_eq!(pos, Point::new(15.0, 20.0));
    assert_eq!(store.element(target).unwrap().position(), Point::new(15.0, 20.0));
}

#[test]
fn restricted_drag_stays_inside_canvas_after_mid_drag_edit() {
    let (mut store, target) = store_with_sticker_at(0.0, 0.0);
    store.set_canvas_size(Size::new(300.0, 200.0));
    let mut tracker = GestureTracker::new();
    tracker.begin_drag(&store, target).unwrap();

    store.update_sticker(target.id, &StickerPatch { x: Some(150.0), ..StickerPatch::default() }).unwrap();
    let pos = tracker.end_drag(&mut store, Delta::new(200.0, 0.0)).unwrap();
    // 100-wide sticker on a 300-wide canvas: x may not exceed 200.
    assert_eq!(pos, Point::new(200.0, 0.0));
}

#[test]
fn restricted_drag_is_unbounded_while_canvas_unmeasured() {
    let (mut store, target) = store_with_sticker_at(10.0, 10.0);
    let mut tracker = GestureTracker::new();
    tracker.begin_drag(&store, target).unwrap();
    let pos = tracker.end_drag(&mut store, Delta::new(-20.0, 0.0)).unwrap();
    assert_eq!(pos, Point::new(-10.0, 10.0));
}

#[test]
fn oversized_element_pins_to_origin() {
    let (mut store, target) = store_with_sticker_at(0.0, 0.0);
    store.set_canvas_size(Size::new(60.0, 60.0));
    let mut tracker = GestureTracker::new();
    tracker.begin_drag(&store, target).unwrap();
    let pos = tracker.end_drag(&mut store, Delta::new(25.0, 25.0)).unwrap();
    assert_eq!(pos, Point::new(0.0, 0.0));
}

#[test]
fn non_finite_delta_is_ignored() {
    let (mut store, target) = store_with_sticker_at(10.0, 10.0);
    let mut tracker = GestureTracker::unrestricted();
    tracker.begin_drag(&store, target).unwrap();
    let pos = tracker.end_drag(&mut store, Delta::new(f64::NAN, 5.0)).unwrap();
    assert_eq!(pos, Point::new(10.0, 15.0));
}

#[test]
fn drag_of_missing_element_is_not_found() {
    let store = EditorStore::new();
    let mut tracker = GestureTracker::new();
    let target = ElementRef::text(ElementId(3));
    assert_eq!(tracker.begin_drag(&store, target).unwrap_err(), EditorError::NotFound(target));
    assert_eq!(tracker.state(), Gesture::Idle);
}

#[test]
fn element_removed_mid_drag_is_not_found_and_resets() {
    let mut store = EditorStore::new();
    let id = store.add_text_box(&TextPatch::default());
    let target = ElementRef::text(id);
    let mut tracker = GestureTracker::new();
    tracker.begin_drag(&store, target).unwrap();
    store.remove_text_box(id).unwrap();

    assert_eq!(tracker.end_drag(&mut store, Delta::new(1.0, 1.0)).unwrap_err(), EditorError::NotFound(target));
    assert_eq!(tracker.state(), Gesture::Idle);
}

// =============================================================
// Resize
// =============================================================

#[test]
fn resize_ticks_are_absolute() {
    let (mut store, target) = store_with_sticker_at(0.0, 0.0);
    let mut tracker = GestureTracker::new();
    tracker.begin_resize(&store, target).unwrap();

    assert_eq!(tracker.resize_tick(&mut store, Size::new(150.0, 120.0)).unwrap(), Size::new(150.0, 120.0));
    assert_eq!(tracker.resize_tick(&mut store, Size::new(160.0, 110.0)).unwrap(), Size::new(160.0, 110.0));
    assert_eq!(tracker.end_resize().unwrap(), target);
    assert_eq!(store.element(target).unwrap().size(), Size::new(160.0, 110.0));
    assert_eq!(tracker.state(), Gesture::Idle);
}

#[test]
fn resize_ticks_clamp_stickers() {
    let (mut store, target) = store_with_sticker_at(0.0, 0.0);
    let mut tracker = GestureTracker::new();
    tracker.begin_resize(&store, target).unwrap();
    assert_eq!(tracker.resize_tick(&mut store, Size::new(10.0, 900.0)).unwrap(), Size::new(50.0, 400.0));
}

#[test]
fn cancel_resize_restores_original_size() {
    let (mut store, target) = store_with_sticker_at(0.0, 0.0);
    let mut tracker = GestureTracker::new();
    tracker.begin_resize(&store, target).unwrap();
    tracker.resize_tick(&mut store, Size::new(300.0, 300.0)).unwrap();

    tracker.cancel(&mut store).unwrap();
    assert_eq!(store.element(target).unwrap().size(), Size::new(100.0, 100.0));
    assert_eq!(tracker.state(), Gesture::Idle);
}

#[test]
fn cancel_resize_restores_auto_height_text_box() {
    let mut store = EditorStore::new();
    let id = store.add_text_box(&TextPatch::default());
    let target = ElementRef::text(id);
    let mut tracker = GestureTracker::new();

    tracker.begin_resize(&store, target).unwrap();
    tracker.resize_tick(&mut store, Size::new(300.0, 80.0)).unwrap();
    assert_eq!(store.text_box(id).unwrap().height, Some(80.0));

    tracker.cancel(&mut store).unwrap();
    let text = store.text_box(id).unwrap();
    assert_eq!(text.width, 200.0);
    assert_eq!(text.height, None);
}

#[test]
fn cancel_resize_restores_explicit_text_height() {
    let mut store = EditorStore::new();
    let id = store.add_text_box(&TextPatch { height: Some(60.0), ..TextPatch::default() });
    let target = ElementRef::text(id);
    let mut tracker = GestureTracker::new();

    tracker.begin_resize(&store, target).unwrap();
    tracker.resize_tick(&mut store, Size::new(120.0, 90.0)).unwrap();
    tracker.cancel(&mut store).unwrap();
    assert_eq!(store.text_box(id).unwrap().height, Some(60.0));
}

#[test]
fn cancel_drag_leaves_store_untouched() {
    let (mut store, target) = store_with_sticker_at(5.0, 5.0);
    let mut tracker = GestureTracker::new();
    tracker.begin_drag(&store, target).unwrap();
    tracker.cancel(&mut store).unwrap();
    assert_eq!(store.element(target).unwrap().position(), Point::new(5.0, 5.0));
    assert_eq!(tracker.state(), Gesture::Idle);
}

#[test]
fn cancel_when_idle_is_noop() {
    let mut store = EditorStore::new();
    let mut tracker = GestureTracker::new();
    tracker.cancel(&mut store).unwrap();
    assert_eq!(tracker.state(), Gesture::Idle);
}

// =============================================================
// Mismatches
// =============================================================

#[test]
fn second_gesture_while_active_is_mismatch() {
    let (store, target) = store_with_sticker_at(0.0, 0.0);
    let mut tracker = GestureTracker::new();
    tracker.begin_drag(&store, target).unwrap();

    let err = tracker.begin_resize(&store, target).unwrap_err();
    assert_eq!(err, EditorError::GestureMismatch { expected: "idle", active: "dragging" });
    assert_eq!(tracker.state().target(), Some(target));
}

#[test]
fn ending_wrong_gesture_is_mismatch() {
    let (mut store, target) = store_with_sticker_at(0.0, 0.0);
    let mut tracker = GestureTracker::new();

    let err = tracker.end_drag(&mut store, Delta::new(1.0, 1.0)).unwrap_err();
    assert_eq!(err, EditorError::GestureMismatch { expected: "dragging", active: "idle" });

    tracker.begin_resize(&store, target).unwrap();
    let err = tracker.end_drag(&mut store, Delta::new(1.0, 1.0)).unwrap_err();
    assert_eq!(err, EditorError::GestureMismatch { expected: "dragging", active: "resizing" });
    assert_eq!(tracker.state().name(), "resizing");

    tracker.end_resize().unwrap();
    let err = tracker.end_resize().unwrap_err();
    assert_eq!(err, EditorError::GestureMismatch { expected: "resizing", active: "idle" });
}

//! Gesture tracking for drag and resize interactions.
//!
//! A pointer gesture spans many events, but the store only sees its outcome.
//! `GestureTracker` holds what a gesture needs between pointer-down and
//! pointer-up: the element it targets and that element's geometry at the
//! start. Drags commit once, on release, as a displacement from the original
//! position. Resizes write the absolute size on every tick.
//!
//! Only one gesture is active at a time. Out-of-order calls (ending a drag
//! while resizing, starting a second gesture) return
//! [`EditorError::GestureMismatch`] and leave the tracker unchanged.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use tracing::debug;

use crate::doc::{ElementRef, Extent};
use crate::error::EditorError;
use crate::geometry::{Delta, Point, Size};
use crate::store::EditorStore;

/// The gesture currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// Nothing in progress.
    #[default]
    Idle,
    /// An element is being dragged.
    Dragging {
        target: ElementRef,
        /// Element position when the drag began.
        origin: Point,
    },
    /// An element is being resized.
    Resizing {
        target: ElementRef,
        /// Stored width and height when the resize began; restored on cancel.
        original: Extent,
    },
}

impl Gesture {
    /// Short name used in mismatch errors and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "dragging",
            Self::Resizing { .. } => "resizing",
        }
    }

    #[must_use]
    pub fn target(&self) -> Option<ElementRef> {
        match self {
            Self::Idle => None,
            Self::Dragging { target, .. } | Self::Resizing { target, .. } => Some(*target),
        }
    }
}

/// Follows one drag or resize at a time and commits it to an [`EditorStore`].
#[derive(Debug, Clone)]
pub struct GestureTracker {
    state: Gesture,
    restrict_to_canvas: bool,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureTracker {
    /// Tracker whose drags keep elements inside the canvas once it is measured.
    #[must_use]
    pub fn new() -> Self {
        Self { state: Gesture::Idle, restrict_to_canvas: true }
    }

    /// Tracker whose drags may leave the canvas.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self { state: Gesture::Idle, restrict_to_canvas: false }
    }

    #[must_use]
    pub fn state(&self) -> Gesture {
        self.state
    }

    fn expect_idle(&self) -> Result<(), EditorError> {
        match self.state {
            Gesture::Idle => Ok(()),
            active => Err(EditorError::GestureMismatch { expected: "idle", active: active.name() }),
        }
    }

    // =========================================================================
    // DRAG
    // =========================================================================

    /// Start dragging `target`.
    ///
    /// # Errors
    ///
    /// `GestureMismatch` if a gesture is already active, `NotFound` if the
    /// element does not exist.
    pub fn begin_drag(&mut self, store: &EditorStore, target: ElementRef) -> Result<(), EditorError> {
        self.expect_idle()?;
        let origin = store.element(target).ok_or(EditorError::NotFound(target))?.position();
        debug!(%target, x = origin.x, y = origin.y, "drag started");
        self.state = Gesture::Dragging { target, origin };
        Ok(())
    }

    /// Finish the drag, placing the element at its starting position plus
    /// `delta`. Edits made to its position mid-drag are overwritten. Returns
    /// the committed position.
    ///
    /// # Errors
    ///
    /// `GestureMismatch` if no drag is active. `NotFound` if the element was
    /// removed mid-drag; the tracker is idle afterwards either way.
    pub fn end_drag(&mut self, store: &mut EditorStore, delta: Delta) -> Result<Point, EditorError> {
        let Gesture::Dragging { target, origin } = self.state else {
            return Err(EditorError::GestureMismatch { expected: "dragging", active: self.state.name() });
        };
        self.state = Gesture::Idle;

        let size = store.element(target).ok_or(EditorError::NotFound(target))?.size();
        let mut delta = Delta::new(finite_or_zero(delta.dx), finite_or_zero(delta.dy));
        let canvas = store.canvas_size();
        if self.restrict_to_canvas && !canvas.is_zero() {
            delta = Delta::new(
                restrict_axis(delta.dx, origin.x, size.width, canvas.width),
                restrict_axis(delta.dy, origin.y, size.height, canvas.height),
            );
        }
        store.move_to(target, origin.offset(delta))
    }

    // =========================================================================
    // RESIZE
    // =========================================================================

    /// Start resizing `target`.
    ///
    /// # Errors
    ///
    /// `GestureMismatch` if a gesture is already active, `NotFound` if the
    /// element does not exist.
    pub fn begin_resize(&mut self, store: &EditorStore, target: ElementRef) -> Result<(), EditorError> {
        self.expect_idle()?;
        let original = store.element(target).ok_or(EditorError::NotFound(target))?.extent();
        debug!(%target, width = original.width, height = ?original.height, "resize started");
        self.state = Gesture::Resizing { target, original };
        Ok(())
    }

    /// Apply one resize tick. `size` is absolute, not a delta.
    ///
    /// # Errors
    ///
    /// `GestureMismatch` if no resize is active, `NotFound` if the element
    /// was removed mid-resize (the tracker goes idle).
    pub fn resize_tick(&mut self, store: &mut EditorStore, size: Size) -> Result<Size, EditorError> {
        let Gesture::Resizing { target, .. } = self.state else {
            return Err(EditorError::GestureMismatch { expected: "resizing", active: self.state.name() });
        };
        store.resize_to(target, size).inspect_err(|_| self.state = Gesture::Idle)
    }

    /// Finish the resize. The last tick already holds the final size.
    ///
    /// # Errors
    ///
    /// `GestureMismatch` if no resize is active.
    pub fn end_resize(&mut self) -> Result<ElementRef, EditorError> {
        let Gesture::Resizing { target, .. } = self.state else {
            return Err(EditorError::GestureMismatch { expected: "resizing", active: self.state.name() });
        };
        self.state = Gesture::Idle;
        Ok(target)
    }

    // =========================================================================
    // CANCEL
    // =========================================================================

    /// Abandon the active gesture. A drag has not touched the store yet; a
    /// resize is rolled back to the stored width and height it began with.
    ///
    /// # Errors
    ///
    /// `NotFound` if a resized element disappeared before the rollback.
    pub fn cancel(&mut self, store: &mut EditorStore) -> Result<(), EditorError> {
        let previous = std::mem::take(&mut self.state);
        if let Gesture::Resizing { target, original } = previous {
            store.restore_extent(target, original)?;
        }
        Ok(())
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Limit a displacement so `[start + d, start + d + extent]` stays inside
/// `[0, bound]`. An element larger than the bound pins to 0.
fn restrict_axis(d: f64, start: f64, extent: f64, bound: f64) -> f64 {
    let lo = -start;
    let hi = (bound - extent - start).max(lo);
    d.clamp(lo, hi)
}

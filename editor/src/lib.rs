//! Meme editor state store.
//!
//! This crate owns the in-progress composition of a meme: the active
//! template, the ordered text-box and sticker elements layered on top of it,
//! the current selection, and the measured canvas size. The rendering layer
//! reads from [`store::EditorStore`] to paint and export, and writes to it in
//! response to clicks, drags, resizes, and property-panel edits.
//!
//! Everything here is synchronous and free of I/O. Template fetching and meme
//! persistence live in the server; this crate only defines the shapes they
//! exchange ([`template::Template`], [`export::MemeDraft`]).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | The editor store and its mutation operations |
//! | [`doc`] | Element types, element references, and sparse patches |
//! | [`template`] | Template and default text placement model |
//! | [`gesture`] | Drag (by delta) and resize (to size) gesture tracking |
//! | [`export`] | Composition snapshot and meme draft for saving |
//! | [`geometry`] | Points, sizes, deltas, and canvas fitting |
//! | [`error`] | Editor error type |
//! | [`consts`] | Defaults and clamp ranges |

pub mod consts;
pub mod doc;
pub mod error;
pub mod export;
pub mod geometry;
pub mod gesture;
pub mod store;
pub mod template;

pub use doc::{
    Element, ElementId, ElementKind, ElementRef, Extent, StickerElement, StickerPatch, TextElement, TextPatch,
};
pub use error::EditorError;
pub use export::{Composition, MemeDraft};
pub use geometry::{CanvasSize, Delta, Point, Size};
pub use gesture::{Gesture, GestureTracker};
pub use store::{EditorStore, TemplateLoad};
pub use template::{Template, TextPlacement};

//! Shared defaults and clamp ranges for editor elements.

// ── Clamp ranges ────────────────────────────────────────────────

/// Smallest allowed text font size in pixels.
pub const FONT_SIZE_MIN: f64 = 12.0;

/// Largest allowed text font size in pixels.
pub const FONT_SIZE_MAX: f64 = 72.0;

/// Smallest allowed text outline width in pixels.
pub const OUTLINE_WIDTH_MIN: f64 = 0.0;

/// Largest allowed text outline width in pixels.
pub const OUTLINE_WIDTH_MAX: f64 = 5.0;

/// Smallest allowed sticker width or height.
pub const STICKER_SIZE_MIN: f64 = 50.0;

/// Largest allowed sticker width or height.
pub const STICKER_SIZE_MAX: f64 = 400.0;

// ── Text defaults ───────────────────────────────────────────────

pub const DEFAULT_TEXT: &str = "Add text here";
pub const DEFAULT_FONT_SIZE: f64 = 24.0;
pub const DEFAULT_FONT_FAMILY: &str = "Impact";
pub const DEFAULT_TEXT_WIDTH: f64 = 200.0;
pub const DEFAULT_TEXT_PADDING: f64 = 10.0;
pub const DEFAULT_TEXT_COLOR: &str = "#FFFFFF";
pub const DEFAULT_OUTLINE_COLOR: &str = "#000000";
pub const DEFAULT_OUTLINE_WIDTH: f64 = 2.0;

// ── Sticker defaults ────────────────────────────────────────────

pub const DEFAULT_STICKER_SIZE: f64 = 100.0;

// ── Placement ───────────────────────────────────────────────────

/// Position used for new elements while the canvas size is still unknown.
pub const FALLBACK_X: f64 = 50.0;

/// Position used for new elements while the canvas size is still unknown.
pub const FALLBACK_Y: f64 = 50.0;

// ── Export ──────────────────────────────────────────────────────

/// Title given to a composition whose template has no title.
pub const UNTITLED_MEME: &str = "My Custom Meme";

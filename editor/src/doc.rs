//! Document model: the elements layered over a template.
//!
//! An [`Element`] is either a [`TextElement`] or a [`StickerElement`]. Each
//! kind has its own identifier space, so elements are addressed by an
//! [`ElementRef`] (kind plus id) wherever both kinds can appear. Sparse edits
//! arrive as [`TextPatch`] / [`StickerPatch`]; applying one clamps every
//! range-limited field, so no element ever holds an out-of-range value.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{
    FONT_SIZE_MAX, FONT_SIZE_MIN, OUTLINE_WIDTH_MAX, OUTLINE_WIDTH_MIN, STICKER_SIZE_MAX, STICKER_SIZE_MIN,
};
use crate::error::EditorError;
use crate::geometry::{Point, Size, non_negative};

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of an element, unique within its kind for one editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Sticker,
}

impl ElementKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Sticker => "sticker",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type-tagged reference to one element.
///
/// Serializes as `{"type": "text", "id": 3}`. The textual form `text-3` is
/// what drag layers use as a draggable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub id: ElementId,
}

impl ElementRef {
    #[must_use]
    pub fn text(id: ElementId) -> Self {
        Self { kind: ElementKind::Text, id }
    }

    #[must_use]
    pub fn sticker(id: ElementId) -> Self {
        Self { kind: ElementKind::Sticker, id }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.id)
    }
}

impl FromStr for ElementRef {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EditorError::InvalidElementRef(s.to_owned());
        let (kind, id) = s.split_once('-').ok_or_else(invalid)?;
        let kind = match kind {
            "text" => ElementKind::Text,
            "sticker" => ElementKind::Sticker,
            _ => return Err(invalid()),
        };
        let id = id.parse::<u64>().map_err(|_| invalid())?;
        Ok(Self { kind, id: ElementId(id) })
    }
}

// =============================================================================
// CLAMPING
// =============================================================================

fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() { min } else { value.clamp(min, max) }
}

/// Clamp a font size into `[FONT_SIZE_MIN, FONT_SIZE_MAX]`. NaN maps to the minimum.
#[must_use]
pub fn clamp_font_size(value: f64) -> f64 {
    clamp_finite(value, FONT_SIZE_MIN, FONT_SIZE_MAX)
}

/// Clamp an outline width into `[OUTLINE_WIDTH_MIN, OUTLINE_WIDTH_MAX]`. NaN maps to the minimum.
#[must_use]
pub fn clamp_outline_width(value: f64) -> f64 {
    clamp_finite(value, OUTLINE_WIDTH_MIN, OUTLINE_WIDTH_MAX)
}

/// Clamp a sticker width or height into `[STICKER_SIZE_MIN, STICKER_SIZE_MAX]`. NaN maps to the minimum.
#[must_use]
pub fn clamp_sticker_dimension(value: f64) -> f64 {
    clamp_finite(value, STICKER_SIZE_MIN, STICKER_SIZE_MAX)
}

// =============================================================================
// TEXT
// =============================================================================

/// Horizontal alignment of text inside its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Bold / italic / underline toggles.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// A text box positioned over the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub id: ElementId,
    pub text: String,
    /// Left edge in canvas units.
    pub x: f64,
    /// Top edge in canvas units.
    pub y: f64,
    pub width: f64,
    /// Explicit box height. When absent the box grows with its content.
    pub height: Option<f64>,
    pub padding: f64,
    pub font_size: f64,
    pub font_family: String,
    pub color: String,
    pub outline_color: String,
    pub outline_width: f64,
    pub style: FontStyle,
    pub align: TextAlign,
    /// Clockwise rotation in degrees.
    pub rotation: f64,
}

impl TextElement {
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Bounding size. Without an explicit height, one line of text plus padding.
    #[must_use]
    pub fn bounds(&self) -> Size {
        let height = self
            .height
            .unwrap_or(self.font_size + 2.0 * self.padding);
        Size::new(self.width, height)
    }

    /// Merge `patch` into this element, clamping range-limited fields.
    pub fn apply(&mut self, patch: &TextPatch) {
        if let Some(ref text) = patch.text {
            self.text.clone_from(text);
        }
        if let Some(x) = patch.x.filter(|v| v.is_finite()) {
            self.x = x;
        }
        if let Some(y) = patch.y.filter(|v| v.is_finite()) {
            self.y = y;
        }
        if let Some(w) = patch.width {
            self.width = non_negative(w);
        }
        if let Some(h) = patch.height {
            self.height = Some(non_negative(h));
        }
        if let Some(p) = patch.padding {
            self.padding = non_negative(p);
        }
        if let Some(size) = patch.font_size {
            self.font_size = size;
        }
        if let Some(ref family) = patch.font_family {
            self.font_family.clone_from(family);
        }
        if let Some(ref color) = patch.color {
            self.color.clone_from(color);
        }
        if let Some(ref color) = patch.outline_color {
            self.outline_color.clone_from(color);
        }
        if let Some(w) = patch.outline_width {
            self.outline_width = w;
        }
        if let Some(bold) = patch.bold {
            self.style.bold = bold;
        }
        if let Some(italic) = patch.italic {
            self.style.italic = italic;
        }
        if let Some(underline) = patch.underline {
            self.style.underline = underline;
        }
        if let Some(align) = patch.align {
            self.align = align;
        }
        if let Some(r) = patch.rotation.filter(|v| v.is_finite()) {
            self.rotation = r;
        }
        self.font_size = clamp_font_size(self.font_size);
        self.outline_width = clamp_outline_width(self.outline_width);
    }
}

/// Sparse update for a text element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl TextPatch {
    /// A patch that only sets the text content.
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Self::default() }
    }
}

// =============================================================================
// STICKER
// =============================================================================

/// An image sticker positioned over the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerElement {
    pub id: ElementId,
    pub image_url: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl StickerElement {
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Merge `patch` into this sticker, clamping both dimensions.
    pub fn apply(&mut self, patch: &StickerPatch) {
        if let Some(ref url) = patch.image_url {
            self.image_url.clone_from(url);
        }
        if let Some(x) = patch.x.filter(|v| v.is_finite()) {
            self.x = x;
        }
        if let Some(y) = patch.y.filter(|v| v.is_finite()) {
            self.y = y;
        }
        if let Some(w) = patch.width {
            self.width = w;
        }
        if let Some(h) = patch.height {
            self.height = h;
        }
        self.width = clamp_sticker_dimension(self.width);
        self.height = clamp_sticker_dimension(self.height);
    }
}

/// Sparse update for a sticker. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl StickerPatch {
    /// A patch that only sets the sticker image.
    #[must_use]
    pub fn with_image(image_url: impl Into<String>) -> Self {
        Self { image_url: Some(image_url.into()), ..Self::default() }
    }
}

// =============================================================================
// ELEMENT
// =============================================================================

/// Either kind of element. List order is z-order: later elements paint on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Text(TextElement),
    Sticker(StickerElement),
}

/// Stored width and height of an element, as opposed to its laid-out
/// [`Size`]. A text box without an explicit height keeps `height: None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub width: f64,
    pub height: Option<f64>,
}

impl Element {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Text(_) => ElementKind::Text,
            Self::Sticker(_) => ElementKind::Sticker,
        }
    }

    #[must_use]
    pub fn element_ref(&self) -> ElementRef {
        match self {
            Self::Text(t) => ElementRef::text(t.id),
            Self::Sticker(s) => ElementRef::sticker(s.id),
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        match self {
            Self::Text(t) => t.position(),
            Self::Sticker(s) => s.position(),
        }
    }

    /// Bounding size used for layout and drag restriction.
    #[must_use]
    pub fn size(&self) -> Size {
        match self {
            Self::Text(t) => t.bounds(),
            Self::Sticker(s) => s.size(),
        }
    }

    /// Move the element's top-left corner. Non-finite coordinates are ignored.
    pub fn set_position(&mut self, pos: Point) {
        match self {
            Self::Text(t) => t.apply(&TextPatch { x: Some(pos.x), y: Some(pos.y), ..TextPatch::default() }),
            Self::Sticker(s) => s.apply(&StickerPatch { x: Some(pos.x), y: Some(pos.y), ..StickerPatch::default() }),
        }
    }

    /// Set the element's absolute size, clamped per kind. Text boxes get an
    /// explicit height.
    pub fn set_size(&mut self, size: Size) {
        match self {
            Self::Text(t) => t.apply(&TextPatch {
                width: Some(size.width),
                height: Some(size.height),
                ..TextPatch::default()
            }),
            Self::Sticker(s) => s.apply(&StickerPatch {
                width: Some(size.width),
                height: Some(size.height),
                ..StickerPatch::default()
            }),
        }
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        match self {
            Self::Text(t) => Extent { width: t.width, height: t.height },
            Self::Sticker(s) => Extent { width: s.width, height: Some(s.height) },
        }
    }

    /// Write back an [`Extent`]. A sticker given no height keeps its own.
    pub fn set_extent(&mut self, extent: Extent) {
        match self {
            Self::Text(t) => {
                t.apply(&TextPatch { width: Some(extent.width), ..TextPatch::default() });
                t.height = extent.height.map(non_negative);
            }
            Self::Sticker(s) => s.apply(&StickerPatch {
                width: Some(extent.width),
                height: extent.height,
                ..StickerPatch::default()
            }),
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            Self::Text(t) => Some(t),
            Self::Sticker(_) => None,
        }
    }

    #[must_use]
    pub fn as_sticker(&self) -> Option<&StickerElement> {
        match self {
            Self::Sticker(s) => Some(s),
            Self::Text(_) => None,
        }
    }
}

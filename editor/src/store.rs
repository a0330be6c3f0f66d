//! The editor store: single source of truth for an in-progress meme.
//!
//! DESIGN
//! ======
//! `EditorStore` is an ordinary value constructed once per editing session
//! and passed to whatever renders or edits it. All mutations are synchronous
//! and apply immediately.
//!
//! Elements of both kinds share one ordered list, so list order is the
//! z-order the renderer paints in. Each kind draws ids from its own counter;
//! counters only move forward, so an id is never reused within a session,
//! not even after `clear_editor`.
//!
//! Newly added elements become the selection, which keeps the property
//! panel pointed at what the user just created.
//!
//! ERROR HANDLING
//! ==============
//! Referencing an element that does not exist returns
//! [`EditorError::NotFound`]; nothing is changed in that case. Out-of-range
//! numbers are clamped, never rejected.
//!
//! TEMPLATE LOADS
//! ==============
//! Fetching a template is asynchronous and happens outside the store.
//! Callers take a [`TemplateLoad`] ticket before fetching and hand it back
//! with the result; only the newest ticket is honored, so a slow response
//! can never overwrite a template the user picked later.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use tracing::{debug, warn};

use crate::consts::{
    DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_OUTLINE_COLOR, DEFAULT_OUTLINE_WIDTH, DEFAULT_STICKER_SIZE,
    DEFAULT_TEXT, DEFAULT_TEXT_COLOR, DEFAULT_TEXT_PADDING, DEFAULT_TEXT_WIDTH, FALLBACK_X, FALLBACK_Y,
};
use crate::doc::{
    Element, ElementId, ElementRef, Extent, FontStyle, StickerElement, StickerPatch, TextAlign, TextElement,
    TextPatch,
};
use crate::error::EditorError;
use crate::geometry::{CanvasSize, Delta, Point, Size};
use crate::template::Template;

/// Ticket identifying one outstanding template fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateLoad(u64);

impl TemplateLoad {
    #[must_use]
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// In-memory state of one editing session.
#[derive(Debug, Clone, Default)]
pub struct EditorStore {
    template: Option<Template>,
    elements: Vec<Element>,
    selection: Option<ElementRef>,
    canvas: CanvasSize,
    title: String,
    next_text_id: u64,
    next_sticker_id: u64,
    load_seq: u64,
}

impl EditorStore {
    /// Create an empty store: no template, no elements, zero canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // TEMPLATE
    // =========================================================================

    /// Replace the template. Clears every element and the selection, resets
    /// the title, and supersedes any outstanding [`TemplateLoad`].
    pub fn set_template(&mut self, template: Template) {
        self.load_seq += 1;
        self.install_template(template);
    }

    /// Start a template fetch. Pass the ticket to [`Self::finish_template_load`].
    pub fn begin_template_load(&mut self) -> TemplateLoad {
        self.load_seq += 1;
        TemplateLoad(self.load_seq)
    }

    /// Apply a fetched template if `ticket` is still the newest load.
    ///
    /// # Errors
    ///
    /// Returns `StaleTemplateLoad` (and leaves the store untouched) if a
    /// newer load or a direct `set_template` happened since `ticket` was taken.
    pub fn finish_template_load(&mut self, ticket: TemplateLoad, template: Template) -> Result<(), EditorError> {
        if ticket.0 != self.load_seq {
            warn!(ticket = ticket.0, latest = self.load_seq, template_id = %template.id, "discarding stale template load");
            return Err(EditorError::StaleTemplateLoad { ticket: ticket.0, latest: self.load_seq });
        }
        self.install_template(template);
        Ok(())
    }

    fn install_template(&mut self, template: Template) {
        debug!(template_id = %template.id, "template loaded");
        self.title = template.default_title();
        self.template = Some(template);
        self.elements.clear();
        self.selection = None;
    }

    /// Append one text box per default placement of the current template.
    ///
    /// # Errors
    ///
    /// Returns `NoTemplate` if no template is loaded.
    pub fn apply_template_placements(&mut self) -> Result<Vec<ElementId>, EditorError> {
        let patches: Vec<TextPatch> = self
            .template
            .as_ref()
            .ok_or(EditorError::NoTemplate)?
            .text_placements
            .iter()
            .map(|p| p.to_patch())
            .collect();
        Ok(patches.iter().map(|patch| self.add_text_box(patch)).collect())
    }

    // =========================================================================
    // CANVAS
    // =========================================================================

    /// Record the measured rendering-surface size. Negative or non-finite
    /// dimensions are stored as zero.
    pub fn set_canvas_size(&mut self, size: CanvasSize) {
        self.canvas = size.non_negative();
    }

    /// Fit a loaded template image to `container_width` and record the result.
    pub fn fit_canvas_to_image(&mut self, image: Size, container_width: f64) -> CanvasSize {
        self.canvas = CanvasSize::fit(image, container_width);
        self.canvas
    }

    /// Top-left corner that centers a box of `size` on the canvas, or the
    /// fixed fallback while the canvas is unmeasured.
    fn centered_origin(&self, size: Size) -> Point {
        if self.canvas.is_zero() {
            return Point::new(FALLBACK_X, FALLBACK_Y);
        }
        Point::new(
            ((self.canvas.width - size.width) / 2.0).max(0.0),
            ((self.canvas.height - size.height) / 2.0).max(0.0),
        )
    }

    // =========================================================================
    // TEXT BOXES
    // =========================================================================

    /// Create a text box from defaults merged with `overrides`, append it on
    /// top of the z-order, and select it.
    pub fn add_text_box(&mut self, overrides: &TextPatch) -> ElementId {
        self.next_text_id += 1;
        let id = ElementId(self.next_text_id);
        let mut text = TextElement {
            id,
            text: DEFAULT_TEXT.to_owned(),
            x: 0.0,
            y: 0.0,
            width: DEFAULT_TEXT_WIDTH,
            height: None,
            padding: DEFAULT_TEXT_PADDING,
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            color: DEFAULT_TEXT_COLOR.to_owned(),
            outline_color: DEFAULT_OUTLINE_COLOR.to_owned(),
            outline_width: DEFAULT_OUTLINE_WIDTH,
            style: FontStyle::default(),
            align: TextAlign::default(),
            rotation: 0.0,
        };
        text.apply(overrides);
        let origin = self.centered_origin(text.bounds());
        text.x = overrides.x.filter(|v| v.is_finite()).unwrap_or(origin.x);
        text.y = overrides.y.filter(|v| v.is_finite()).unwrap_or(origin.y);
        self.elements.push(Element::Text(text));
        self.selection = Some(ElementRef::text(id));
        id
    }

    /// Merge `patch` into a text box.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no text box has `id`.
    pub fn update_text_box(&mut self, id: ElementId, patch: &TextPatch) -> Result<&TextElement, EditorError> {
        let text = self.text_mut(id)?;
        text.apply(patch);
        Ok(text)
    }

    /// Remove a text box, clearing the selection if it pointed at it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no text box has `id`.
    pub fn remove_text_box(&mut self, id: ElementId) -> Result<TextElement, EditorError> {
        match self.remove(ElementRef::text(id))? {
            Element::Text(text) => Ok(text),
            Element::Sticker(_) => Err(EditorError::NotFound(ElementRef::text(id))),
        }
    }

    fn text_mut(&mut self, id: ElementId) -> Result<&mut TextElement, EditorError> {
        self.elements
            .iter_mut()
            .find_map(|e| match e {
                Element::Text(t) if t.id == id => Some(t),
                _ => None,
            })
            .ok_or_else(|| not_found(ElementRef::text(id)))
    }

    // =========================================================================
    // STICKERS
    // =========================================================================

    /// Create a sticker from defaults merged with `overrides`, append it on
    /// top of the z-order, and select it.
    pub fn add_sticker(&mut self, overrides: &StickerPatch) -> ElementId {
        self.next_sticker_id += 1;
        let id = ElementId(self.next_sticker_id);
        let mut sticker = StickerElement {
            id,
            image_url: String::new(),
            x: 0.0,
            y: 0.0,
            width: DEFAULT_STICKER_SIZE,
            height: DEFAULT_STICKER_SIZE,
        };
        sticker.apply(overrides);
        let origin = self.centered_origin(sticker.size());
        sticker.x = overrides.x.filter(|v| v.is_finite()).unwrap_or(origin.x);
        sticker.y = overrides.y.filter(|v| v.is_finite()).unwrap_or(origin.y);
        self.elements.push(Element::Sticker(sticker));
        self.selection = Some(ElementRef::sticker(id));
        id
    }

    /// Merge `patch` into a sticker.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no sticker has `id`.
    pub fn update_sticker(&mut self, id: ElementId, patch: &StickerPatch) -> Result<&StickerElement, EditorError> {
        let sticker = self.sticker_mut(id)?;
        sticker.apply(patch);
        Ok(sticker)
    }

    /// Remove a sticker, clearing the selection if it pointed at it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no sticker has `id`.
    pub fn remove_sticker(&mut self, id: ElementId) -> Result<StickerElement, EditorError> {
        match self.remove(ElementRef::sticker(id))? {
            Element::Sticker(sticker) => Ok(sticker),
            Element::Text(_) => Err(EditorError::NotFound(ElementRef::sticker(id))),
        }
    }

    fn sticker_mut(&mut self, id: ElementId) -> Result<&mut StickerElement, EditorError> {
        self.elements
            .iter_mut()
            .find_map(|e| match e {
                Element::Sticker(s) if s.id == id => Some(s),
                _ => None,
            })
            .ok_or_else(|| not_found(ElementRef::sticker(id)))
    }

    // =========================================================================
    // ANY ELEMENT
    // =========================================================================

    fn index_of(&self, target: ElementRef) -> Option<usize> {
        self.elements.iter().position(|e| e.element_ref() == target)
    }

    fn element_mut(&mut self, target: ElementRef) -> Result<&mut Element, EditorError> {
        let index = self.index_of(target).ok_or_else(|| not_found(target))?;
        Ok(&mut self.elements[index])
    }

    fn remove(&mut self, target: ElementRef) -> Result<Element, EditorError> {
        let index = self.index_of(target).ok_or_else(|| not_found(target))?;
        if self.selection == Some(target) {
            self.selection = None;
        }
        Ok(self.elements.remove(index))
    }

    /// Displace an element by `delta` from its current position.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the element does not exist.
    pub fn move_by(&mut self, target: ElementRef, delta: Delta) -> Result<Point, EditorError> {
        let element = self.element_mut(target)?;
        let next = element.position().offset(delta);
        element.set_position(next);
        Ok(element.position())
    }

    /// Place an element's top-left corner at `pos`. A drag commits through
    /// this with the position it started from plus the gesture's delta.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the element does not exist.
    pub fn move_to(&mut self, target: ElementRef, pos: Point) -> Result<Point, EditorError> {
        let element = self.element_mut(target)?;
        element.set_position(pos);
        Ok(element.position())
    }

    /// Set an element's absolute size. This is how each resize tick is
    /// applied. Returns the size after clamping.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the element does not exist.
    pub fn resize_to(&mut self, target: ElementRef, size: Size) -> Result<Size, EditorError> {
        let element = self.element_mut(target)?;
        element.set_size(size);
        Ok(element.size())
    }

    /// Put back an element's width and height exactly as captured by
    /// [`Element::extent`], including a text box's absent height.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the element does not exist.
    pub fn restore_extent(&mut self, target: ElementRef, extent: Extent) -> Result<Size, EditorError> {
        let element = self.element_mut(target)?;
        element.set_extent(extent);
        Ok(element.size())
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    /// Select an element, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` (and keeps the previous selection) if the element
    /// does not exist.
    pub fn set_selected_element(&mut self, target: Option<ElementRef>) -> Result<(), EditorError> {
        if let Some(target) = target
            && self.index_of(target).is_none()
        {
            return Err(not_found(target));
        }
        self.selection = target;
        Ok(())
    }

    // =========================================================================
    // RESET
    // =========================================================================

    /// Reset template, elements, selection, title, and canvas size. Id
    /// counters keep counting.
    pub fn clear_editor(&mut self) {
        self.load_seq += 1;
        self.template = None;
        self.elements.clear();
        self.selection = None;
        self.canvas = CanvasSize::ZERO;
        self.title.clear();
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[must_use]
    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    /// All elements in z-order, bottom first.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Text boxes in z-order.
    pub fn text_boxes(&self) -> impl Iterator<Item = &TextElement> {
        self.elements.iter().filter_map(Element::as_text)
    }

    /// Stickers in z-order.
    pub fn stickers(&self) -> impl Iterator<Item = &StickerElement> {
        self.elements.iter().filter_map(Element::as_sticker)
    }

    #[must_use]
    pub fn text_box(&self, id: ElementId) -> Option<&TextElement> {
        self.text_boxes().find(|t| t.id == id)
    }

    #[must_use]
    pub fn sticker(&self, id: ElementId) -> Option<&StickerElement> {
        self.stickers().find(|s| s.id == id)
    }

    #[must_use]
    pub fn element(&self, target: ElementRef) -> Option<&Element> {
        self.elements.iter().find(|e| e.element_ref() == target)
    }

    #[must_use]
    pub fn selection(&self) -> Option<ElementRef> {
        self.selection
    }

    /// The selected element itself.
    #[must_use]
    pub fn selected(&self) -> Option<&Element> {
        self.selection.and_then(|target| self.element(target))
    }

    #[must_use]
    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }
}

fn not_found(target: ElementRef) -> EditorError {
    debug!(%target, "element not found");
    EditorError::NotFound(target)
}

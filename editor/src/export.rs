//! Export surface: what the rasterizer reads and what gets saved.
//!
//! Rendering a finished meme needs the template image, the canvas size the
//! element coordinates are relative to, and every element in z-order. Saving
//! it needs a title and a tag list next to the flattened image. Neither
//! touches the store's internals; both are assembled from its queries.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use serde::{Deserialize, Serialize};

use crate::doc::Element;
use crate::error::EditorError;
use crate::geometry::CanvasSize;
use crate::store::EditorStore;

/// Borrowed snapshot of everything needed to flatten the meme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composition<'a> {
    pub template_image: &'a str,
    pub canvas: CanvasSize,
    /// Bottom first.
    pub elements: &'a [Element],
}

/// Body of a "save generated meme" request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemeDraft {
    pub title: String,
    /// Flattened image, usually a `data:image/png;base64,...` URL.
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    pub tags: Vec<String>,
}

impl EditorStore {
    /// The composition to rasterize, or `None` without a template.
    #[must_use]
    pub fn composition(&self) -> Option<Composition<'_>> {
        self.template().map(|template| Composition {
            template_image: &template.image_url,
            canvas: self.canvas_size(),
            elements: self.elements(),
        })
    }

    /// Whether there is anything worth exporting: a template with at least
    /// one text box on it.
    #[must_use]
    pub fn can_export(&self) -> bool {
        self.template().is_some() && self.text_boxes().next().is_some()
    }

    /// Build the save request for an already flattened image.
    ///
    /// # Errors
    ///
    /// Returns `NoTemplate` if no template is loaded.
    pub fn meme_draft(&self, image_url: impl Into<String>) -> Result<MemeDraft, EditorError> {
        let template = self.template().ok_or(EditorError::NoTemplate)?;
        let title = match self.title().trim() {
            "" => template.default_title(),
            title => title.to_owned(),
        };
        Ok(MemeDraft { title, image_url: image_url.into(), tags: template.tags.clone() })
    }

    /// File name offered when downloading the current composition.
    #[must_use]
    pub fn download_file_name(&self) -> String {
        download_file_name(self.title())
    }
}

/// `"Edit of Drake"` becomes `"edit-of-drake.png"`. Blank titles fall back
/// to `meme.png`.
#[must_use]
pub fn download_file_name(title: &str) -> String {
    let stem = title.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase();
    if stem.is_empty() { "meme.png".to_owned() } else { format!("{stem}.png") }
}

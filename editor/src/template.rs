//! Template model: the background image and its default text placements.
//!
//! Templates arrive from the API as JSON. Deserialization is deliberately
//! lenient: unknown fields are ignored, every field has a default, and the
//! camelCase names used by older template documents (`imageUrl`,
//! `defaultTextPositions`, `fontSize`, ...) are accepted as aliases.

#[cfg(test)]
#[path = "template_test.rs"]
mod template_test;

use serde::{Deserialize, Serialize};

use crate::doc::TextPatch;

/// A meme template as loaded into the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    #[serde(alias = "_id")]
    pub id: String,
    /// Display name.
    #[serde(alias = "title")]
    pub name: String,
    /// Source image reference (URL or server path).
    #[serde(alias = "imageUrl", alias = "template_url")]
    pub image_url: String,
    pub category: String,
    pub tags: Vec<String>,
    /// Natural image width, when known.
    pub width: Option<f64>,
    /// Natural image height, when known.
    pub height: Option<f64>,
    /// Default text boxes, in placement order.
    #[serde(alias = "defaultTextPositions")]
    pub text_placements: Vec<TextPlacement>,
}

/// One default text box on a template.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPlacement {
    pub text: String,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(alias = "fontSize", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(alias = "fontFamily", skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(alias = "outlineColor", skip_serializing_if = "Option::is_none")]
    pub outline_color: Option<String>,
    #[serde(alias = "outlineWidth", skip_serializing_if = "Option::is_none")]
    pub outline_width: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub rotation: f64,
}

impl TextPlacement {
    /// The overrides a text box seeded from this placement receives.
    #[must_use]
    pub fn to_patch(&self) -> TextPatch {
        TextPatch {
            text: Some(self.text.clone()),
            x: Some(self.x),
            y: Some(self.y),
            width: self.width,
            height: self.height,
            font_size: self.font_size,
            font_family: self.font_family.clone(),
            color: self.color.clone(),
            outline_color: self.outline_color.clone(),
            outline_width: self.outline_width,
            bold: Some(self.bold),
            italic: Some(self.italic),
            underline: Some(self.underline),
            rotation: Some(self.rotation),
            ..TextPatch::default()
        }
    }
}

impl Template {
    /// Default composition title for a meme made from this template.
    #[must_use]
    pub fn default_title(&self) -> String {
        let name = self.name.trim();
        if name.is_empty() {
            crate::consts::UNTITLED_MEME.to_owned()
        } else {
            format!("Edit of {name}")
        }
    }
}

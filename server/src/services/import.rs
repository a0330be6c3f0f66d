//! Template seeding from a JSON file (`memeforge import-templates`).
//!
//! The file is an array of template documents in the same lenient shape the
//! editor accepts (`title` or `name`, `imageUrl` or `image_url`,
//! `defaultTextPositions` or `text_placements`). Documents without tags get
//! their category and its individual words as tags.

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;

use std::path::Path;

use editor::Template;
use sqlx::PgPool;
use tracing::info;

use super::template::{self, NewTemplate, TemplateError};
use crate::error::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("invalid template file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("template #{index}: {source}")]
    Template { index: usize, source: TemplateError },
    #[error(transparent)]
    Store(#[from] TemplateError),
}

impl ErrorCode for ImportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "E_IMPORT_READ",
            Self::Parse(_) => "E_IMPORT_PARSE",
            Self::Template { .. } => "E_IMPORT_TEMPLATE",
            Self::Store(e) => e.error_code(),
        }
    }
}

/// Tags derived from a category: the category itself, then each of its words.
#[must_use]
pub fn default_tags(category: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let category = category.trim();
    for tag in std::iter::once(category).chain(category.split_whitespace()) {
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_owned());
        }
    }
    tags
}

fn to_new_template(doc: Template) -> NewTemplate {
    let tags = if doc.tags.is_empty() { default_tags(&doc.category) } else { doc.tags };
    NewTemplate {
        name: doc.name,
        image_url: doc.image_url,
        category: doc.category,
        tags,
        width: doc.width,
        height: doc.height,
        text_placements: doc.text_placements,
    }
}

/// Parse and validate a seed file's contents.
///
/// # Errors
///
/// Returns `Parse` for malformed JSON and `Template` (with the document's
/// index) for a document missing a name, category, or image.
pub fn parse_seed(json: &str) -> Result<Vec<NewTemplate>, ImportError> {
    let docs: Vec<Template> = serde_json::from_str(json)?;
    docs.into_iter()
        .map(to_new_template)
        .enumerate()
        .map(|(index, t)| t.validated().map_err(|source| ImportError::Template { index, source }))
        .collect()
}

/// Read `path`, then replace (or extend, with `keep_existing`) the templates
/// table with its contents. Returns the number of templates inserted.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the database
/// transaction fails.
pub async fn import_file(pool: &PgPool, path: &Path, keep_existing: bool) -> Result<usize, ImportError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ImportError::Read { path: path.display().to_string(), source })?;
    let templates = parse_seed(&json)?;
    info!(path = %path.display(), count = templates.len(), keep_existing, "importing templates");
    Ok(template::import_templates(pool, templates, keep_existing).await?)
}

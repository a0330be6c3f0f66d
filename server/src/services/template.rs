//! Template service: listing, search, random pick, upload, and usage counts.
//!
//! DESIGN
//! ======
//! Templates are rows in `templates`. Default text placements live in a
//! JSONB column and decode straight into the editor's [`TextPlacement`], so
//! what the API returns is exactly what the editor seeds text boxes from.
//!
//! Listings sort by `uses` (most popular first), then newest. Free-text
//! search matches the name case-insensitively or any tag.

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;

use editor::TextPlacement;
use rand::Rng;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use super::{PageRequest, Pagination, like_pattern, non_blank};
use crate::error::ErrorCode;

/// Maximum rows returned by [`search_templates`].
pub const SEARCH_LIMIT: i64 = 20;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(Uuid),
    #[error("no templates available")]
    NoTemplates,
    #[error("search query is required")]
    EmptyQuery,
    #[error("{0}")]
    Invalid(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for TemplateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_TEMPLATE_NOT_FOUND",
            Self::NoTemplates => "E_NO_TEMPLATES",
            Self::EmptyQuery => "E_EMPTY_QUERY",
            Self::Invalid(_) => "E_TEMPLATE_INVALID",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn public(&self) -> bool {
        !matches!(self, Self::Database(_))
    }
}

/// A template as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateRow {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub category: String,
    pub tags: Vec<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub text_placements: Vec<TextPlacement>,
    pub uses: i64,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

/// Fields for a template about to be inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTemplate {
    pub name: String,
    pub image_url: String,
    pub category: String,
    pub tags: Vec<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub text_placements: Vec<TextPlacement>,
}

impl NewTemplate {
    /// Trim text fields and reject blanks.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` when name, category, or image URL is blank.
    pub fn validated(mut self) -> Result<Self, TemplateError> {
        self.name = self.name.trim().to_owned();
        self.category = self.category.trim().to_owned();
        self.image_url = self.image_url.trim().to_owned();
        if self.name.is_empty() {
            return Err(TemplateError::Invalid("name is required"));
        }
        if self.category.is_empty() {
            return Err(TemplateError::Invalid("category is required"));
        }
        if self.image_url.is_empty() {
            return Err(TemplateError::Invalid("image is required"));
        }
        Ok(self)
    }
}

/// Listing filters. Blank values are ignored.
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

type TemplateTuple = (
    Uuid,
    String,
    String,
    String,
    Vec<String>,
    Option<f64>,
    Option<f64>,
    Json<Vec<TextPlacement>>,
    i64,
    i64,
);

const COLUMNS: &str = "id, name, image_url, category, tags, width, height, text_placements, uses, \
                       (EXTRACT(EPOCH FROM created_at) * 1000)::BIGINT";

fn from_tuple(t: TemplateTuple) -> TemplateRow {
    let (id, name, image_url, category, tags, width, height, Json(text_placements), uses, created_at) = t;
    TemplateRow { id, name, image_url, category, tags, width, height, text_placements, uses, created_at }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &TemplateFilter) {
    builder.push(" WHERE TRUE");
    if let Some(search) = non_blank(filter.search.as_deref()) {
        let pattern = like_pattern(search);
        builder.push(" AND (name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE ");
        builder.push_bind(pattern);
        builder.push("))");
    }
    if let Some(category) = non_blank(filter.category.as_deref()) {
        builder.push(" AND category = ");
        builder.push_bind(category.to_owned());
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// One page of templates, most used first.
///
/// # Errors
///
/// Returns a database error if either query fails.
pub async fn list_templates(
    pool: &PgPool,
    filter: &TemplateFilter,
    page: PageRequest,
) -> Result<(Vec<TemplateRow>, Pagination), TemplateError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM templates");
    push_filters(&mut count, filter);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut select = QueryBuilder::new(format!("SELECT {COLUMNS} FROM templates"));
    push_filters(&mut select, filter);
    select.push(" ORDER BY uses DESC, created_at DESC LIMIT ");
    select.push_bind(page.limit);
    select.push(" OFFSET ");
    select.push_bind(page.offset());
    let rows = select.build_query_as::<TemplateTuple>().fetch_all(pool).await?;

    Ok((rows.into_iter().map(from_tuple).collect(), page.info(total)))
}

/// Up to [`SEARCH_LIMIT`] templates matching `query`.
///
/// # Errors
///
/// Returns `EmptyQuery` for a blank query, or a database error.
pub async fn search_templates(pool: &PgPool, query: &str) -> Result<Vec<TemplateRow>, TemplateError> {
    let query = non_blank(Some(query)).ok_or(TemplateError::EmptyQuery)?;
    let filter = TemplateFilter { search: Some(query.to_owned()), category: None };

    let mut select = QueryBuilder::new(format!("SELECT {COLUMNS} FROM templates"));
    push_filters(&mut select, &filter);
    select.push(" ORDER BY uses DESC, created_at DESC LIMIT ");
    select.push_bind(SEARCH_LIMIT);
    let rows = select.build_query_as::<TemplateTuple>().fetch_all(pool).await?;

    Ok(rows.into_iter().map(from_tuple).collect())
}

/// One template chosen uniformly at random.
///
/// # Errors
///
/// Returns `NoTemplates` when the table is empty, or a database error.
pub async fn random_template(pool: &PgPool) -> Result<TemplateRow, TemplateError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM templates").fetch_one(pool).await?;
    if total <= 0 {
        return Err(TemplateError::NoTemplates);
    }
    let offset = rand::rng().random_range(0..total);

    let row = sqlx::query_as::<_, TemplateTuple>(&format!(
        "SELECT {COLUMNS} FROM templates ORDER BY id LIMIT 1 OFFSET $1"
    ))
    .bind(offset)
    .fetch_optional(pool)
    .await?
    .ok_or(TemplateError::NoTemplates)?;

    Ok(from_tuple(row))
}

/// Fetch one template.
///
/// # Errors
///
/// Returns `NotFound` if absent, or a database error.
pub async fn get_template(pool: &PgPool, id: Uuid) -> Result<TemplateRow, TemplateError> {
    let row = sqlx::query_as::<_, TemplateTuple>(&format!("SELECT {COLUMNS} FROM templates WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(TemplateError::NotFound(id))?;
    Ok(from_tuple(row))
}

// =============================================================================
// MUTATIONS
// =============================================================================

async fn insert<'e, E>(executor: E, template: &NewTemplate) -> Result<TemplateRow, TemplateError>
where
    E: sqlx::PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, TemplateTuple>(&format!(
        "INSERT INTO templates (id, name, image_url, category, tags, width, height, text_placements)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&template.name)
    .bind(&template.image_url)
    .bind(&template.category)
    .bind(&template.tags)
    .bind(template.width)
    .bind(template.height)
    .bind(Json(&template.text_placements))
    .fetch_one(executor)
    .await?;
    Ok(from_tuple(row))
}

/// Insert a new template.
///
/// # Errors
///
/// Returns `Invalid` for blank required fields, or a database error.
pub async fn create_template(pool: &PgPool, template: NewTemplate) -> Result<TemplateRow, TemplateError> {
    let template = template.validated()?;
    let row = insert(pool, &template).await?;
    info!(template_id = %row.id, name = %row.name, "template created");
    Ok(row)
}

/// Increment a template's usage count and return the updated row.
///
/// # Errors
///
/// Returns `NotFound` if absent, or a database error.
pub async fn increment_use(pool: &PgPool, id: Uuid) -> Result<TemplateRow, TemplateError> {
    let row = sqlx::query_as::<_, TemplateTuple>(&format!(
        "UPDATE templates SET uses = uses + 1 WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(TemplateError::NotFound(id))?;
    Ok(from_tuple(row))
}

/// Insert many templates in one transaction, optionally deleting every
/// existing template first. Returns the number inserted.
///
/// # Errors
///
/// Returns `Invalid` (before touching the database) if any template has a
/// blank required field, or a database error; nothing is committed then.
pub async fn import_templates(
    pool: &PgPool,
    templates: Vec<NewTemplate>,
    keep_existing: bool,
) -> Result<usize, TemplateError> {
    let templates = templates.into_iter().map(NewTemplate::validated).collect::<Result<Vec<_>, _>>()?;

    let mut tx = pool.begin().await?;
    if !keep_existing {
        let deleted = sqlx::query("DELETE FROM templates").execute(&mut *tx).await?.rows_affected();
        info!(deleted, "cleared existing templates");
    }
    for template in &templates {
        insert(&mut *tx, template).await?;
    }
    tx.commit().await?;

    info!(inserted = templates.len(), "templates imported");
    Ok(templates.len())
}

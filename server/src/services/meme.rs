//! Meme service: the gallery of saved memes.
//!
//! DESIGN
//! ======
//! A meme is a finished image plus metadata. Uploaded memes carry optional
//! top/bottom captions; memes flattened by the editor carry only a title and
//! the template's tags. Viewing a meme counts a view, liking counts a like,
//! and both return the updated row.
//!
//! ERROR HANDLING
//! ==============
//! Deleting returns the removed row so the caller can clean up the stored
//! image. The row is gone before the file is touched; a file that fails to
//! delete is logged by the caller, not rolled back.

#[cfg(test)]
#[path = "meme_test.rs"]
mod tests;

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use super::{PageRequest, Pagination, like_pattern, non_blank};
use crate::error::ErrorCode;

pub const DEFAULT_CATEGORY: &str = "other";
pub const DEFAULT_CREATED_BY: &str = "Anonymous";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MemeError {
    #[error("meme not found: {0}")]
    NotFound(Uuid),
    #[error("unknown sort field: {0}")]
    InvalidSort(String),
    #[error("{0}")]
    Invalid(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for MemeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_MEME_NOT_FOUND",
            Self::InvalidSort(_) => "E_MEME_SORT",
            Self::Invalid(_) => "E_MEME_INVALID",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn public(&self) -> bool {
        !matches!(self, Self::Database(_))
    }
}

/// A meme as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemeRow {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
    pub top_text: String,
    pub bottom_text: String,
    pub category: String,
    pub tags: Vec<String>,
    pub created_by: String,
    pub views: i64,
    pub likes: i64,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

/// Fields for a meme about to be inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMeme {
    pub title: String,
    pub image_url: String,
    pub top_text: String,
    pub bottom_text: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub created_by: Option<String>,
}

impl NewMeme {
    /// Trim the title, default category and author, and reject blanks.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` when the title or image URL is blank.
    pub fn validated(mut self) -> Result<Self, MemeError> {
        self.title = self.title.trim().to_owned();
        if self.title.is_empty() {
            return Err(MemeError::Invalid("title is required"));
        }
        if self.image_url.trim().is_empty() {
            return Err(MemeError::Invalid("image is required"));
        }
        let category = non_blank(self.category.as_deref()).unwrap_or(DEFAULT_CATEGORY).to_owned();
        let created_by = non_blank(self.created_by.as_deref()).unwrap_or(DEFAULT_CREATED_BY).to_owned();
        self.category = Some(category);
        self.created_by = Some(created_by);
        Ok(self)
    }
}

/// Column a meme listing is sorted by, always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemeSort {
    #[default]
    CreatedAt,
    Views,
    Likes,
    Title,
}

impl MemeSort {
    /// Parse a `sort_by` query value. Accepts snake and camel case.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSort` for any other column name.
    pub fn parse(raw: &str) -> Result<Self, MemeError> {
        match raw.trim() {
            "" | "created_at" | "createdAt" => Ok(Self::CreatedAt),
            "views" => Ok(Self::Views),
            "likes" => Ok(Self::Likes),
            "title" => Ok(Self::Title),
            other => Err(MemeError::InvalidSort(other.to_owned())),
        }
    }

    fn order_by(self) -> &'static str {
        match self {
            Self::CreatedAt => " ORDER BY created_at DESC, id",
            Self::Views => " ORDER BY views DESC, created_at DESC, id",
            Self::Likes => " ORDER BY likes DESC, created_at DESC, id",
            Self::Title => " ORDER BY title DESC, created_at DESC, id",
        }
    }
}

/// Listing filters. `category = "all"` and blank values mean no filter.
#[derive(Debug, Clone, Default)]
pub struct MemeFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Aggregate gallery statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemeStats {
    pub total_memes: i64,
    pub total_views: i64,
    pub total_likes: i64,
    /// Mean likes per meme, rounded to two decimals.
    pub avg_likes: f64,
    pub category_distribution: BTreeMap<String, i64>,
}

type MemeTuple = (Uuid, String, String, String, String, String, Vec<String>, String, i64, i64, i64);

const COLUMNS: &str = "id, title, image_url, top_text, bottom_text, category, tags, created_by, views, likes, \
                       (EXTRACT(EPOCH FROM created_at) * 1000)::BIGINT";

fn from_tuple(t: MemeTuple) -> MemeRow {
    let (id, title, image_url, top_text, bottom_text, category, tags, created_by, views, likes, created_at) = t;
    MemeRow { id, title, image_url, top_text, bottom_text, category, tags, created_by, views, likes, created_at }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &MemeFilter) {
    builder.push(" WHERE TRUE");
    if let Some(category) = non_blank(filter.category.as_deref()).filter(|c| !c.eq_ignore_ascii_case("all")) {
        builder.push(" AND category = ");
        builder.push_bind(category.to_owned());
    }
    if let Some(search) = non_blank(filter.search.as_deref()) {
        let pattern = like_pattern(search);
        builder.push(" AND (title ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE ");
        builder.push_bind(pattern);
        builder.push("))");
    }
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// QUERIES
// =============================================================================

/// One page of memes.
///
/// # Errors
///
/// Returns a database error if either query fails.
pub async fn list_memes(
    pool: &PgPool,
    filter: &MemeFilter,
    sort: MemeSort,
    page: PageRequest,
) -> Result<(Vec<MemeRow>, Pagination), MemeError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM memes");
    push_filters(&mut count, filter);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut select = QueryBuilder::new(format!("SELECT {COLUMNS} FROM memes"));
    push_filters(&mut select, filter);
    select.push(sort.order_by());
    select.push(" LIMIT ");
    select.push_bind(page.limit);
    select.push(" OFFSET ");
    select.push_bind(page.offset());
    let rows = select.build_query_as::<MemeTuple>().fetch_all(pool).await?;

    Ok((rows.into_iter().map(from_tuple).collect(), page.info(total)))
}

/// Fetch one meme, counting the view.
///
/// # Errors
///
/// Returns `NotFound` if absent, or a database error.
pub async fn view_meme(pool: &PgPool, id: Uuid) -> Result<MemeRow, MemeError> {
    let row = sqlx::query_as::<_, MemeTuple>(&format!(
        "UPDATE memes SET views = views + 1 WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(MemeError::NotFound(id))?;
    Ok(from_tuple(row))
}

/// Add one like.
///
/// # Errors
///
/// Returns `NotFound` if absent, or a database error.
pub async fn like_meme(pool: &PgPool, id: Uuid) -> Result<MemeRow, MemeError> {
    let row = sqlx::query_as::<_, MemeTuple>(&format!(
        "UPDATE memes SET likes = likes + 1 WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(MemeError::NotFound(id))?;
    Ok(from_tuple(row))
}

/// Insert a new meme.
///
/// # Errors
///
/// Returns `Invalid` for a blank title or image, or a database error.
pub async fn create_meme(pool: &PgPool, meme: NewMeme) -> Result<MemeRow, MemeError> {
    let meme = meme.validated()?;
    let row = sqlx::query_as::<_, MemeTuple>(&format!(
        "INSERT INTO memes (id, title, image_url, top_text, bottom_text, category, tags, created_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&meme.title)
    .bind(&meme.image_url)
    .bind(&meme.top_text)
    .bind(&meme.bottom_text)
    .bind(meme.category.as_deref().unwrap_or(DEFAULT_CATEGORY))
    .bind(&meme.tags)
    .bind(meme.created_by.as_deref().unwrap_or(DEFAULT_CREATED_BY))
    .fetch_one(pool)
    .await?;

    let row = from_tuple(row);
    info!(meme_id = %row.id, title = %row.title, "meme created");
    Ok(row)
}

/// Delete a meme row and return it.
///
/// # Errors
///
/// Returns `NotFound` if absent, or a database error.
pub async fn delete_meme(pool: &PgPool, id: Uuid) -> Result<MemeRow, MemeError> {
    let row = sqlx::query_as::<_, MemeTuple>(&format!("DELETE FROM memes WHERE id = $1 RETURNING {COLUMNS}"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(MemeError::NotFound(id))?;
    info!(meme_id = %id, "meme deleted");
    Ok(from_tuple(row))
}

/// Totals, average likes, and per-category counts. All zero when empty.
///
/// # Errors
///
/// Returns a database error if either query fails.
pub async fn meme_stats(pool: &PgPool) -> Result<MemeStats, MemeError> {
    let (total_memes, total_views, total_likes, avg_likes) = sqlx::query_as::<_, (i64, i64, i64, f64)>(
        "SELECT COUNT(*),
                COALESCE(SUM(views), 0)::BIGINT,
                COALESCE(SUM(likes), 0)::BIGINT,
                COALESCE(AVG(likes), 0)::DOUBLE PRECISION
         FROM memes",
    )
    .fetch_one(pool)
    .await?;

    let categories = sqlx::query_as::<_, (String, i64)>("SELECT category, COUNT(*) FROM memes GROUP BY category")
        .fetch_all(pool)
        .await?;

    Ok(MemeStats {
        total_memes,
        total_views,
        total_likes,
        avg_likes: round2(avg_likes),
        category_distribution: categories.into_iter().collect(),
    })
}

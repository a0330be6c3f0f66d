//! Meme routes.

#[cfg(test)]
#[path = "memes_test.rs"]
mod tests;

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use editor::MemeDraft;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::read_form;
use crate::error::ApiError;
use crate::services::meme::{self, MemeError, MemeFilter, MemeRow, MemeSort, MemeStats, NewMeme};
use crate::services::upload::{ImageKind, decode_data_url};
use crate::services::{PageRequest, Pagination, non_blank, parse_tags};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
}

#[derive(Serialize)]
pub struct MemeListResponse {
    pub memes: Vec<MemeRow>,
    pub pagination: Pagination,
}

pub(crate) fn meme_error_to_status(err: &MemeError) -> StatusCode {
    match err {
        MemeError::NotFound(_) => StatusCode::NOT_FOUND,
        MemeError::InvalidSort(_) | MemeError::Invalid(_) => StatusCode::BAD_REQUEST,
        MemeError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<MemeError> for ApiError {
    fn from(err: MemeError) -> Self {
        ApiError::from_error(meme_error_to_status(&err), &err)
    }
}

/// `GET /api/memes`: paginated gallery.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MemeListResponse>, ApiError> {
    let sort = MemeSort::parse(query.sort_by.as_deref().unwrap_or_default())?;
    let filter = MemeFilter { category: query.category, search: query.search };
    let page = PageRequest::new(query.page, query.limit);
    let (memes, pagination) = meme::list_memes(&state.pool, &filter, sort, page).await?;
    Ok(Json(MemeListResponse { memes, pagination }))
}

/// `GET /api/memes/stats`
pub async fn stats(State(state): State<AppState>) -> Result<Json<MemeStats>, ApiError> {
    Ok(Json(meme::meme_stats(&state.pool).await?))
}

/// `GET /api/memes/{id}`: fetch one meme, counting a view.
pub async fn get_one(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<MemeRow>, ApiError> {
    Ok(Json(meme::view_meme(&state.pool, id).await?))
}

/// `PUT /api/memes/{id}/like`
pub async fn like(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<MemeRow>, ApiError> {
    Ok(Json(meme::like_meme(&state.pool, id).await?))
}

/// `DELETE /api/memes/{id}`: remove the meme and its stored image.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let row = meme::delete_meme(&state.pool, id).await?;
    match state.uploads.remove_url(&row.image_url).await {
        Ok(removed) => info!(meme_id = %id, removed, "meme image cleanup"),
        Err(err) => warn!(meme_id = %id, error = %err, "failed to remove meme image"),
    }
    Ok(Json(serde_json::json!({ "message": "Meme removed" })))
}

/// `POST /api/memes`: multipart upload: `image`, `title`, `top_text`,
/// `bottom_text`, `category`, `tags`.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<MemeRow>), ApiError> {
    let form = read_form(multipart).await?;

    let title = non_blank(form.field(&["title"])).ok_or(MemeError::Invalid("title is required"))?;
    let image = form.image.as_ref().ok_or(MemeError::Invalid("image is required"))?;
    let kind = ImageKind::from_file_name(&image.file_name)?;
    let stored = state.uploads.save(kind, &image.bytes).await?;

    let new = NewMeme {
        title: title.to_owned(),
        image_url: stored.url.clone(),
        top_text: form.field(&["top_text", "topText"]).unwrap_or_default().to_owned(),
        bottom_text: form.field(&["bottom_text", "bottomText"]).unwrap_or_default().to_owned(),
        category: form.field(&["category"]).map(str::to_owned),
        tags: form.field(&["tags"]).map(parse_tags).unwrap_or_default(),
        created_by: form.field(&["created_by", "createdBy"]).map(str::to_owned),
    };
    insert_or_cleanup(&state, new, &stored.url).await
}

/// `POST /api/memes/generated`: save a meme flattened by the editor. A
/// `data:` image URL is decoded and stored; any other URL is kept as-is.
pub async fn save_generated(
    State(state): State<AppState>,
    Json(draft): Json<MemeDraft>,
) -> Result<(StatusCode, Json<MemeRow>), ApiError> {
    if non_blank(Some(draft.title.as_str())).is_none() {
        return Err(MemeError::Invalid("title is required").into());
    }
    let Some(image_url) = non_blank(Some(draft.image_url.as_str())) else {
        return Err(MemeError::Invalid("image is required").into());
    };

    let new = |image_url: String| NewMeme {
        title: draft.title.clone(),
        image_url,
        tags: draft.tags.clone(),
        ..NewMeme::default()
    };

    match decode_data_url(image_url)? {
        Some((kind, bytes)) => {
            let stored = state.uploads.save(kind, &bytes).await?;
            insert_or_cleanup(&state, new(stored.url.clone()), &stored.url).await
        }
        None => Ok((StatusCode::CREATED, Json(meme::create_meme(&state.pool, new(image_url.to_owned())).await?))),
    }
}

async fn insert_or_cleanup(
    state: &AppState,
    new: NewMeme,
    stored_url: &str,
) -> Result<(StatusCode, Json<MemeRow>), ApiError> {
    match meme::create_meme(&state.pool, new).await {
        Ok(row) => Ok((StatusCode::CREATED, Json(row))),
        Err(err) => {
            if let Err(cleanup) = state.uploads.remove_url(stored_url).await {
                warn!(error = %cleanup, url = %stored_url, "failed to remove orphaned upload");
            }
            Err(err.into())
        }
    }
}

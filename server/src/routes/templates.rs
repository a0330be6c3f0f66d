//! Template routes.

#[cfg(test)]
#[path = "templates_test.rs"]
mod tests;

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::read_form;
use crate::error::ApiError;
use crate::services::template::{self, NewTemplate, TemplateError, TemplateFilter, TemplateRow};
use crate::services::upload::ImageKind;
use crate::services::{PageRequest, Pagination, non_blank, parse_tags};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateRow>,
    pub pagination: Pagination,
}

pub(crate) fn template_error_to_status(err: &TemplateError) -> StatusCode {
    match err {
        TemplateError::NotFound(_) | TemplateError::NoTemplates => StatusCode::NOT_FOUND,
        TemplateError::EmptyQuery | TemplateError::Invalid(_) => StatusCode::BAD_REQUEST,
        TemplateError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<TemplateError> for ApiError {
    fn from(err: TemplateError) -> Self {
        ApiError::from_error(template_error_to_status(&err), &err)
    }
}

/// `GET /api/templates`: paginated listing, most used first.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<TemplateListResponse>, ApiError> {
    let filter = TemplateFilter { search: query.search, category: query.category };
    let page = PageRequest::new(query.page, query.limit);
    let (templates, pagination) = template::list_templates(&state.pool, &filter, page).await?;
    Ok(Json(TemplateListResponse { templates, pagination }))
}

/// `GET /api/templates/search?query=`: up to 20 matches.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<TemplateRow>>, ApiError> {
    let rows = template::search_templates(&state.pool, query.query.as_deref().unwrap_or_default()).await?;
    Ok(Json(rows))
}

/// `GET /api/templates/random`
pub async fn random(State(state): State<AppState>) -> Result<Json<TemplateRow>, ApiError> {
    Ok(Json(template::random_template(&state.pool).await?))
}

/// `GET /api/templates/{id}`
pub async fn get_one(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<TemplateRow>, ApiError> {
    Ok(Json(template::get_template(&state.pool, id).await?))
}

/// `PUT /api/templates/{id}/use`: count one use of the template.
pub async fn record_use(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TemplateRow>, ApiError> {
    Ok(Json(template::increment_use(&state.pool, id).await?))
}

/// `POST /api/templates`: multipart upload: `image`, `name`, `category`, `tags`.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<TemplateRow>), ApiError> {
    let form = read_form(multipart).await?;

    let name = non_blank(form.field(&["name", "title"])).ok_or(TemplateError::Invalid("name is required"))?;
    let category = non_blank(form.field(&["category"])).ok_or(TemplateError::Invalid("category is required"))?;
    let image = form.image.as_ref().ok_or(TemplateError::Invalid("image is required"))?;
    let kind = ImageKind::from_file_name(&image.file_name)?;
    let stored = state.uploads.save(kind, &image.bytes).await?;

    let new = NewTemplate {
        name: name.to_owned(),
        image_url: stored.url.clone(),
        category: category.to_owned(),
        tags: form.field(&["tags"]).map(parse_tags).unwrap_or_default(),
        ..NewTemplate::default()
    };
    match template::create_template(&state.pool, new).await {
        Ok(row) => Ok((StatusCode::CREATED, Json(row))),
        Err(err) => {
            if let Err(cleanup) = state.uploads.remove_url(&stored.url).await {
                warn!(error = %cleanup, url = %stored.url, "failed to remove orphaned upload");
            }
            Err(err.into())
        }
    }
}

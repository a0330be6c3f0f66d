//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the template and meme REST endpoints under `/api`, serves stored
//! images from the upload directory at `/uploads`, and wraps everything in
//! permissive CORS plus request tracing. Multipart parsing shared by both
//! upload endpoints lives here too.

pub mod memes;
pub mod templates;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use std::collections::HashMap;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::services::upload::{PUBLIC_PREFIX, UploadError};
use crate::state::AppState;

/// Room for multipart framing and base64 expansion on top of the raw image
/// size limit. Stored bytes are checked against the exact limit separately.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let body_limit = state.config.max_upload_bytes.saturating_mul(2).saturating_add(BODY_OVERHEAD_BYTES);
    let uploads = ServeDir::new(state.uploads.dir());

    Router::new()
        .route("/api/templates", get(templates::list).post(templates::upload))
        .route("/api/templates/search", get(templates::search))
        .route("/api/templates/random", get(templates::random))
        .route("/api/templates/{id}", get(templates::get_one))
        .route("/api/templates/{id}/use", put(templates::record_use))
        .route("/api/memes", get(memes::list).post(memes::upload))
        .route("/api/memes/stats", get(memes::stats))
        .route("/api/memes/generated", post(memes::save_generated))
        .route("/api/memes/{id}", get(memes::get_one).delete(memes::remove))
        .route("/api/memes/{id}/like", put(memes::like))
        .route("/healthz", get(healthz))
        .nest_service(PUBLIC_PREFIX, uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub(crate) fn upload_error_to_status(err: &UploadError) -> StatusCode {
    match err {
        UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        UploadError::Empty | UploadError::UnsupportedType(_) | UploadError::InvalidDataUrl(_) => {
            StatusCode::BAD_REQUEST
        }
        UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::from_error(upload_error_to_status(&err), &err)
    }
}

// =============================================================================
// MULTIPART
// =============================================================================

/// The `image` file part of an upload form.
pub(crate) struct FormFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// An upload form: at most one `image` file plus text fields.
#[derive(Default)]
pub(crate) struct UploadForm {
    pub image: Option<FormFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// First of `names` that is present, trimmed. Lets forms use either
    /// `top_text` or `topText`.
    pub fn field(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.fields.get(*name)).map(|v| v.trim())
    }
}

/// Drain a multipart body into an [`UploadForm`].
pub(crate) async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            form.image = Some(FormFile { file_name, bytes });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, value);
        }
    }
    Ok(form)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    tracing::warn!(error = %err, "rejecting malformed multipart body");
    ApiError::new(err.status(), "E_MULTIPART", err.body_text())
}

//! Image storage for uploaded templates and memes.
//!
//! DESIGN
//! ======
//! Files are written flat into the configured upload directory under a fresh
//! `<uuid>.<ext>` name, so client-supplied names never reach the file system.
//! The router serves that directory at [`PUBLIC_PREFIX`], which makes the
//! stored URL `/uploads/<uuid>.<ext>`.
//!
//! Generated memes arrive as `data:image/...;base64,` URLs. Those are decoded
//! and stored like any other upload; ordinary URLs are kept as-is.

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;

use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;

/// URL path the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("uploaded file is empty")]
    Empty,
    #[error("file too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("malformed data URL: {0}")]
    InvalidDataUrl(&'static str),
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorCode for UploadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "E_UPLOAD_EMPTY",
            Self::TooLarge { .. } => "E_UPLOAD_TOO_LARGE",
            Self::UnsupportedType(_) => "E_UPLOAD_TYPE",
            Self::InvalidDataUrl(_) => "E_UPLOAD_DATA_URL",
            Self::Io(_) => "E_UPLOAD_IO",
        }
    }

    fn public(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

// =============================================================================
// IMAGE KIND
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageKind {
    /// Detect from a client file name's extension.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` for anything other than png/jpg/jpeg/gif/webp.
    pub fn from_file_name(name: &str) -> Result<Self, UploadError> {
        let ext = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "gif" => Ok(Self::Gif),
            "webp" => Ok(Self::Webp),
            _ => Err(UploadError::UnsupportedType(name.to_owned())),
        }
    }

    /// Detect from a MIME type such as `image/png`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` for any other MIME type.
    pub fn from_mime(mime: &str) -> Result<Self, UploadError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/gif" => Ok(Self::Gif),
            "image/webp" => Ok(Self::Webp),
            other => Err(UploadError::UnsupportedType(other.to_owned())),
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Decode a `data:<mime>;base64,<payload>` URL. Returns `None` when `url` is
/// not a data URL at all.
///
/// # Errors
///
/// Returns `InvalidDataUrl` for a data URL that is not base64 encoded or does
/// not decode, and `UnsupportedType` for a non-image MIME type.
pub fn decode_data_url(url: &str) -> Result<Option<(ImageKind, Vec<u8>)>, UploadError> {
    let Some(rest) = url.strip_prefix("data:") else {
        return Ok(None);
    };
    let (header, payload) = rest.split_once(',').ok_or(UploadError::InvalidDataUrl("missing ','"))?;
    let mime = header.strip_suffix(";base64").ok_or(UploadError::InvalidDataUrl("not base64 encoded"))?;
    let kind = ImageKind::from_mime(mime)?;
    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| UploadError::InvalidDataUrl("invalid base64 payload"))?;
    Ok(Some((kind, bytes)))
}

// =============================================================================
// STORE
// =============================================================================

/// A file written by [`UploadStore::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_name: String,
    /// Public URL path, e.g. `/uploads/<uuid>.png`.
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self { dir: dir.into(), max_bytes }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Write `bytes` under a new unique name.
    ///
    /// # Errors
    ///
    /// Returns `Empty` or `TooLarge` for bad sizes, `Io` if the write fails.
    pub async fn save(&self, kind: ImageKind, bytes: &[u8]) -> Result<StoredFile, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > self.max_bytes {
            warn!(size = bytes.len(), max = self.max_bytes, "rejecting oversized upload");
            return Err(UploadError::TooLarge { size: bytes.len(), max: self.max_bytes });
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = format!("{}.{}", Uuid::new_v4(), kind.extension());
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;
        info!(%file_name, size = bytes.len(), "stored upload");

        let url = format!("{PUBLIC_PREFIX}/{file_name}");
        Ok(StoredFile { file_name, url })
    }

    /// Resolve a stored URL back to its file, if it points into this store.
    #[must_use]
    pub fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let name = url.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
        let plain = !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != "..";
        plain.then(|| self.dir.join(name))
    }

    /// Delete the file behind a stored URL. URLs outside the store and files
    /// that are already gone are not errors; returns whether a file was removed.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file exists but cannot be removed.
    pub async fn remove_url(&self, url: &str) -> Result<bool, UploadError> {
        let Some(path) = self.path_for_url(url) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "stored file already missing");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

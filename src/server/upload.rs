//! # Upload Middleware
//!
//! Parses the multipart body before the handler runs. Text parts are collected
//! by name; the single `image` file part is filtered by type and size, then
//! written to the upload directory as `<unix-millis>-<file name>`. Stored files
//! are never cleaned up.

use anyhow::Context;
use axum::{
    async_trait,
    extract::{FromRef, FromRequest, Multipart, Request},
    http::StatusCode,
};
use log::info;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::common::constraints::mentions_image_type;
use crate::server::error::{ApiError, UploadRejection};
use crate::server::state::AppState;

/// Name of the one file part the endpoint accepts.
pub const IMAGE_FIELD: &str = "image";

const DEFAULT_MIME: &str = "application/octet-stream";

/// An accepted image written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Name on disk, `<unix-millis>-<original name>`.
    pub filename: String,
    pub original_name: String,
    pub mimetype: String,
    pub size: u64,
    pub path: PathBuf,
}

/// A multipart submission after the upload filter has run.
#[derive(Debug, Default)]
pub struct UploadedForm {
    fields: HashMap<String, String>,
    pub file: Option<StoredFile>,
}

impl UploadedForm {
    /// A text field, if present and non-empty.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[async_trait]
impl<S> FromRequest<S> for UploadedForm
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| UploadRejection::Malformed(e.body_text()))?;

        let mut form = UploadedForm::default();

        while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            let Some(file_name) = field.file_name().map(str::to_string) else {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value);
                continue;
            };

            // An empty file input still sends a part, with `filename=""`.
            if file_name.is_empty() {
                while field.chunk().await.map_err(multipart_error)?.is_some() {}
                continue;
            }

            if name != IMAGE_FIELD || form.file.is_some() {
                return Err(UploadRejection::UnexpectedField(name).into());
            }

            let mimetype = field.content_type().unwrap_or(DEFAULT_MIME).to_string();
            if !accepts_file(&mimetype, &file_name) {
                return Err(UploadRejection::InvalidFileType.into());
            }

            let mut bytes = Vec::new();
            while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                if (bytes.len() + chunk.len()) as u64 > app.upload.max_file_bytes {
                    return Err(UploadRejection::FileTooLarge.into());
                }
                bytes.extend_from_slice(&chunk);
            }

            form.file = Some(store(&app, &file_name, mimetype, bytes).await?);
        }

        Ok(form)
    }
}

/// File filter: the MIME type and the file extension must both name an
/// accepted image type.
pub fn accepts_file(mimetype: &str, file_name: &str) -> bool {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    mentions_image_type(mimetype) && mentions_image_type(&extension)
}

/// Final path component of a client-supplied file name.
fn base_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

async fn store(
    app: &AppState,
    file_name: &str,
    mimetype: String,
    bytes: Vec<u8>,
) -> Result<StoredFile, ApiError> {
    let original_name = base_name(file_name);
    let filename = format!("{}-{}", app.clock.now().timestamp_millis(), original_name);
    let path = app.upload.dir.join(&filename);

    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("failed to write upload {}", path.display()))?;

    info!("💾 Stored upload {} ({} bytes)", path.display(), bytes.len());

    Ok(StoredFile {
        filename,
        original_name,
        mimetype,
        size: bytes.len() as u64,
        path,
    })
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadRejection::FileTooLarge.into()
    } else {
        UploadRejection::Malformed(e.body_text()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_file() {
        assert!(accepts_file("image/png", "photo.png"));
        assert!(accepts_file("image/jpeg", "photo.JPG"));
        assert!(accepts_file("image/webp", "a.b.webp"));
        assert!(!accepts_file("image/gif", "photo.gif"));
        assert!(!accepts_file("image/png", "photo.gif"));
        assert!(!accepts_file("image/png", "photo"));
        assert!(!accepts_file("text/plain", "notes.png"));
    }

    #[test]
    fn test_base_name_strips_directories() {
        assert_eq!(base_name("../../etc/passwd.png"), "passwd.png");
        assert_eq!(base_name("photo.png"), "photo.png");
        assert_eq!(base_name(".."), "upload");
    }

    #[test]
    fn test_text_treats_empty_as_missing() {
        let mut form = UploadedForm::default();
        form.fields.insert("name".to_string(), String::new());
        form.fields.insert("email".to_string(), "a@b.co".to_string());
        assert_eq!(form.text("name"), None);
        assert_eq!(form.text("email"), Some("a@b.co"));
        assert_eq!(form.text("password"), None);
    }
}

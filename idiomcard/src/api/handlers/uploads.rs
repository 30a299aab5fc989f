use anyhow::anyhow;
use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use minijinja::context;
use tracing::{debug, info, instrument};
use url::Url;

use crate::{
    AppState,
    db::models::file_storage::FileStorageRequest,
    errors::{Error, Result},
    notice,
    types::StorageKey,
};

/// Name of the multipart field carrying the image
const FILE_FIELD: &str = "file";

/// Render the upload form, showing and clearing any pending notice
#[instrument(skip_all)]
pub async fn upload_form(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let notice = notice::from_headers(&headers);
    let has_notice = notice.is_some();

    let page = state.templates.render("upload.html", context! { notice => notice })?;

    if has_notice {
        return Ok(([(header::SET_COOKIE, notice::clear_cookie())], page).into_response());
    }
    Ok(page.into_response())
}

/// Store the uploaded image under its sanitised filename and continue to the scan stage
#[instrument(skip_all)]
pub async fn upload_image(State(state): State<AppState>, multipart: std::result::Result<Multipart, MultipartRejection>) -> Result<Redirect> {
    let mut multipart = multipart.map_err(|e| {
        debug!("Upload is not a multipart request: {}", e);
        Error::MissingFile
    })?;

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::UploadFailed {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(Error::EmptyFilename);
        }
        let key = StorageKey::from_filename(&filename).ok_or_else(|| Error::InvalidFilename { filename: filename.clone() })?;
        let content_type = field.content_type().map(str::to_string);

        let content = field.bytes().await.map_err(|e| Error::UploadFailed {
            message: format!("Failed to read file: {e}"),
        })?;

        let stored = state
            .storage
            .store(FileStorageRequest {
                key,
                content: content.to_vec(),
                content_type,
            })
            .await
            .map_err(|e| Error::UploadFailed { message: e.to_string() })?;

        info!(key = %stored.storage_key, size = stored.size_bytes, "Stored uploaded image");
        return Ok(Redirect::to(&scan_location(&stored.storage_key)?));
    }

    Err(Error::MissingFile)
}

/// `/scan/{key}` with the key encoded as a single path segment
fn scan_location(key: &StorageKey) -> Result<String> {
    let mut url = Url::parse("http://localhost/").map_err(anyhow::Error::from)?;
    url.path_segments_mut()
        .map_err(|()| anyhow!("base URL cannot carry a path"))?
        .clear()
        .push("scan")
        .push(key.as_str());
    Ok(url.path().to_string())
}

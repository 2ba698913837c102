//! Image verification endpoint
//!
//! POST /api/verifyImage takes a multipart form with an `image` file part and
//! a `userId` text part. The response is the full verification result; it is
//! saved in the background and never waits on the store.

use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, warn};

use crate::models::{VerificationRequest, VerificationResult};
use crate::{ApiError, ApiResult, AppState};

/// Headroom for multipart boundaries and the `userId` part
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Name recorded when the upload carries no filename
const DEFAULT_IMAGE_NAME: &str = "image";

/// Parts of the upload form, before validation
#[derive(Debug, Default)]
struct UploadForm {
    image: Option<UploadedImage>,
    user_id: Option<String>,
}

#[derive(Debug)]
struct UploadedImage {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// POST /api/verifyImage
///
/// **Errors:**
/// - 400 Bad Request: no image part, blank `userId`, or a non-image upload
/// - 413 Payload Too Large: image over the configured cap
pub async fn verify_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<VerificationResult>> {
    let max_bytes = state.limits.max_upload_bytes;
    let form = read_form(multipart, max_bytes).await?;

    let image = form
        .image
        .ok_or_else(|| ApiError::BadRequest("No image file provided".to_string()))?;

    let user_id = form.user_id.unwrap_or_default();
    if user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("userId is required".to_string()));
    }

    if image.data.is_empty() {
        return Err(ApiError::BadRequest("No image file provided".to_string()));
    }

    if !is_image_upload(image.content_type.as_deref(), &image.data) {
        warn!(
            content_type = ?image.content_type,
            "Rejected non-image upload"
        );
        return Err(ApiError::BadRequest(
            "Only image files are allowed".to_string(),
        ));
    }

    let image_name = image
        .file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE_NAME.to_string());

    info!(
        user_id = %user_id.trim(),
        image_name = %image_name,
        bytes = image.data.len(),
        "Image verification requested"
    );

    let request = VerificationRequest::new(image.data, image_name, user_id)?;
    let result = state.verifier.verify(&request).await;

    state.persist_in_background(result.clone());

    Ok(Json(result))
}

async fn read_form(mut multipart: Multipart, max_bytes: usize) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        // Field name borrowed from the field; copy before consuming it
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => {
                form.image = Some(read_image(field, max_bytes).await?);
            }
            Some("userId") => {
                form.user_id = Some(field.text().await.map_err(multipart_error)?);
            }
            other => {
                tracing::debug!(field = ?other, "Ignoring unexpected form field");
            }
        }
    }

    Ok(form)
}

async fn read_image(field: Field<'_>, max_bytes: usize) -> ApiResult<UploadedImage> {
    let file_name = field.file_name().map(str::to_owned);
    let content_type = field.content_type().map(str::to_owned);
    let data = field.bytes().await.map_err(multipart_error)?;

    if data.len() > max_bytes {
        return Err(too_large(max_bytes));
    }

    Ok(UploadedImage {
        file_name,
        content_type,
        data: data.to_vec(),
    })
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(format!("Malformed upload: {}", err.body_text()))
    }
}

fn too_large(max_bytes: usize) -> ApiError {
    ApiError::PayloadTooLarge(format!(
        "Image exceeds the {} byte upload limit",
        max_bytes
    ))
}

/// Accept declared `image/*` uploads; sniff the bytes when the client sent
/// no type or a generic one
pub fn is_image_upload(content_type: Option<&str>, data: &[u8]) -> bool {
    match content_type.map(|ct| ct.trim().to_ascii_lowercase()) {
        Some(ct) if ct.starts_with("image/") => true,
        None => infer::is_image(data),
        Some(ct) if ct.is_empty() || ct == "application/octet-stream" => infer::is_image(data),
        Some(_) => false,
    }
}

/// Build verification routes
pub fn verify_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/verifyImage", post(verify_image))
        .layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
        ))
}

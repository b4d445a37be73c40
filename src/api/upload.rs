// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File upload passthrough to Google Drive.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info};

use crate::auth::Auth;
use crate::error::{ApiError, ErrorBody};
use crate::models::UploadResponse;
use crate::providers::UploadRequest;
use crate::state::AppState;

/// Largest accepted request body (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const FILE_FIELD: &str = "file";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

fn invalid_form(err: MultipartError) -> ApiError {
    let status = err.status();
    info!(error = %err.body_text(), "Rejected multipart body");
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(status, "Invalid request", "File exceeds the 10 MiB limit");
    }
    ApiError::bad_request("Invalid request", "Could not parse multipart form")
}

/// Upload the multipart field `file` to Google Drive.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "Upload",
    security(("bearer" = [])),
    request_body(content_type = "multipart/form-data", description = "Form with a `file` field"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file or unreadable form", body = ErrorBody),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 500, description = "Drive not configured or upload failed", body = ErrorBody),
    )
)]
pub async fn upload_file(
    Auth(claims): Auth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or(FILE_FIELD).to_string();
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = field.bytes().await.map_err(invalid_form)?;
        upload = Some(UploadRequest {
            filename,
            content_type,
            bytes: bytes.to_vec(),
            parent_folder_id: state.upload_folder_id.clone(),
        });
        break;
    }

    let upload =
        upload.ok_or_else(|| ApiError::bad_request("Invalid file", "No file provided"))?;

    let blobs = state.blobs.as_ref().ok_or_else(|| {
        error!("Upload requested but Google Drive credentials are not configured");
        ApiError::configuration("Google Drive integration is not configured")
    })?;

    info!(
        filename = %upload.filename,
        size = upload.bytes.len(),
        user_id = claims.user_id,
        "Uploading file"
    );

    let stored = blobs.upload(upload).await.map_err(|e| {
        error!(error = %e, "Drive upload failed");
        ApiError::upstream("Failed to upload file to Google Drive")
    })?;

    info!(file_id = %stored.id, "File uploaded");
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            file_id: stored.id,
            name: stored.name,
            mime_type: stored.mime_type,
            web_view_link: stored.web_view_link,
        }),
    ))
}

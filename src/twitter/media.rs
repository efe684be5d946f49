//! Media upload operations for the Twitter API.
//!
//! This module contains the function for uploading an image file to the
//! Twitter media endpoint so it can be attached to a status.

use base64::{engine::general_purpose::STANDARD, Engine};
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;

use super::api::{execute_request, TwitterClient};

/// The subset of the media upload response the bot needs.
#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

/// Uploads an image file and returns its media ID.
///
/// The file is read from disk, base64-encoded and sent as the `media_data`
/// form field of the upload endpoint. The returned media ID can be attached to
/// a status via its `media_ids` parameter.
///
/// # Parameters
///
/// - `client`: The Twitter API client
/// - `path`: Path of the image file to upload
///
/// # Returns
///
/// - `Ok(String)`: The media ID string assigned by the upload endpoint
/// - `Err(Box<dyn std::error::Error + Send + Sync>)`: If reading the file or the upload fails
pub async fn upload_media(
    client: &TwitterClient,
    path: &Path,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    info!("Uploading media file {}", path.display());

    let bytes = tokio::fs::read(path).await?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    let media_data = STANDARD.encode(&bytes);
    let url = format!("{}/media/upload.json", client.upload_base);
    debug!("Request URL: {}", url);

    let params = [("media_data", media_data.as_str())];
    let request_builder = client
        .http
        .post(&url)
        .header("Authorization", client.auth_header.as_str())
        .form(&params);

    let response_text = execute_request(request_builder, "upload_media").await?;
    let upload: MediaUploadResponse = serde_json::from_str(&response_text)?;

    info!("Media uploaded with ID {}", upload.media_id_string);
    Ok(upload.media_id_string)
}

//! Status operations for the Twitter API.
//!
//! This module contains functions for looking up statuses and posting replies
//! using OAuth 2.0 User Context authentication.

use log::{debug, info};

use crate::status::Status;

use super::api::{execute_request, TwitterClient};

/// Fetches a single status by ID in extended mode.
///
/// Extended mode returns the untruncated `full_text` together with its
/// `display_text_range`, which is what the text resolution logic needs when a
/// mention points back at an earlier status in a reply chain.
///
/// # Parameters
///
/// - `client`: The Twitter API client
/// - `status_id`: The numeric ID of the status to fetch
///
/// # Returns
///
/// - `Ok(Status)`: The fetched status
/// - `Err(Box<dyn std::error::Error + Send + Sync>)`: If the request or deserialization fails
///
/// # Example
///
/// ```rust,no_run
/// use quotebird::{get_status, TwitterClient, TwitterConfig};
///
/// #[tokio::main]
/// async fn main() {
///     std::env::set_var("xapi_access_token", "your_access_token");
///     let config = TwitterConfig::from_env().unwrap();
///     let client = TwitterClient::new(&config);
///
///     let status = get_status(&client, 1234567890).await.unwrap();
///     println!("Status text: {}", status.resolved_text(None));
/// }
/// ```
pub async fn get_status(
    client: &TwitterClient,
    status_id: u64,
) -> Result<Status, Box<dyn std::error::Error + Send + Sync>> {
    info!("Fetching status {} in extended mode", status_id);

    let url = format!(
        "{}/statuses/show.json?id={}&tweet_mode=extended",
        client.api_base, status_id
    );
    debug!("Request URL: {}", url);

    let request_builder = client
        .http
        .get(&url)
        .header("Authorization", client.auth_header.as_str());

    let response_text = execute_request(request_builder, "get_status").await?;
    let status: Status = serde_json::from_str(&response_text)?;

    debug!(
        "Fetched status {} from @{}",
        status.id, status.user.screen_name
    );
    Ok(status)
}

/// Posts a reply to a status with an attached media item.
///
/// The reply is posted with `auto_populate_reply_metadata` enabled, so the
/// Twitter API prepends the mentions of the replied-to conversation instead of
/// requiring them in the status text.
///
/// # Parameters
///
/// - `client`: The Twitter API client
/// - `text`: The text content of the reply
/// - `in_reply_to_status_id`: The numeric ID of the status being replied to
/// - `media_id`: The media ID string obtained from a prior upload
///
/// # Returns
///
/// - `Ok(Status)`: The posted reply as returned by the API
/// - `Err(Box<dyn std::error::Error + Send + Sync>)`: If the request or deserialization fails
pub async fn post_reply(
    client: &TwitterClient,
    text: &str,
    in_reply_to_status_id: u64,
    media_id: &str,
) -> Result<Status, Box<dyn std::error::Error + Send + Sync>> {
    info!(
        "Posting reply to status {} with text: '{}'",
        in_reply_to_status_id, text
    );

    let url = format!("{}/statuses/update.json", client.api_base);
    debug!("Request URL: {}", url);

    let status_id_param = in_reply_to_status_id.to_string();
    let params = [
        ("status", text),
        ("in_reply_to_status_id", status_id_param.as_str()),
        ("auto_populate_reply_metadata", "true"),
        ("media_ids", media_id),
    ];
    debug!(
        "Reply parameters: in_reply_to_status_id={}, media_ids={}",
        status_id_param, media_id
    );

    let request_builder = client
        .http
        .post(&url)
        .header("Authorization", client.auth_header.as_str())
        .form(&params);

    let response_text = execute_request(request_builder, "post_reply").await?;
    let posted: Status = serde_json::from_str(&response_text)?;

    info!("Reply posted with status ID {}", posted.id);
    Ok(posted)
}

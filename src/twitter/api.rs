//! Core Twitter API utilities.
//!
//! This module contains the shared API client and low-level utilities for
//! making authenticated requests to the Twitter API.

use log::{debug, error, info};
use reqwest::Client;

use crate::auth::build_user_context_auth_header;
use crate::config::TwitterConfig;
use crate::status::User;

/// Default base URL for the Twitter REST API.
pub const TWITTER_API_BASE: &str = "https://api.twitter.com/1.1";

/// Default base URL for the Twitter media upload API.
pub const TWITTER_UPLOAD_BASE: &str = "https://upload.twitter.com/1.1";

/// Default base URL for the Twitter streaming API.
pub const TWITTER_STREAM_BASE: &str = "https://stream.twitter.com/1.1";

/// Handle for the Twitter API.
///
/// The HTTP client and the Authorization header are built once at startup and
/// the handle is cloned wherever requests need to be made. The base URLs are
/// injectable so tests can point the client at a local server.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    pub(crate) http: Client,
    pub(crate) api_base: String,
    pub(crate) upload_base: String,
    pub(crate) stream_base: String,
    pub(crate) auth_header: String,
}

impl TwitterClient {
    /// Creates a client for the production Twitter API endpoints.
    ///
    /// # Parameters
    ///
    /// - `config`: Twitter credentials loaded from the environment
    pub fn new(config: &TwitterConfig) -> Self {
        Self::with_base_urls(
            config,
            TWITTER_API_BASE,
            TWITTER_UPLOAD_BASE,
            TWITTER_STREAM_BASE,
        )
    }

    /// Creates a client that talks to the given base URLs instead of the
    /// production endpoints.
    ///
    /// # Parameters
    ///
    /// - `config`: Twitter credentials
    /// - `api_base`: Base URL for REST operations
    /// - `upload_base`: Base URL for media uploads
    /// - `stream_base`: Base URL for the streaming API
    pub fn with_base_urls(
        config: &TwitterConfig,
        api_base: &str,
        upload_base: &str,
        stream_base: &str,
    ) -> Self {
        TwitterClient {
            http: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            upload_base: upload_base.trim_end_matches('/').to_string(),
            stream_base: stream_base.trim_end_matches('/').to_string(),
            auth_header: build_user_context_auth_header(&config.access_token),
        }
    }
}

/// Sanitizes text for safe logging by truncating and escaping control characters.
///
/// This function:
/// - Truncates long text to prevent log flooding
/// - Replaces control characters that could manipulate log output
/// - Escapes newlines to prevent log injection
///
/// # Parameters
///
/// - `text`: The text to sanitize
/// - `max_len`: Maximum length in bytes before truncation
///
/// # Returns
///
/// A sanitized string safe for logging
pub(crate) fn sanitize_for_logging(text: &str, max_len: usize) -> String {
    // Replace control characters and newlines to prevent log injection
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' => ' ',
            '\r' => ' ',
            '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    if sanitized.len() > max_len {
        // Back the cut up to a character boundary so multibyte text cannot
        // split mid-character
        let mut cut = max_len;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}... [truncated, {} total bytes]",
            &sanitized[..cut],
            text.len()
        )
    } else {
        sanitized
    }
}

/// Sends an authenticated request to the Twitter API and returns the body.
///
/// This helper handles the common pattern of sending a prepared request,
/// logging the outcome and turning non-success status codes into errors.
///
/// # Parameters
///
/// - `request_builder`: A configured reqwest::RequestBuilder ready to send
/// - `operation_name`: Human-readable name for the operation (for logging)
///
/// # Returns
///
/// - `Ok(String)`: The API response body on success
/// - `Err(Box<dyn std::error::Error + Send + Sync>)`: If the request fails or the API returns an error status
pub(crate) async fn execute_request(
    request_builder: reqwest::RequestBuilder,
    operation_name: &str,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    info!(
        "Making authenticated request for operation: {}",
        operation_name
    );

    let response = request_builder.send().await?;

    let status = response.status();
    info!(
        "Received response with status: {} for operation: {}",
        status, operation_name
    );

    if status.is_success() {
        let response_text = response.text().await?;
        info!("Operation '{}' completed successfully", operation_name);
        debug!(
            "Response summary for '{}': {} bytes received",
            operation_name,
            response_text.len()
        );
        return Ok(response_text);
    }

    let error_text = response.text().await?;
    error!("Operation '{}' failed - Status: {}", operation_name, status);
    debug!(
        "Error response for '{}': {}",
        operation_name,
        sanitize_for_logging(&error_text, 200)
    );
    Err(format!(
        "Twitter API error for operation '{}' ({})",
        operation_name, status
    )
    .into())
}

/// Looks up the account the configured credentials belong to.
///
/// The bot needs to know its own user ID and screen name before it can scan
/// statuses for mentions of itself, so this is called once at startup.
///
/// # Parameters
///
/// - `client`: The Twitter API client
///
/// # Returns
///
/// - `Ok(User)`: The authenticated account
/// - `Err(Box<dyn std::error::Error + Send + Sync>)`: If the API request fails
pub async fn verify_credentials(
    client: &TwitterClient,
) -> Result<User, Box<dyn std::error::Error + Send + Sync>> {
    info!("Verifying Twitter credentials");

    let url = format!("{}/account/verify_credentials.json", client.api_base);
    let request_builder = client
        .http
        .get(&url)
        .header("Authorization", client.auth_header.as_str());

    let response_text = execute_request(request_builder, "verify_credentials").await?;
    let me: User = serde_json::from_str(&response_text)?;

    info!("Authenticated as @{} (user ID {})", me.screen_name, me.id);
    Ok(me)
}

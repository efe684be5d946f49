//! Quote image generation API client.
//!
//! This module contains the client for the remote quote image generation
//! service. It requests an image for a piece of quoted text, streams the
//! response body into a scratch file and captures the descriptive metadata
//! the service returns in response headers.

use futures_util::StreamExt;
use log::{debug, info, warn};
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::config::QuoteApiConfig;

/// A generated quote image downloaded to a scratch file.
///
/// The scratch file is removed when the value is dropped, so a downloaded
/// image cannot outlive the processing attempt that produced it, whether the
/// reply was posted or the attempt failed partway.
#[derive(Debug)]
pub struct GeneratedImage {
    pub(crate) path: PathBuf,
    /// Character the quote is attributed to (from the `Character` header).
    pub character: String,
    /// Source title the character is from (from the `Anime` header).
    pub anime: String,
}

impl GeneratedImage {
    /// Path of the downloaded image file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for GeneratedImage {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed scratch file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove scratch file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Client for the quote image generation API.
///
/// The HTTP client is built once with the Authorization and Content-Type
/// headers applied as default headers, so individual requests only carry the
/// quote being rendered.
#[derive(Debug, Clone)]
pub struct QuoteApiClient {
    http: Client,
    gen_url: Url,
}

impl QuoteApiClient {
    /// Creates a client for the configured generation endpoint.
    ///
    /// The API token is sent verbatim as the Authorization header value on
    /// every request.
    ///
    /// # Parameters
    ///
    /// - `config`: Quote API settings loaded from the environment
    ///
    /// # Returns
    ///
    /// - `Ok(QuoteApiClient)`: A ready-to-use client
    /// - `Err(Box<dyn std::error::Error + Send + Sync>)`: If the endpoint is not a valid URL or the token is not a valid header value
    pub fn new(
        config: &QuoteApiConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let gen_url = Url::parse(&config.gen_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&config.api_token)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder().default_headers(headers).build()?;

        Ok(QuoteApiClient { http, gen_url })
    }

    /// Requests a generated image for the given quote.
    ///
    /// On success the response body is streamed into a freshly named scratch
    /// file and the `Character` and `Anime` response headers are captured.
    /// When the service declines the request (any non-success status) the
    /// status code and the `description` field of the JSON error body are
    /// logged and `Ok(None)` is returned: a refusal is an expected outcome,
    /// not an error.
    ///
    /// # Parameters
    ///
    /// - `quote`: The quote text to render
    /// - `scratch_dir`: Directory the image file is written into
    ///
    /// # Returns
    ///
    /// - `Ok(Some(GeneratedImage))`: The downloaded image and its metadata
    /// - `Ok(None)`: If the service declined to generate an image
    /// - `Err(Box<dyn std::error::Error + Send + Sync>)`: If the request, the metadata headers or the download fail
    pub async fn fetch_quote_image(
        &self,
        quote: &str,
        scratch_dir: &Path,
    ) -> Result<Option<GeneratedImage>, Box<dyn std::error::Error + Send + Sync>> {
        info!("Requesting quote image for text: '{}'", quote);

        // The quote parameter is merged into any query the endpoint already carries
        let mut url = self.gen_url.clone();
        url.query_pairs_mut().append_pair("quote", quote);
        debug!("Request URL: {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await?;
            let description = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|data| {
                    data.get("description")
                        .and_then(|value| value.as_str())
                        .map(|text| text.to_string())
                })
                .unwrap_or_else(|| "unknown".to_string());
            warn!(
                "Received unexpected response from the quote API. Code: {} | Description: {}",
                status.as_u16(),
                description
            );
            return Ok(None);
        }

        // Metadata headers must be read before anything touches the disk
        let character = header_string(response.headers(), "Character")?;
        let anime = header_string(response.headers(), "Anime")?;

        // The cleanup guard must wrap the path before the first write
        let image = GeneratedImage {
            path: scratch_dir.join(scratch_file_name()),
            character,
            anime,
        };

        info!("Downloading quote image to {}", image.path.display());

        let mut file = tokio::fs::File::create(&image.path).await?;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        debug!(
            "Quote image downloaded: character '{}', source '{}'",
            image.character, image.anime
        );
        Ok(Some(image))
    }
}

/// Generates a scratch file name of the form `<32 hex chars>.png` from
/// sixteen random bytes.
pub(crate) fn scratch_file_name() -> String {
    let mut raw_name = [0u8; 16];
    rand::thread_rng().fill(&mut raw_name);
    format!("{}.png", hex::encode(raw_name))
}

/// Reads a required response header as an owned string.
fn header_string(
    headers: &HeaderMap,
    name: &str,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    match headers.get(name) {
        Some(value) => Ok(value.to_str()?.to_string()),
        None => Err(format!("Quote API response is missing the {} header", name).into()),
    }
}

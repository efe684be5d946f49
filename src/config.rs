//! Configuration module for the quotebird service.
//!
//! This module contains configuration structures and environment variable handling
//! for the Twitter/X API integration and the quote image generation API.

use log::{debug, error, info, warn};
use std::env;

/// Masks a token for safe logging, keeping only a short prefix and suffix.
///
/// Tokens longer than 16 characters show the first and last 8 characters,
/// shorter tokens show at most the first 8. Lengths are counted in characters
/// so unusual token values cannot split a multibyte character.
pub(crate) fn mask_token(token: &str) -> String {
    let token_length = token.chars().count();
    let token_prefix: String = token.chars().take(8).collect();

    if token_length > 16 {
        let token_suffix: String = token.chars().skip(token_length - 8).collect();
        format!("{}...{}", token_prefix, token_suffix)
    } else {
        format!("{}...", token_prefix)
    }
}

/// Configuration struct for Twitter/X API credentials.
///
/// This struct holds the credentials required to authenticate with the Twitter/X API
/// endpoints. It uses OAuth 2.0 User Context (Access Token) for all operations
/// including reading the mention stream, uploading media and posting replies.
#[derive(Debug)]
pub struct TwitterConfig {
    /// The Access Token for OAuth 2.0 User Context authentication (all operations)
    pub access_token: String,
    /// The Client ID for OAuth 2.0 operations
    pub client_id: Option<String>,
    /// The Client Secret for OAuth 2.0 operations
    pub client_secret: Option<String>,
}

impl TwitterConfig {
    /// Creates a new `TwitterConfig` instance by loading credentials from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `xapi_access_token`: Twitter API Access Token (OAuth 2.0 User Context for all operations)
    ///
    /// # Optional Environment Variables
    ///
    /// - `xapi_client_id`: Client ID for OAuth 2.0 operations
    /// - `xapi_client_secret`: Client Secret for OAuth 2.0 operations
    ///
    /// # Returns
    ///
    /// - `Ok(TwitterConfig)`: If the required environment variable is present
    /// - `Err(Box<dyn std::error::Error + Send + Sync>)`: If the environment variable is missing
    ///
    /// # Example
    ///
    /// ```rust
    /// use quotebird::TwitterConfig;
    ///
    /// std::env::set_var("xapi_access_token", "your_access_token");
    ///
    /// let config = TwitterConfig::from_env().unwrap();
    /// assert_eq!(config.access_token, "your_access_token");
    /// ```
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        info!("Loading Twitter configuration from environment variables");

        // Load required access token
        let access_token = match env::var("xapi_access_token") {
            Ok(token) => {
                info!(
                    "Found xapi_access_token environment variable with length: {}",
                    token.len()
                );
                debug!("Access token (masked): {}", mask_token(&token));

                // Validate token format (basic checks)
                if token.is_empty() {
                    error!("Access token is empty");
                    return Err("Access token cannot be empty".into());
                }

                if token.len() < 10 {
                    warn!(
                        "Access token seems unusually short ({} characters)",
                        token.len()
                    );
                }

                token
            }
            Err(e) => {
                error!("Failed to load xapi_access_token from environment: {}", e);
                error!("Make sure xapi_access_token environment variable is set");
                return Err(
                    format!("Missing xapi_access_token environment variable: {}", e).into(),
                );
            }
        };

        // Load optional client credentials
        let client_id = match env::var("xapi_client_id") {
            Ok(id) => {
                info!("Found xapi_client_id environment variable");
                debug!("Client ID (masked): {}", mask_token(&id));
                Some(id)
            }
            Err(_) => {
                info!("No xapi_client_id found in environment variables");
                None
            }
        };

        let client_secret = match env::var("xapi_client_secret") {
            Ok(secret) => {
                info!("Found xapi_client_secret environment variable");
                debug!("Client secret (masked): {}", mask_token(&secret));
                Some(secret)
            }
            Err(_) => {
                info!("No xapi_client_secret found in environment variables");
                None
            }
        };

        info!("Twitter configuration loaded successfully");

        Ok(TwitterConfig {
            access_token,
            client_id,
            client_secret,
        })
    }
}

/// Configuration struct for the quote image generation API.
///
/// This struct holds the endpoint and credential used to request generated
/// quote images from the remote generation service.
#[derive(Debug)]
pub struct QuoteApiConfig {
    /// The base URL of the quote image generation endpoint
    pub gen_url: String,
    /// The token sent verbatim as the Authorization header value
    pub api_token: String,
}

impl QuoteApiConfig {
    /// Creates a new `QuoteApiConfig` instance by loading settings from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `API_GEN_URL`: Base URL of the quote image generation endpoint
    /// - `API_TOKEN`: Credential sent as the Authorization header value
    ///
    /// # Returns
    ///
    /// - `Ok(QuoteApiConfig)`: If both environment variables are present and the URL is valid
    /// - `Err(Box<dyn std::error::Error + Send + Sync>)`: If a variable is missing or the URL is invalid
    ///
    /// # Example
    ///
    /// ```rust
    /// use quotebird::QuoteApiConfig;
    ///
    /// std::env::set_var("API_GEN_URL", "https://example.com/generate");
    /// std::env::set_var("API_TOKEN", "your_api_token");
    ///
    /// let config = QuoteApiConfig::from_env().unwrap();
    /// assert_eq!(config.gen_url, "https://example.com/generate");
    /// ```
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        info!("Loading quote API configuration from environment variables");

        let gen_url = match env::var("API_GEN_URL") {
            Ok(url) => url,
            Err(e) => {
                error!("Failed to load API_GEN_URL from environment: {}", e);
                error!("Make sure API_GEN_URL environment variable is set");
                return Err(format!("Missing API_GEN_URL environment variable: {}", e).into());
            }
        };

        // Validate the endpoint before any request is made with it
        match url::Url::parse(&gen_url) {
            Ok(parsed) => {
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    error!(
                        "API_GEN_URL must be an http(s) URL, got scheme '{}'",
                        parsed.scheme()
                    );
                    return Err("API_GEN_URL must be an http(s) URL".into());
                }
                info!("Quote generation endpoint: {}", gen_url);
            }
            Err(e) => {
                error!("API_GEN_URL is not a valid URL: {}", e);
                return Err(format!("API_GEN_URL is not a valid URL: {}", e).into());
            }
        }

        let api_token = match env::var("API_TOKEN") {
            Ok(token) => {
                info!(
                    "Found API_TOKEN environment variable with length: {}",
                    token.len()
                );
                debug!("API token (masked): {}", mask_token(&token));

                if token.is_empty() {
                    error!("API token is empty");
                    return Err("API token cannot be empty".into());
                }

                token
            }
            Err(e) => {
                error!("Failed to load API_TOKEN from environment: {}", e);
                error!("Make sure API_TOKEN environment variable is set");
                return Err(format!("Missing API_TOKEN environment variable: {}", e).into());
            }
        };

        info!("Quote API configuration loaded successfully");

        Ok(QuoteApiConfig { gen_url, api_token })
    }
}

/// Gets the server port from environment variables or returns the default.
///
/// This function reads the `PORT` environment variable and parses it as a u16.
/// If the environment variable is not set or cannot be parsed, it defaults to 3000.
///
/// # Returns
///
/// The port number as a u16.
///
/// # Panics
///
/// This function will panic if the `PORT` environment variable is set to a value
/// that cannot be parsed as a valid port number.
///
/// # Example
///
/// ```rust
/// use quotebird::get_server_port;
///
/// // With PORT=8080 set in environment
/// let port = get_server_port(); // Returns 8080
///
/// // With no PORT set
/// let port = get_server_port(); // Returns 3000
/// ```
pub fn get_server_port() -> u16 {
    env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .expect("PORT must be a valid number")
}

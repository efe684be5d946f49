//! # Quotebird
//!
//! A Rust bot service that listens to the Twitter/X mention stream and replies
//! to quote requests with generated quote images. The service authenticates
//! against the Twitter/X API using OAuth 2.0 User Context authentication.
//!
//! ## Features
//!
//! - Filter stream listener tracking mentions of the bot account
//! - Quote image generation via a remote API, downloaded to a scratch file
//! - Media upload and reply posting via the Twitter/X API
//! - HTTP server with status endpoints (`/`, `/health`)
//! - Structured logging
//!
//! ## Environment Variables
//!
//! The following environment variables are required:
//! - `xapi_access_token`: Twitter API Access token (OAuth 2.0 User Context)
//! - `API_GEN_URL`: Quote image generation endpoint
//! - `API_TOKEN`: Quote image generation credential
//!
//! Optional:
//! - `PORT`: Server port (defaults to 3000)
//! - `LOG_LEVEL`: Log filter (defaults to `info`)
//!
//! ## API Endpoints
//!
//! - `GET /`: Returns a banner message
//! - `GET /health`: Returns service health status

use axum::{routing::get, Router};
use log::{error, info};
use std::net::SocketAddr;
use std::path::PathBuf;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use quotebird::{
    get_server_port, handle_health, handle_root, run_filter_stream, verify_credentials,
    MentionListener, QuoteApiClient, QuoteApiConfig, TwitterClient, TwitterConfig,
};

/// Directory downloaded quote images are written into.
const SCRATCH_DIR: &str = "tmp";

/// Main entry point for the quotebird service.
///
/// This function initializes the logging system, loads the Twitter and quote
/// API configuration, verifies the bot's credentials and then runs two things
/// concurrently: the filter stream listener that answers quote requests, and a
/// small HTTP server exposing status endpoints. The process runs until either
/// side stops or a shutdown signal arrives.
///
/// # Server Configuration
///
/// The server is configured with the following routes:
/// - `GET /`: Root endpoint with a banner message
/// - `GET /health`: Health check endpoint
///
/// # Middleware
///
/// The server includes HTTP request tracing middleware for logging and debugging.
///
/// # Port Configuration
///
/// The server port is determined by the `PORT` environment variable, defaulting to 3000.
///
/// # Logging
///
/// The application uses the `env_logger` crate for structured logging. The log
/// filter is controlled via the `LOG_LEVEL` environment variable and defaults
/// to `info`.
///
/// # Example Usage
///
/// ```bash
/// # Run with default port 3000
/// cargo run
///
/// # Run on custom port
/// PORT=8080 cargo run
///
/// # Run with debug logging
/// LOG_LEVEL=debug cargo run
/// ```
///
/// # Panics
///
/// This function will panic if:
/// - The server port cannot be bound (e.g., port already in use)
/// - There's an error starting the HTTP server
#[tokio::main]
async fn main() {
    // Initialize the logging system honoring LOG_LEVEL
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("LOG_LEVEL", "info")).init();

    // Load configuration for both upstream APIs
    let twitter_config = match TwitterConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load Twitter configuration: {}", e);
            std::process::exit(1);
        }
    };

    let quote_config = match QuoteApiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load quote API configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Both HTTP clients are constructed once and handed to the listener
    let twitter = TwitterClient::new(&twitter_config);
    let quote_api = match QuoteApiClient::new(&quote_config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build quote API client: {}", e);
            std::process::exit(1);
        }
    };

    // The bot needs its own identity before it can scan statuses for mentions
    let me = match verify_credentials(&twitter).await {
        Ok(user) => user,
        Err(e) => {
            error!("Failed to verify Twitter credentials: {}", e);
            std::process::exit(1);
        }
    };

    // Scratch directory for downloaded images
    if let Err(e) = std::fs::create_dir_all(SCRATCH_DIR) {
        error!("Failed to create scratch directory '{}': {}", SCRATCH_DIR, e);
        std::process::exit(1);
    }

    let track = me.screen_name.clone();
    let listener = MentionListener::new(
        twitter.clone(),
        quote_api,
        me,
        PathBuf::from(SCRATCH_DIR),
    );

    // Drive the mention stream in the background
    let stream_handle = tokio::spawn(async move {
        if let Err(e) = run_filter_stream(&twitter, &listener, &track).await {
            error!("Filter stream terminated: {}", e);
        }
    });

    // Build the HTTP application with all routes and middleware
    let app = Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    // Get the server port and bind address
    let port = get_server_port();
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    info!("Starting quotebird server on {}", addr);

    // Bind to the address and start serving requests
    let http_listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Run the HTTP server and the stream listener concurrently
    tokio::select! {
        result = axum::serve(http_listener, app) => {
            if let Err(e) = result {
                error!("HTTP server error: {}", e);
            }
        }
        _ = stream_handle => {
            info!("Stream listener task completed");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, stopping quotebird");
        }
    }
}

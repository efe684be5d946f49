//! HTTP route handlers for the quotebird service.
//!
//! This module contains the HTTP route handler functions for the small status
//! surface the bot exposes alongside its stream listener.

use axum::response::Json;
use log::info;
use serde_json::{json, Value};

/// Handles GET requests to the root `/` endpoint.
///
/// This endpoint returns a short banner confirming the service is up. The
/// actual work of the bot happens on the stream listener, not here.
///
/// # Returns
///
/// A static banner string.
pub async fn handle_root() -> &'static str {
    info!("Root endpoint requested");
    "quotebird is listening for mentions!"
}

/// Handles GET requests to the `/health` endpoint.
///
/// This endpoint provides a health check for the service, returning the current
/// status and service name. It's commonly used by load balancers and monitoring
/// systems to verify that the service is running and responsive.
///
/// # Returns
///
/// A JSON response containing:
/// - `status`: Always "healthy" when the service is running
/// - `service`: The service name "quotebird"
///
/// # Example Response
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "quotebird"
/// }
/// ```
pub async fn handle_health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "quotebird"}))
}

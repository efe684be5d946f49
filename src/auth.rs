//! Authentication helpers for the Twitter/X API.
//!
//! This module contains the functions for building Authorization headers for
//! OAuth 2.0 User Context authentication, which is required for user-specific
//! operations like reading the mention stream and posting replies.

/// Builds the Authorization header for OAuth 2.0 User Context authentication.
///
/// This function creates the proper Authorization header for OAuth 2.0 User
/// Context authentication, which is required for Twitter API endpoints that
/// perform user-specific operations like posting statuses and uploading media.
///
/// # Parameters
///
/// - `access_token`: The Access Token obtained through OAuth 2.0 Authorization Code Flow
///
/// # Returns
///
/// A properly formatted Authorization header string for OAuth 2.0 User Context authentication.
///
/// # Format
///
/// The header follows this format:
/// ```text
/// Bearer YOUR_ACCESS_TOKEN_HERE
/// ```
///
/// # Example
///
/// ```rust
/// use quotebird::build_user_context_auth_header;
///
/// let header = build_user_context_auth_header("your_access_token");
/// assert_eq!(header, "Bearer your_access_token");
/// ```
pub fn build_user_context_auth_header(access_token: &str) -> String {
    format!("Bearer {}", access_token)
}

//! # Quotebird Library
//!
//! A Rust bot service that listens to the Twitter/X mention stream and replies
//! to quote requests with generated quote images. The service authenticates
//! against the Twitter/X API with an OAuth 2.0 User Context Access Token and
//! against the quote image generation API with a service token.
//!
//! ## Features
//!
//! - Filter stream listener tracking mentions of the bot account
//! - Mention scanning and quote text resolution across status payload shapes
//! - Reply eligibility rules covering retweets, quote posts and reply chains
//! - Quote image download to a self-cleaning scratch file
//! - Media upload and reply posting via the Twitter/X API
//! - HTTP server with status endpoints (`/`, `/health`)
//! - Structured logging
//!
//! ## Configuration
//!
//! The following configuration is required:
//! - `xapi_access_token`: Twitter API OAuth 2.0 User Context Access Token
//! - `API_GEN_URL`: Quote image generation endpoint
//! - `API_TOKEN`: Quote image generation credential
//! - `PORT`: Server port (defaults to 3000)
//! - `LOG_LEVEL`: Log filter (defaults to `info`)
//!
//! ## API Endpoints
//!
//! - `GET /`: Returns a banner message
//! - `GET /health`: Returns service health status

pub mod auth;
pub mod config;
pub mod handlers;
pub mod imagegen;
pub mod listener;
pub mod status;
pub mod twitter;

// Re-export commonly used types and functions
pub use auth::build_user_context_auth_header;
pub use config::{get_server_port, QuoteApiConfig, TwitterConfig};
pub use handlers::{handle_health, handle_root};
pub use imagegen::{GeneratedImage, QuoteApiClient};
pub use listener::{MentionListener, Outcome};
pub use status::{Entities, ExtendedTweet, MentionScan, Status, User, UserMention};
pub use twitter::{
    get_status, post_reply, run_filter_stream, upload_media, verify_credentials, TwitterClient,
};

#[cfg(test)]
mod tests;

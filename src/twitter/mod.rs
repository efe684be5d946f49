//! Twitter/X API integration module.
//!
//! This module contains functions for interacting with the Twitter/X API,
//! including status lookups, media uploads, posting replies and reading the
//! filter stream using OAuth 2.0 User Context authentication.

mod api;
mod media;
mod stream;
mod tweets;

// Re-export public API
pub use api::{
    verify_credentials, TwitterClient, TWITTER_API_BASE, TWITTER_STREAM_BASE, TWITTER_UPLOAD_BASE,
};
pub use media::upload_media;
pub use stream::run_filter_stream;
pub use tweets::{get_status, post_reply};

// Crate-internal re-exports (used by tests and other modules)
#[allow(unused_imports)]
pub(crate) use api::sanitize_for_logging;
#[allow(unused_imports)]
pub(crate) use stream::drain_complete_lines;

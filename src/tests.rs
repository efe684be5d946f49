//! # Tests Module
//!
//! This module contains comprehensive tests for the quotebird service.
//! It includes unit tests for individual functions and integration tests for HTTP endpoints.
//!
//! ## Test Categories
//!
//! ### Unit Tests
//! - Configuration loading (`TwitterConfig::from_env`, `QuoteApiConfig::from_env`)
//! - Server configuration (`get_server_port`)
//! - Status deserialization and text resolution
//! - Mention scanning
//! - Log sanitization and token masking
//! - Stream line splitting
//! - Scratch file naming and cleanup
//!
//! ### Integration Tests
//! - HTTP endpoint testing for all routes
//! - Eligibility short-circuits that must not touch the network
//!
//! ## Test Environment
//!
//! Tests run in isolation and clean up after execution. The offline pipeline
//! tests point their API clients at an unroutable address, so any unexpected
//! network call surfaces as a test failure.

use crate::{
    config::{get_server_port, mask_token},
    handlers::{handle_health, handle_root},
    imagegen::{scratch_file_name, GeneratedImage, QuoteApiClient},
    listener::{MentionListener, Outcome},
    status::{slice_code_points, strip_code_points, Status, User},
    twitter::{drain_complete_lines, sanitize_for_logging, TwitterClient},
    QuoteApiConfig, TwitterConfig,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio_test::assert_ok;
use tower::ServiceExt;

/// User ID the tests treat as the bot's own account.
const BOT_ID: u64 = 4242;

/// Creates a test application instance with all routes configured.
///
/// This helper function sets up a minimal Axum router with all the same routes
/// as the main application, but without middleware layers that might interfere
/// with testing. It's used by integration tests to make HTTP requests.
///
/// # Returns
///
/// An Axum `Router` instance configured with all application routes.
fn create_test_app() -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
}

/// Deserializes a JSON payload into a [`Status`], panicking on malformed test data.
fn status_from(payload: Value) -> Status {
    serde_json::from_value(payload).unwrap()
}

/// Builds a listener whose API clients point at an unroutable address.
///
/// Tests that exercise the pre-HTTP part of the pipeline use this listener:
/// if the code under test unexpectedly issues a request, the request fails
/// and the test fails with it.
fn offline_listener() -> MentionListener {
    let twitter_config = TwitterConfig {
        access_token: "unit-test-access-token".to_string(),
        client_id: None,
        client_secret: None,
    };
    let quote_config = QuoteApiConfig {
        gen_url: "http://127.0.0.1:9/generate".to_string(),
        api_token: "unit-test-api-token".to_string(),
    };

    let twitter = TwitterClient::with_base_urls(
        &twitter_config,
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
    );
    let quote_api = QuoteApiClient::new(&quote_config).unwrap();

    MentionListener::new(
        twitter,
        quote_api,
        User {
            id: BOT_ID,
            screen_name: "quotebird".to_string(),
        },
        std::env::temp_dir(),
    )
}

/// Tests the root endpoint handler function directly.
///
/// This test verifies that the `handle_root` function returns the expected
/// banner message without making an HTTP request.
#[tokio::test]
async fn test_handle_root() {
    let response = handle_root().await;
    assert_eq!(response, "quotebird is listening for mentions!");
}

/// Tests the health endpoint handler function directly.
///
/// This test verifies that the `handle_health` function returns a properly
/// formatted JSON response with the correct status and service name.
#[tokio::test]
async fn test_handle_health() {
    let response = handle_health().await;
    let Json(json_response): Json<Value> = response;

    assert_eq!(json_response["status"], "healthy");
    assert_eq!(json_response["service"], "quotebird");
}

/// Integration test for the root endpoint (GET /).
///
/// This test makes an actual HTTP request to the root endpoint and verifies:
/// - The response status is 200 OK
/// - The response body contains the expected banner message
#[tokio::test]
async fn test_root_endpoint() {
    let app = create_test_app();

    let request = Request::builder()
        .uri("/")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_str = String::from_utf8(body.to_vec()).unwrap();
    assert_eq!(body_str, "quotebird is listening for mentions!");
}

/// Integration test for the health endpoint (GET /health).
///
/// This test makes an actual HTTP request to the health endpoint and verifies:
/// - The response status is 200 OK
/// - The response is valid JSON
/// - The JSON contains the expected status and service fields
#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let request = Request::builder()
        .uri("/health")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_str = String::from_utf8(body.to_vec()).unwrap();
    let json_response: Value = serde_json::from_str(&body_str).unwrap();

    assert_eq!(json_response["status"], "healthy");
    assert_eq!(json_response["service"], "quotebird");
}

/// Unit test for the get_server_port function.
///
/// This test verifies that the server port configuration function:
/// - Returns the default port (3000) when PORT environment variable is not set
/// - Correctly parses and returns custom port values from environment
/// - Properly cleans up environment variables after testing
#[test]
fn test_get_server_port() {
    // Test default port
    std::env::remove_var("PORT");
    let port = get_server_port();
    assert_eq!(port, 3000);

    // Test custom port
    std::env::set_var("PORT", "8080");
    let port = get_server_port();
    assert_eq!(port, 8080);

    // Clean up
    std::env::remove_var("PORT");
}

/// Unit test for Twitter configuration loading.
///
/// This test verifies that `TwitterConfig::from_env`:
/// - Fails when the access token variable is missing
/// - Loads the access token and optional client credentials when present
/// - Properly cleans up environment variables after testing
#[test]
fn test_twitter_config_from_env() {
    std::env::remove_var("xapi_access_token");
    std::env::remove_var("xapi_client_id");
    std::env::remove_var("xapi_client_secret");
    assert!(TwitterConfig::from_env().is_err());

    std::env::set_var("xapi_access_token", "a-long-enough-test-token");
    let config = TwitterConfig::from_env().unwrap();
    assert_eq!(config.access_token, "a-long-enough-test-token");
    assert!(config.client_id.is_none());
    assert!(config.client_secret.is_none());

    std::env::set_var("xapi_client_id", "client-id-value");
    std::env::set_var("xapi_client_secret", "client-secret-value");
    let config = TwitterConfig::from_env().unwrap();
    assert_eq!(config.client_id.as_deref(), Some("client-id-value"));
    assert_eq!(config.client_secret.as_deref(), Some("client-secret-value"));

    // Clean up
    std::env::remove_var("xapi_access_token");
    std::env::remove_var("xapi_client_id");
    std::env::remove_var("xapi_client_secret");
}

/// Unit test for quote API configuration loading.
///
/// This test verifies that `QuoteApiConfig::from_env`:
/// - Fails when either variable is missing
/// - Rejects endpoint values that are not http(s) URLs
/// - Loads the endpoint and token when both are valid
/// - Properly cleans up environment variables after testing
#[test]
fn test_quote_api_config_from_env() {
    std::env::remove_var("API_GEN_URL");
    std::env::remove_var("API_TOKEN");
    assert!(QuoteApiConfig::from_env().is_err());

    std::env::set_var("API_GEN_URL", "not a url");
    std::env::set_var("API_TOKEN", "quote-api-token");
    assert!(QuoteApiConfig::from_env().is_err());

    std::env::set_var("API_GEN_URL", "ftp://quotes.example.com/generate");
    assert!(QuoteApiConfig::from_env().is_err());

    std::env::set_var("API_GEN_URL", "https://quotes.example.com/generate");
    let config = QuoteApiConfig::from_env().unwrap();
    assert_eq!(config.gen_url, "https://quotes.example.com/generate");
    assert_eq!(config.api_token, "quote-api-token");

    // Clean up
    std::env::remove_var("API_GEN_URL");
    std::env::remove_var("API_TOKEN");
}

/// Unit test for token masking.
///
/// This test verifies that `mask_token` keeps only a prefix and suffix of
/// long tokens, shortens small tokens to a prefix, and counts characters
/// rather than bytes.
#[test]
fn test_mask_token() {
    assert_eq!(
        mask_token("abcdefghijklmnopqrstuvwxyz"),
        "abcdefgh...stuvwxyz"
    );
    assert_eq!(mask_token("short"), "short...");
    assert_eq!(mask_token("exactly16chars!!"), "exactly1...");
    assert_eq!(mask_token(""), "...");

    // Multibyte tokens must not split a character
    let masked = mask_token(&"é".repeat(20));
    assert_eq!(masked, format!("{}...{}", "é".repeat(8), "é".repeat(8)));
}

/// Unit test for stream status deserialization.
///
/// This test verifies that a compatibility-mode stream payload deserializes
/// with its mention entities, reply metadata and flags intact.
#[test]
fn test_status_deserializes_stream_payload() {
    let payload = json!({
        "id": 1111,
        "text": "@quotebird please",
        "user": {"id": 7, "screen_name": "fan"},
        "entities": {"user_mentions": [
            {"id": BOT_ID, "screen_name": "quotebird", "indices": [0, 10]}
        ]},
        "in_reply_to_status_id": null,
        "is_quote_status": false
    });

    let status = assert_ok!(serde_json::from_value::<Status>(payload));
    assert_eq!(status.id, 1111);
    assert_eq!(status.user.id, 7);
    assert_eq!(status.user.screen_name, "fan");
    assert_eq!(status.user_mentions().len(), 1);
    assert_eq!(status.user_mentions()[0].indices, (0, 10));
    assert!(status.in_reply_to_status_id.is_none());
    assert!(!status.is_quote_status);
    assert!(status.retweeted_status.is_none());
}

/// Unit test for minimal status payloads.
///
/// Payloads without entities or flags must still deserialize, with empty
/// mention entities and cleared flags.
#[test]
fn test_status_tolerates_minimal_payload() {
    let status = status_from(json!({
        "id": 5,
        "text": "hi",
        "user": {"id": 7, "screen_name": "fan"}
    }));

    assert!(status.user_mentions().is_empty());
    assert!(!status.is_quote_status);
    assert_eq!(status.resolved_text(None), "hi");
}

/// Unit test for text resolution from a REST extended payload.
///
/// For an extended payload with display range [10, 50], the resolved text
/// must equal the code points [10, 50) of the full text.
#[test]
fn test_resolved_text_applies_display_range_to_full_text() {
    let full_text = format!("@quotebird{} https://t.co/abc", "q".repeat(40));
    let status = status_from(json!({
        "id": 1,
        "full_text": full_text,
        "display_text_range": [10, 50],
        "user": {"id": 7, "screen_name": "fan"}
    }));

    assert_eq!(status.resolved_text(None), "q".repeat(40));
}

/// Unit test for text resolution from a nested extended payload.
///
/// When a streamed status carries an `extended_tweet`, its full text and
/// display range win over the truncated compatibility text.
#[test]
fn test_resolved_text_prefers_extended_tweet() {
    let status = status_from(json!({
        "id": 2,
        "text": "@quotebird the whole quote liv…",
        "extended_tweet": {
            "full_text": "@quotebird the whole quote lives here",
            "display_text_range": [11, 37],
            "entities": {"user_mentions": [
                {"id": BOT_ID, "screen_name": "quotebird", "indices": [0, 10]}
            ]}
        },
        "user": {"id": 7, "screen_name": "fan"}
    }));

    assert_eq!(status.resolved_text(None), "the whole quote lives here");
}

/// Unit test for text resolution from short text with a display range.
#[test]
fn test_resolved_text_applies_display_range_to_short_text() {
    let status = status_from(json!({
        "id": 3,
        "text": "@quotebird wisdom",
        "display_text_range": [11, 17],
        "user": {"id": 7, "screen_name": "fan"}
    }));

    assert_eq!(status.resolved_text(None), "wisdom");
}

/// Unit test for the mention-strip fallback.
///
/// Without any display range, the code points of the first mention are
/// removed inclusively, taking the separator after the mention with them.
#[test]
fn test_resolved_text_strips_first_mention() {
    let status = status_from(json!({
        "id": 4,
        "text": "@quotebird hello world",
        "user": {"id": 7, "screen_name": "fan"}
    }));
    assert_eq!(status.resolved_text(Some((0, 10))), "hello world");

    let status = status_from(json!({
        "id": 5,
        "text": "so true @quotebird indeed",
        "user": {"id": 7, "screen_name": "fan"}
    }));
    assert_eq!(status.resolved_text(Some((8, 18))), "so true indeed");
}

/// Unit test for text resolution without ranges or strip hints.
#[test]
fn test_resolved_text_falls_back_to_raw_text() {
    let status = status_from(json!({
        "id": 6,
        "text": "no mention here",
        "user": {"id": 7, "screen_name": "fan"}
    }));

    assert_eq!(status.resolved_text(None), "no mention here");
}

/// Unit test for code point counting in display ranges.
///
/// Display ranges count code points, so multibyte characters before the
/// range must not shift or break the slice.
#[test]
fn test_resolved_text_counts_code_points() {
    let full_text = format!("{}character quote", "🦀".repeat(5));
    let status = status_from(json!({
        "id": 7,
        "full_text": full_text,
        "display_text_range": [5, 20],
        "user": {"id": 7, "screen_name": "fan"}
    }));

    assert_eq!(status.resolved_text(None), "character quote");
}

/// Unit test for display ranges that overrun the text.
#[test]
fn test_resolved_text_clamps_out_of_range() {
    let status = status_from(json!({
        "id": 8,
        "text": "short",
        "display_text_range": [0, 400],
        "user": {"id": 7, "screen_name": "fan"}
    }));
    assert_eq!(status.resolved_text(None), "short");

    let status = status_from(json!({
        "id": 9,
        "text": "short",
        "display_text_range": [10, 20],
        "user": {"id": 7, "screen_name": "fan"}
    }));
    assert_eq!(status.resolved_text(None), "");
}

/// Unit test for the code point slicing helpers.
#[test]
fn test_code_point_helpers() {
    assert_eq!(slice_code_points("hello world", 6, 11), "world");
    assert_eq!(slice_code_points("hello", 0, 100), "hello");
    assert_eq!(slice_code_points("hello", 7, 9), "");
    assert_eq!(slice_code_points("héllo", 1, 3), "él");

    assert_eq!(strip_code_points("@bot rest", 0, 4), "rest");
    assert_eq!(strip_code_points("keep @bot", 4, 100), "keep");
    assert_eq!(strip_code_points("abc", 100, 200), "abc");
}

/// Unit test for mention entity selection.
///
/// When an extended payload is present, its entity set replaces the
/// top-level entities, which only cover the truncated text.
#[test]
fn test_user_mentions_prefers_extended_entities() {
    let status = status_from(json!({
        "id": 10,
        "text": "@quotebird truncated…",
        "entities": {"user_mentions": [
            {"id": 1, "screen_name": "partial", "indices": [0, 8]}
        ]},
        "extended_tweet": {
            "full_text": "@quotebird the full text with @another mention",
            "display_text_range": [0, 46],
            "entities": {"user_mentions": [
                {"id": BOT_ID, "screen_name": "quotebird", "indices": [0, 10]},
                {"id": 2, "screen_name": "another", "indices": [30, 38]}
            ]}
        },
        "user": {"id": 7, "screen_name": "fan"}
    }));

    let mentions = status.user_mentions();
    assert_eq!(mentions.len(), 2);
    assert_eq!(mentions[0].id, BOT_ID);
}

/// Unit test for mention scanning.
///
/// This test verifies that `mentions_of` counts every mention of the given
/// user and records the indices of the first one.
#[test]
fn test_mentions_of() {
    let status = status_from(json!({
        "id": 11,
        "text": "@a @quotebird @b @quotebird",
        "entities": {"user_mentions": [
            {"id": 1, "screen_name": "a", "indices": [0, 2]},
            {"id": BOT_ID, "screen_name": "quotebird", "indices": [3, 13]},
            {"id": 2, "screen_name": "b", "indices": [14, 16]},
            {"id": BOT_ID, "screen_name": "quotebird", "indices": [17, 27]}
        ]},
        "user": {"id": 7, "screen_name": "fan"}
    }));

    let scan = status.mentions_of(BOT_ID);
    assert_eq!(scan.count, 2);
    assert_eq!(scan.first_indices, Some((3, 13)));

    let scan = status.mentions_of(999);
    assert_eq!(scan.count, 0);
    assert!(scan.first_indices.is_none());
}

/// Unit test for log sanitization.
///
/// This test verifies that `sanitize_for_logging`:
/// - Passes short clean text through unchanged
/// - Replaces newlines, tabs and control characters
/// - Truncates long text with a byte count marker
/// - Never splits a multibyte character when truncating
#[test]
fn test_sanitize_for_logging() {
    assert_eq!(sanitize_for_logging("plain text", 100), "plain text");
    assert_eq!(
        sanitize_for_logging("line\nbreak\tand\rmore", 100),
        "line break and more"
    );
    assert_eq!(sanitize_for_logging("bell\u{7}char", 100), "bell?char");

    let long_text = "a".repeat(300);
    assert_eq!(
        sanitize_for_logging(&long_text, 200),
        format!("{}... [truncated, 300 total bytes]", "a".repeat(200))
    );

    // 100 three-byte characters; a 200-byte cut lands mid-character and must
    // back up to the previous boundary
    let multibyte = "あ".repeat(100);
    assert_eq!(
        sanitize_for_logging(&multibyte, 200),
        format!("{}... [truncated, 300 total bytes]", "あ".repeat(66))
    );
}

/// Unit test for stream line splitting.
///
/// This test verifies that `drain_complete_lines`:
/// - Returns every complete line, with line endings trimmed
/// - Drops blank keep-alive lines
/// - Leaves a trailing partial line in the buffer for the next chunk
#[test]
fn test_drain_complete_lines() {
    let mut buffer = b"{\"a\":1}\r\n\r\n{\"b\":2}\n{\"partial".to_vec();

    let lines = drain_complete_lines(&mut buffer);
    assert_eq!(lines, vec!["{\"a\":1}".to_string(), "{\"b\":2}".to_string()]);
    assert_eq!(buffer, b"{\"partial".to_vec());

    buffer.extend_from_slice(b"\":3}\n");
    let lines = drain_complete_lines(&mut buffer);
    assert_eq!(lines, vec!["{\"partial\":3}".to_string()]);
    assert!(buffer.is_empty());
}

/// Unit test for scratch file naming.
///
/// Names must be 32 lowercase hex characters plus the `.png` extension, and
/// two generated names must differ.
#[test]
fn test_scratch_file_name() {
    let name = scratch_file_name();
    assert_eq!(name.len(), 36);
    assert!(name.ends_with(".png"));
    assert!(name[..32]
        .chars()
        .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    assert_ne!(scratch_file_name(), scratch_file_name());
}

/// Unit test for the scratch file cleanup guard.
///
/// A downloaded image must disappear from disk when its handle is dropped,
/// and dropping a handle whose file is already gone must not fail.
#[test]
fn test_generated_image_removes_file_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("0123abcd.png");
    std::fs::write(&path, b"png bytes").unwrap();
    assert!(path.exists());

    let image = GeneratedImage {
        path: path.clone(),
        character: "Holo".to_string(),
        anime: "Spice and Wolf".to_string(),
    };
    drop(image);
    assert!(!path.exists());

    // Dropping a guard for a missing file is a quiet no-op
    let image = GeneratedImage {
        path: dir.path().join("never-written.png"),
        character: "Holo".to_string(),
        anime: "Spice and Wolf".to_string(),
    };
    drop(image);
}

/// Integration test for the retweet short-circuit.
///
/// A retweet must be rejected before any HTTP call; the offline clients make
/// an unexpected call fail the test.
#[tokio::test]
async fn test_process_status_skips_retweets() {
    let listener = offline_listener();
    let status = status_from(json!({
        "id": 21,
        "text": "RT @quotebird: something",
        "user": {"id": 7, "screen_name": "fan"},
        "retweeted_status": {
            "id": 20,
            "text": "something",
            "user": {"id": 8, "screen_name": "other"}
        },
        "entities": {"user_mentions": [
            {"id": BOT_ID, "screen_name": "quotebird", "indices": [3, 13]}
        ]}
    }));

    let outcome = listener.process_status(&status).await.unwrap();
    assert_eq!(outcome, Outcome::Ineligible);
}

/// Integration test for the quote-post short-circuit.
#[tokio::test]
async fn test_process_status_skips_quote_posts() {
    let listener = offline_listener();
    let status = status_from(json!({
        "id": 22,
        "text": "@quotebird look at this",
        "is_quote_status": true,
        "user": {"id": 7, "screen_name": "fan"},
        "entities": {"user_mentions": [
            {"id": BOT_ID, "screen_name": "quotebird", "indices": [0, 10]}
        ]}
    }));

    let outcome = listener.process_status(&status).await.unwrap();
    assert_eq!(outcome, Outcome::Ineligible);
}

/// Integration test for the self-post short-circuit.
#[tokio::test]
async fn test_process_status_skips_own_statuses() {
    let listener = offline_listener();
    let status = status_from(json!({
        "id": 23,
        "text": "Holo (Spice and Wolf) #anime",
        "user": {"id": BOT_ID, "screen_name": "quotebird"},
        "entities": {"user_mentions": [
            {"id": BOT_ID, "screen_name": "quotebird", "indices": [0, 10]}
        ]}
    }));

    let outcome = listener.process_status(&status).await.unwrap();
    assert_eq!(outcome, Outcome::Ineligible);
}

/// Integration test for statuses that do not mention the bot.
///
/// The track term matches more than real mentions, so a status without a
/// mention entity for the bot must be dropped without any HTTP call.
#[tokio::test]
async fn test_process_status_ignores_status_without_mention() {
    let listener = offline_listener();
    let status = status_from(json!({
        "id": 24,
        "text": "quotebird is a funny word",
        "user": {"id": 7, "screen_name": "fan"},
        "entities": {"user_mentions": [
            {"id": 999, "screen_name": "someone", "indices": [0, 8]}
        ]}
    }));

    let outcome = listener.process_status(&status).await.unwrap();
    assert_eq!(outcome, Outcome::NoMention);
}

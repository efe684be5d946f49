//! Streaming API support.
//!
//! This module contains the driver for the statuses/filter stream. It opens
//! the long-lived HTTP connection, splits the chunked body into
//! newline-delimited JSON messages and routes each message to the listener.

use futures_util::StreamExt;
use log::{debug, info};
use serde_json::Value;

use crate::listener::MentionListener;
use crate::status::Status;

use super::api::TwitterClient;

/// Connects to the statuses/filter stream and dispatches messages until the
/// connection ends.
///
/// The stream is requested with a `track` term so only statuses containing the
/// bot's handle are delivered. Each received chunk is appended to a buffer and
/// every complete line in the buffer is parsed as JSON: `disconnect` and
/// `warning` control messages go to the matching listener handlers, statuses
/// go to [`MentionListener::on_status`], anything else is ignored. Blank
/// keep-alive lines are dropped.
///
/// # Parameters
///
/// - `client`: The Twitter API client
/// - `listener`: The listener receiving stream events
/// - `track`: The term to track, normally the bot's screen name
///
/// # Returns
///
/// - `Ok(())`: When the stream ends cleanly
/// - `Err(Box<dyn std::error::Error + Send + Sync>)`: If the connection fails or breaks mid-stream
pub async fn run_filter_stream(
    client: &TwitterClient,
    listener: &MentionListener,
    track: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Opening filter stream tracking '{}'", track);

    let url = format!("{}/statuses/filter.json", client.stream_base);
    let params = [("track", track)];

    let response = client
        .http
        .post(&url)
        .header("Authorization", client.auth_header.as_str())
        .form(&params)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        listener.on_error(status.as_u16());
        return Err(format!("Filter stream connection failed ({})", status).into());
    }

    listener.on_connect();

    let mut body = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        buffer.extend_from_slice(&chunk);

        for line in drain_complete_lines(&mut buffer) {
            route_message(listener, &line).await;
        }
    }

    info!("Filter stream ended");
    Ok(())
}

/// Parses one stream message and hands it to the appropriate listener handler.
async fn route_message(listener: &MentionListener, line: &str) {
    let message: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            debug!("Ignoring unparseable stream message: {}", e);
            return;
        }
    };

    if let Some(notice) = message.get("disconnect") {
        listener.on_disconnect(notice);
        return;
    }

    if let Some(notice) = message.get("warning") {
        listener.on_warning(notice);
        return;
    }

    match serde_json::from_value::<Status>(message) {
        Ok(status) => listener.on_status(status).await,
        Err(e) => debug!("Ignoring non-status stream message: {}", e),
    }
}

/// Drains every complete newline-terminated line from `buffer`, leaving a
/// trailing partial line in place for the next chunk. Blank keep-alive lines
/// are dropped.
pub(crate) fn drain_complete_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();

    while let Some(newline_at) = buffer.iter().position(|&b| b == b'\n') {
        let mut line: Vec<u8> = buffer.drain(..=newline_at).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        match String::from_utf8(line) {
            Ok(text) => {
                if !text.trim().is_empty() {
                    lines.push(text);
                }
            }
            Err(e) => debug!("Dropping non-UTF-8 stream line: {}", e),
        }
    }

    lines
}

//! Mention stream listener.
//!
//! This module contains the listener that receives statuses from the filter
//! stream, decides whether each one is an answerable quote request and, when
//! it is, drives the reply pipeline end to end: quote resolution, image
//! generation, media upload, reply post and scratch cleanup.

use log::{debug, error, info, warn};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;

use crate::imagegen::QuoteApiClient;
use crate::status::{Status, User};
use crate::twitter::{get_status, post_reply, upload_media, TwitterClient};

/// Terminal outcome of processing one streamed status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The status does not mention the bot.
    NoMention,
    /// The status mentions the bot but fails an eligibility rule.
    Ineligible,
    /// The generation service declined to produce an image.
    Refused,
    /// A reply was posted, carrying the new status ID.
    Replied { status_id: u64 },
}

/// Listener for the bot's mention stream.
///
/// Holds everything one status needs to be processed: the Twitter and quote
/// API clients, the bot's own identity and the scratch directory for
/// downloaded images.
pub struct MentionListener {
    twitter: TwitterClient,
    quote_api: QuoteApiClient,
    me: User,
    scratch_dir: PathBuf,
}

impl MentionListener {
    /// Creates a listener processing mentions of the given account.
    ///
    /// # Parameters
    ///
    /// - `twitter`: The Twitter API client
    /// - `quote_api`: The quote image generation client
    /// - `me`: The authenticated bot account
    /// - `scratch_dir`: Directory for downloaded images
    pub fn new(
        twitter: TwitterClient,
        quote_api: QuoteApiClient,
        me: User,
        scratch_dir: PathBuf,
    ) -> Self {
        MentionListener {
            twitter,
            quote_api,
            me,
            scratch_dir,
        }
    }

    /// Called when the stream connection is established.
    pub fn on_connect(&self) {
        info!("Connected.");
    }

    /// Called when the stream delivers a disconnect notice.
    pub fn on_disconnect(&self, notice: &Value) {
        error!("Disconnected. Notice: {}", notice);
    }

    /// Called when the stream delivers a warning notice.
    pub fn on_warning(&self, notice: &Value) {
        warn!("Received a warning message: {}", notice);
    }

    /// Called when the stream connection fails with an HTTP error code.
    pub fn on_error(&self, status_code: u16) {
        error!(
            "Received an {} HTTP error code from the Twitter API.",
            status_code
        );
    }

    /// Called for every status delivered by the stream.
    ///
    /// Errors raised while processing one status are logged and swallowed so
    /// the listener keeps running.
    pub async fn on_status(&self, status: Status) {
        if let Err(e) = self.process_status(&status).await {
            error!("Failed to process status {}: {}", status.id, e);
        }
    }

    /// Runs one status through the eligibility rules and, when it qualifies,
    /// the full reply pipeline.
    ///
    /// # Parameters
    ///
    /// - `status`: The streamed status to examine
    ///
    /// # Returns
    ///
    /// - `Ok(Outcome)`: What became of the status
    /// - `Err(Box<dyn std::error::Error + Send + Sync>)`: If an API call or file operation fails
    pub async fn process_status(
        &self,
        status: &Status,
    ) -> Result<Outcome, Box<dyn std::error::Error + Send + Sync>> {
        // Retweets, quote posts and the bot's own statuses are never answered
        if status.retweeted_status.is_some()
            || status.is_quote_status
            || status.user.id == self.me.id
        {
            return Ok(Outcome::Ineligible);
        }

        debug!(
            "Processing status {} from @{}",
            status.id, status.user.screen_name
        );
        let started = Instant::now();

        let scan = status.mentions_of(self.me.id);
        if scan.count == 0 {
            return Ok(Outcome::NoMention);
        }

        let mut quote = None;
        if let Some(replied_id) = status.in_reply_to_status_id {
            let replied = get_status(&self.twitter, replied_id).await?;

            // A lone mention in a reply below the bot, or below a status that
            // already mentions the bot, is carried-over reply metadata rather
            // than a new request
            if replied.user.id == self.me.id && scan.count == 1 {
                return Ok(Outcome::Ineligible);
            }

            let replied_scan = replied.mentions_of(self.me.id);
            if replied_scan.count > 0 && scan.count == 1 {
                return Ok(Outcome::Ineligible);
            }

            // A reply consisting solely of mentions asks for the quote one
            // level up the chain
            let raw_mentions_text = status
                .user_mentions()
                .iter()
                .map(|mention| format!("@{}", mention.screen_name))
                .collect::<Vec<_>>()
                .join(" ");
            if status.raw_text().to_lowercase() == raw_mentions_text.to_lowercase() {
                quote = Some(replied.resolved_text(None));
            }
        }

        let quote = match quote {
            Some(text) => text,
            None => status.resolved_text(scan.first_indices),
        };

        let image = match self
            .quote_api
            .fetch_quote_image(&quote, &self.scratch_dir)
            .await?
        {
            Some(image) => image,
            None => return Ok(Outcome::Refused),
        };

        let media_id = upload_media(&self.twitter, image.path()).await?;

        let caption = format!("{} ({}) #anime", image.character, image.anime);
        let posted = post_reply(&self.twitter, &caption, status.id, &media_id).await?;

        info!(
            "Processed status {} from @{} in {:.2} seconds. Response status: {}.",
            status.id,
            status.user.screen_name,
            started.elapsed().as_secs_f64(),
            posted.id
        );

        Ok(Outcome::Replied {
            status_id: posted.id,
        })
    }
}
